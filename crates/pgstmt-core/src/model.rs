//! Folding scanned segments into a resolved statement.

use crate::error::Result;
use crate::interpolation::{classify, Bind, Classified, Column};
use crate::template::{scan, Segment};

/// The resolved statement: final SQL text plus columns and binds in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementModel {
    pub sql: String,
    pub columns: Vec<Column>,
    pub binds: Vec<Bind>,
}

impl StatementModel {
    /// Appends a literal segment verbatim.
    pub fn push_literal(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Appends a column reference, with ` AS alias` when aliased.
    pub fn push_column(&mut self, column: Column) {
        self.sql.push_str(&column.name);
        if let Some(alias) = &column.alias {
            self.sql.push_str(" AS ");
            self.sql.push_str(alias);
        }
        self.columns.push(column);
    }

    /// Appends a bind as the next `$N` placeholder.
    pub fn push_bind(&mut self, bind: Bind) {
        self.binds.push(bind);
        self.sql.push('$');
        self.sql.push_str(&self.binds.len().to_string());
    }

    pub fn returns_rows(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn build(segments: &[Segment]) -> Result<Self> {
        let mut model = StatementModel::default();
        for segment in segments {
            match segment {
                Segment::Literal(text) => {
                    tracing::trace!(len = text.len(), "literal segment");
                    model.push_literal(text);
                }
                Segment::Interpolation(interpolation) => {
                    let classified = classify(interpolation)?;
                    tracing::trace!(?classified, "classified interpolation");
                    match classified {
                        Classified::Column(column) => model.push_column(column),
                        Classified::Bind(bind) => model.push_bind(bind),
                    }
                }
            }
        }
        Ok(model)
    }
}

/// Scans, classifies and folds `template`, stopping at the first error.
pub fn compile(template: &str) -> Result<StatementModel> {
    let segments = scan(template)?;
    let model = StatementModel::build(&segments)?;
    tracing::debug!(
        columns = model.columns.len(),
        binds = model.binds.len(),
        "compiled statement template"
    );
    Ok(model)
}
