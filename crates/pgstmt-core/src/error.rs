//! Error types for the statement compiler

use std::fmt;
use std::ops::Range;

use thiserror::Error;

/// Which side of the statement an interpolation feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpolationKind {
    /// A result column, e.g. `{id, Uuid}`.
    Column,
    /// A bind parameter, e.g. `{bind: id, Uuid}`.
    Bind,
}

impl InterpolationKind {
    pub fn is_bind(self) -> bool {
        matches!(self, InterpolationKind::Bind)
    }
}

impl fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationKind::Column => f.write_str("column"),
            InterpolationKind::Bind => f.write_str("bind"),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum StatementError {
    #[error("'#[statement]' can only be applied to struct types")]
    InvalidDeclaration {
        /// Keyword that introduced the declaration, e.g. `enum`.
        introducer: Option<String>,
    },

    #[error("Cannot parse type for {kind} with name '{name}'")]
    UnprocessableInterpolation {
        name: String,
        kind: InterpolationKind,
        range: Range<usize>,
    },

    #[error("malformed statement template: {message}")]
    MalformedTemplate { message: String, range: Range<usize> },

    #[error("'{name}' is not a valid field name for {kind}")]
    InvalidFieldName {
        name: String,
        kind: InterpolationKind,
        range: Range<usize>,
    },

    #[error("duplicate {kind} field '{name}'")]
    DuplicateField {
        name: String,
        kind: InterpolationKind,
        range: Option<Range<usize>>,
    },

    #[error("{message}")]
    UnsupportedDeclaration { message: String },
}

impl StatementError {
    pub(crate) fn malformed(message: impl Into<String>, range: Range<usize>) -> Self {
        StatementError::MalformedTemplate {
            message: message.into(),
            range,
        }
    }

    /// Byte range inside the template the error points at, if any.
    pub fn range(&self) -> Option<Range<usize>> {
        match self {
            StatementError::UnprocessableInterpolation { range, .. }
            | StatementError::MalformedTemplate { range, .. }
            | StatementError::InvalidFieldName { range, .. } => Some(range.clone()),
            StatementError::DuplicateField { range, .. } => range.clone(),
            StatementError::InvalidDeclaration { .. }
            | StatementError::UnsupportedDeclaration { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatementError>;
