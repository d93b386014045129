//! Classification of interpolation holes into result columns and bind parameters.

use std::ops::Range;

use crate::error::{InterpolationKind, Result, StatementError};
use crate::template::{Argument, Interpolation};
use crate::types::TypeRef;

/// A SELECT-list item, mapped to a field of the generated row type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// SQL identifier or expression, emitted verbatim.
    pub name: String,
    pub ty: TypeRef,
    pub alias: Option<String>,
    pub range: Range<usize>,
}

impl Column {
    /// The alias when present, the SQL name otherwise.
    pub fn field_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn optional(&self) -> bool {
        self.ty.optional
    }
}

/// A query parameter, mapped to a field of the statement itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bind {
    pub name: String,
    pub ty: TypeRef,
    pub range: Range<usize>,
}

impl Bind {
    pub fn optional(&self) -> bool {
        self.ty.optional
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Column(Column),
    Bind(Bind),
}

/// Decides what one interpolation hole denotes.
///
/// The first argument labelled `bind:` makes a bind parameter; any other label,
/// or none, makes a column. The second argument is the type. Columns accept a
/// third `as:` argument; extra arguments on a bind are ignored.
pub fn classify(interpolation: &Interpolation) -> Result<Classified> {
    let range = interpolation.range.clone();
    let mut arguments = interpolation.arguments.iter();
    let (Some(first), Some(second)) = (arguments.next(), arguments.next()) else {
        return Err(StatementError::malformed(
            "expected a name and a type, e.g. `{id, Uuid}` or `{bind: id, Uuid}`",
            range,
        ));
    };

    let kind = if first.has_label("bind") {
        InterpolationKind::Bind
    } else {
        InterpolationKind::Column
    };
    let name = literal_text(&first.value);

    let ty = TypeRef::parse(&second.value).ok_or_else(|| {
        StatementError::UnprocessableInterpolation {
            name: name.clone().unwrap_or_else(|| "<invalid>".to_string()),
            kind,
            range: range.clone(),
        }
    })?;

    let name = name.ok_or_else(|| {
        StatementError::malformed(
            format!(
                "expected the {kind} name as a string literal or bare SQL text, found `{}`",
                first.value
            ),
            first.range.clone(),
        )
    })?;

    match kind {
        InterpolationKind::Bind => Ok(Classified::Bind(Bind { name, ty, range })),
        InterpolationKind::Column => {
            let alias = arguments.next().map(|arg| alias(&name, arg)).transpose()?;
            if let Some(extra) = arguments.next() {
                return Err(StatementError::malformed(
                    format!("unexpected argument `{}` for column '{name}'", extra.value),
                    extra.range.clone(),
                ));
            }
            Ok(Classified::Column(Column {
                name,
                ty,
                alias,
                range,
            }))
        }
    }
}

fn alias(column: &str, arg: &Argument) -> Result<String> {
    if !arg.has_label("as") {
        return Err(StatementError::malformed(
            format!(
                "unexpected argument `{}` for column '{column}'; aliases are written `as: alias`",
                arg.value
            ),
            arg.range.clone(),
        ));
    }

    match literal_text(&arg.value) {
        Some(alias) if !alias.is_empty() => Ok(alias),
        Some(_) => Err(StatementError::malformed(
            format!("alias for column '{column}' must not be empty"),
            arg.range.clone(),
        )),
        None => Err(StatementError::malformed(
            format!(
                "expected the alias for column '{column}' as a string literal or bare SQL text, found `{}`",
                arg.value
            ),
            arg.range.clone(),
        )),
    }
}

/// A double-quoted string literal, or bare text without whitespace.
fn literal_text(value: &str) -> Option<String> {
    if value.starts_with('"') {
        return syn::parse_str::<syn::LitStr>(value).ok().map(|lit| lit.value());
    }
    if value.contains(|c: char| c.is_whitespace() || c == '"') {
        return None;
    }
    Some(value.to_string())
}
