//! Lexical scanning of statement templates.
//!
//! A template is SQL text with `{ ... }` interpolation holes, in the manner of
//! `format!`: `{{` and `}}` stand for literal braces. Scanning is purely
//! lexical; what an interpolation means is decided by the classifier.

use std::ops::Range;

use crate::error::{Result, StatementError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// SQL text copied verbatim into the statement.
    Literal(String),
    Interpolation(Interpolation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    pub arguments: Vec<Argument>,
    /// Byte range of the hole, braces included.
    pub range: Range<usize>,
}

/// One comma-separated argument of a hole, e.g. `bind: age` or `Option<Uuid>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub label: Option<String>,
    pub value: String,
    pub range: Range<usize>,
}

impl Argument {
    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }
}

/// Splits `template` into literal and interpolation segments, left to right.
pub fn scan(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        match c {
            '{' | '}' if chars.peek().map(|&(_, next)| next) == Some(c) => {
                chars.next();
                literal.push(c);
            }
            '}' => {
                return Err(StatementError::malformed(
                    "unmatched `}`; write `}}` for a literal brace",
                    at..at + 1,
                ));
            }
            '{' => {
                let interpolation = scan_interpolation(template, at)?;
                let end = interpolation.range.end;
                while chars.next_if(|&(i, _)| i < end).is_some() {}

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Interpolation(interpolation));
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn scan_interpolation(template: &str, open: usize) -> Result<Interpolation> {
    let body = open + 1;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut arg_start = body;
    let mut raw = Vec::new();
    // `<` nests only in the type argument; elsewhere it compares
    let mut angles = 0usize;

    for (offset, c) in template[body..].char_indices() {
        let at = body + offset;
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '<' if raw.len() == 1 => angles += 1,
            '>' if raw.len() == 1 => angles = angles.saturating_sub(1),
            '{' => {
                return Err(StatementError::malformed(
                    "unexpected `{` inside an interpolation",
                    at..at + 1,
                ));
            }
            ',' if depth == 0 && angles == 0 => {
                raw.push(arg_start..at);
                arg_start = at + 1;
            }
            '}' => {
                raw.push(arg_start..at);
                let range = open..at + 1;
                let arguments = split_arguments(template, raw, &range)?;
                return Ok(Interpolation { arguments, range });
            }
            _ => {}
        }
    }

    let message = if in_string {
        "unterminated string literal inside an interpolation"
    } else {
        "unterminated interpolation; write `{{` for a literal brace"
    };
    Err(StatementError::malformed(message, open..template.len()))
}

fn split_arguments(
    template: &str,
    raw: Vec<Range<usize>>,
    hole: &Range<usize>,
) -> Result<Vec<Argument>> {
    let count = raw.len();
    let mut arguments = Vec::with_capacity(count);

    for (index, range) in raw.into_iter().enumerate() {
        match argument(template, range)? {
            Some(argument) => arguments.push(argument),
            // trailing comma
            None if index > 0 && index + 1 == count => {}
            None => {
                let message = if count == 1 {
                    "empty interpolation"
                } else {
                    "empty argument in interpolation"
                };
                return Err(StatementError::malformed(message, hole.clone()));
            }
        }
    }
    Ok(arguments)
}

fn argument(template: &str, range: Range<usize>) -> Result<Option<Argument>> {
    let text = &template[range.clone()];
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let start = range.start + (text.len() - text.trim_start().len());
    let range = start..start + trimmed.len();

    let (label, value) = match split_label(trimmed) {
        Some((label, value)) => (Some(label.to_string()), value),
        None => (None, trimmed),
    };
    if value.is_empty() {
        return Err(StatementError::malformed(
            format!("missing value after `{}:`", label.unwrap_or_default()),
            range,
        ));
    }

    Ok(Some(Argument {
        label,
        value: value.to_string(),
        range,
    }))
}

/// `label: value` with a single colon; `a::b` is a path, not a label.
fn split_label(text: &str) -> Option<(&str, &str)> {
    let len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    let label = &text[..len];
    if label.is_empty() || label.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let rest = text[len..].trim_start().strip_prefix(':')?;
    if rest.starts_with(':') {
        return None;
    }
    Some((label, rest.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(label: Option<&str>, value: &str, range: Range<usize>) -> Argument {
        Argument {
            label: label.map(str::to_string),
            value: value.to_string(),
            range,
        }
    }

    fn holes(segments: &[Segment]) -> Vec<&Interpolation> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Interpolation(i) => Some(i),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn empty_template_has_no_segments() -> anyhow::Result<()> {
        assert!(scan("")?.is_empty());
        Ok(())
    }

    #[test]
    fn literal_only_template_is_one_segment() -> anyhow::Result<()> {
        let segments = scan("SELECT id, name, age FROM users")?;
        assert_eq!(
            segments,
            vec![Segment::Literal("SELECT id, name, age FROM users".into())]
        );
        Ok(())
    }

    #[test]
    fn splits_literals_and_interpolations_in_order() -> anyhow::Result<()> {
        let segments = scan("SELECT {id, Uuid} FROM users WHERE {bind: age, i64} > age")?;

        assert_eq!(
            segments,
            vec![
                Segment::Literal("SELECT ".into()),
                Segment::Interpolation(Interpolation {
                    arguments: vec![arg(None, "id", 8..10), arg(None, "Uuid", 12..16)],
                    range: 7..17,
                }),
                Segment::Literal(" FROM users WHERE ".into()),
                Segment::Interpolation(Interpolation {
                    arguments: vec![arg(Some("bind"), "age", 36..45), arg(None, "i64", 47..50)],
                    range: 35..51,
                }),
                Segment::Literal(" > age".into()),
            ]
        );
        Ok(())
    }

    #[test]
    fn doubled_braces_are_literal() -> anyhow::Result<()> {
        let segments = scan("SELECT '{{1,2}}'::int[] AS {xs, i32}")?;
        assert_eq!(segments[0], Segment::Literal("SELECT '{1,2}'::int[] AS ".into()));
        assert_eq!(holes(&segments).len(), 1);
        Ok(())
    }

    #[test]
    fn preserves_newlines_and_indentation() -> anyhow::Result<()> {
        let segments = scan("SELECT {id, Uuid}\n  FROM users\n")?;
        assert_eq!(segments[2], Segment::Literal("\n  FROM users\n".into()));
        Ok(())
    }

    #[test]
    fn commas_inside_nesting_and_strings_do_not_split() -> anyhow::Result<()> {
        let segments = scan(r#"{"coalesce(a, b)", Option<i32>, as: "a,b"} {count(*), i64, as: total}"#)?;
        let holes = holes(&segments);

        let values: Vec<_> = holes[0].arguments.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec![r#""coalesce(a, b)""#, "Option<i32>", r#""a,b""#]);
        assert!(holes[0].arguments[2].has_label("as"));

        let values: Vec<_> = holes[1].arguments.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec!["count(*)", "i64", "total"]);
        Ok(())
    }

    #[test]
    fn comparisons_in_bare_names_do_not_nest() -> anyhow::Result<()> {
        let segments = scan("SELECT {a<=b, bool, as: le}, {x>y, Option<bool>, as: gt}")?;
        let holes = holes(&segments);

        let values: Vec<_> = holes[0].arguments.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec!["a<=b", "bool", "le"]);
        let values: Vec<_> = holes[1].arguments.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec!["x>y", "Option<bool>", "gt"]);
        Ok(())
    }

    #[test]
    fn path_separators_are_not_labels() -> anyhow::Result<()> {
        let segments = scan("{users.id, sqlx::types::Uuid}")?;
        let holes = holes(&segments);
        assert_eq!(holes[0].arguments[1].label, None);
        assert_eq!(holes[0].arguments[1].value, "sqlx::types::Uuid");
        Ok(())
    }

    #[test]
    fn tolerates_whitespace_and_trailing_comma() -> anyhow::Result<()> {
        let segments = scan("{  bind :  age ,  i64 , }")?;
        let holes = holes(&segments);
        assert_eq!(
            holes[0].arguments,
            vec![arg(Some("bind"), "age", 3..14), arg(None, "i64", 18..21)]
        );
        Ok(())
    }

    #[test]
    fn braces_inside_string_arguments_are_kept() -> anyhow::Result<()> {
        let segments = scan(r#"{"'}'", String, as: brace}"#)?;
        assert_eq!(holes(&segments)[0].arguments[0].value, r#""'}'""#);
        Ok(())
    }

    #[test]
    fn rejects_unmatched_closing_brace() {
        let err = scan("SELECT } FROM users").unwrap_err();
        assert_eq!(err.range(), Some(7..8));
    }

    #[test]
    fn rejects_unterminated_interpolation() {
        let err = scan("SELECT {id, Uuid FROM users").unwrap_err();
        assert_eq!(err.range(), Some(7..27));
        assert!(err.to_string().contains("unterminated interpolation"));

        let err = scan(r#"SELECT {"id, Uuid}"#).unwrap_err();
        assert!(err.to_string().contains("unterminated string literal"));
    }

    #[test]
    fn rejects_empty_holes_and_arguments() {
        assert!(scan("SELECT {}").unwrap_err().to_string().contains("empty interpolation"));
        assert!(scan("SELECT { , i64}")
            .unwrap_err()
            .to_string()
            .contains("empty argument"));
        assert!(scan("SELECT {bind:, i64}")
            .unwrap_err()
            .to_string()
            .contains("missing value after `bind:`"));
    }

    #[test]
    fn rejects_nested_open_brace() {
        let err = scan("{id{, i64}").unwrap_err();
        assert_eq!(err.range(), Some(3..4));
    }
}
