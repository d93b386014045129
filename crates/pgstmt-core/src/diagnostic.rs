//! Structured diagnostics with optional fix-its.
//!
//! A [`Diagnostic`] is plain data: it can be turned into a compile error by the
//! attribute macro, rendered as text by the offline generator, or serialized for
//! other tooling.

use std::fmt::{self, Write as _};
use std::ops::Range;

use proc_macro2::{Span, TokenStream};
use serde::Serialize;

use crate::error::StatementError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Note => f.write_str("note"),
        }
    }
}

/// Stable identifiers, one per failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticId {
    #[serde(rename = "statement-invalid-declaration")]
    InvalidDeclaration,
    #[serde(rename = "unprocessable-interpolation")]
    UnprocessableInterpolation,
    #[serde(rename = "malformed-template")]
    MalformedTemplate,
    #[serde(rename = "invalid-field-name")]
    InvalidFieldName,
    #[serde(rename = "duplicate-field")]
    DuplicateField,
    #[serde(rename = "unsupported-declaration")]
    UnsupportedDeclaration,
}

impl DiagnosticId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticId::InvalidDeclaration => "statement-invalid-declaration",
            DiagnosticId::UnprocessableInterpolation => "unprocessable-interpolation",
            DiagnosticId::MalformedTemplate => "malformed-template",
            DiagnosticId::InvalidFieldName => "invalid-field-name",
            DiagnosticId::DuplicateField => "duplicate-field",
            DiagnosticId::UnsupportedDeclaration => "unsupported-declaration",
        }
    }
}

impl fmt::Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mechanical source edit: replace the text at `span` with `replacement`.
#[derive(Debug, Clone, Serialize)]
pub struct FixIt {
    pub message: String,
    #[serde(skip)]
    pub span: Span,
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub message: String,
    pub severity: Severity,
    #[serde(skip)]
    pub span: Span,
    /// Byte range inside the template text.
    pub range: Option<Range<usize>>,
    pub note: Option<String>,
    pub fix_it: Option<FixIt>,
}

impl Diagnostic {
    /// Moves the primary location to `span`, keeping the template range.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Points the attached fix-it, if any, at `span`.
    pub fn fix_at(mut self, span: Span) -> Self {
        if let Some(fix_it) = &mut self.fix_it {
            fix_it.span = span;
        }
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Compile error tokens: the message at the primary span, plus a `help:`
    /// error at the fix-it location when one is attached.
    pub fn to_compile_error(&self) -> TokenStream {
        let mut error = syn::Error::new(self.span, &self.message);
        if let Some(note) = &self.note {
            error.combine(syn::Error::new(self.span, format!("note: {note}")));
        }
        if let Some(fix_it) = &self.fix_it {
            error.combine(syn::Error::new(
                fix_it.span,
                format!("help: {}", fix_it.message),
            ));
        }
        error.to_compile_error()
    }

    /// Renders the diagnostic against the template it was produced from, in the
    /// familiar `error[id]: message` layout.
    pub fn render(&self, origin: &str, template: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}[{}]: {}", self.severity, self.id, self.message);

        match self.range.as_ref().and_then(|r| locate(template, r)) {
            Some(loc) => {
                let gutter = " ".repeat(loc.line.to_string().len());
                let _ = writeln!(out, "{gutter}--> {origin}:{}:{}", loc.line, loc.column);
                let _ = writeln!(out, "{gutter} |");
                let _ = writeln!(out, "{} | {}", loc.line, loc.text);
                let _ = writeln!(
                    out,
                    "{gutter} | {}{}",
                    " ".repeat(loc.column - 1),
                    "^".repeat(loc.width)
                );
            }
            None => {
                let _ = writeln!(out, " --> {origin}");
            }
        }

        if let Some(note) = &self.note {
            let _ = writeln!(out, "  = note: {note}");
        }
        if let Some(fix_it) = &self.fix_it {
            let _ = writeln!(out, "  = help: {}", fix_it.message);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

impl From<StatementError> for Diagnostic {
    fn from(err: StatementError) -> Self {
        let message = err.to_string();
        let range = err.range();
        let note = match &err {
            StatementError::InvalidFieldName { kind, .. } if !kind.is_bind() => {
                Some("name the field with an alias, e.g. `{count(*), i64, as: total}`".to_string())
            }
            _ => None,
        };
        let (id, fix_it) = match err {
            StatementError::InvalidDeclaration { introducer } => {
                let fix_it = introducer.map(|keyword| FixIt {
                    message: format!("Replace '{keyword}' with 'struct'"),
                    span: Span::call_site(),
                    original: keyword,
                    replacement: "struct".to_string(),
                });
                (DiagnosticId::InvalidDeclaration, fix_it)
            }
            StatementError::UnsupportedDeclaration { .. } => {
                (DiagnosticId::UnsupportedDeclaration, None)
            }
            StatementError::UnprocessableInterpolation { .. } => {
                (DiagnosticId::UnprocessableInterpolation, None)
            }
            StatementError::MalformedTemplate { .. } => (DiagnosticId::MalformedTemplate, None),
            StatementError::InvalidFieldName { .. } => (DiagnosticId::InvalidFieldName, None),
            StatementError::DuplicateField { .. } => (DiagnosticId::DuplicateField, None),
        };

        Diagnostic {
            id,
            message,
            severity: Severity::Error,
            span: Span::call_site(),
            range,
            note,
            fix_it,
        }
    }
}

/// Receives diagnostics produced while expanding a statement.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

struct Location<'a> {
    line: usize,
    column: usize,
    width: usize,
    text: &'a str,
}

fn locate<'a>(template: &'a str, range: &Range<usize>) -> Option<Location<'a>> {
    let before = template.get(..range.start)?;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = template[range.start..]
        .find('\n')
        .map(|i| range.start + i)
        .unwrap_or(template.len());
    let text = &template[line_start..line_end];

    let column = before[line_start..].chars().count() + 1;
    let end = range.end.clamp(range.start, line_end);
    let width = template
        .get(range.start..end)
        .map(|s| s.chars().count())
        .unwrap_or(0)
        .max(1);

    Some(Location {
        line: before.matches('\n').count() + 1,
        column,
        width,
        text,
    })
}
