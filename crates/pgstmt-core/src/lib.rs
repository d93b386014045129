//! Statement template compiler for pgstmt
//!
//! Turns a SQL template with typed `{column, Type}` and `{bind: name, Type}`
//! holes into a row type, the resolved SQL text, bound fields on the host
//! struct and a `PreparedStatement` implementation.

pub mod diagnostic;
pub mod emit;
pub mod error;
pub mod expand;
mod ident;
pub mod interpolation;
pub mod model;
pub mod template;
pub mod types;

pub use diagnostic::{Diagnostic, DiagnosticId, DiagnosticSink, FixIt, Severity};
pub use emit::{Declarations, Target};
pub use error::{InterpolationKind, Result, StatementError};
pub use expand::{expand, expand_with_sink, ExpandOptions};
pub use interpolation::{Bind, Column};
pub use model::{compile, StatementModel};
pub use types::{ScalarType, TypeRef};
