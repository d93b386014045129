//! Typed Postgres prepared statements generated from SQL templates.
//!
//! Annotate a struct with [`statement`] and the template's `{column, Type}`
//! holes become a row type while its `{bind: name, Type}` holes become fields
//! of the struct itself:
//!
//! ```ignore
//! use pgstmt::{statement, PreparedStatement};
//!
//! #[statement("SELECT {id, Uuid}, {name, String} FROM users WHERE {bind: age, i64} > age")]
//! pub struct UsersOlderThan;
//!
//! let query = pgstmt::query(&UsersOlderThan { age: 30 })?;
//! ```

#![deny(missing_docs)]

use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::Postgres;

/// The `sqlx` generated code is written against.
pub use sqlx;

/// Re-export the attribute so downstream crates only depend on `pgstmt`
/// (with feature `derive` enabled).
#[cfg(feature = "derive")]
#[doc(inline)]
pub use pgstmt_derive::statement;

/// A statement whose SQL, parameters and row shape are known at compile time.
///
/// Implemented by `#[statement]`; implementations carry no state besides the
/// bound fields, so they can be used from any number of tasks at once.
pub trait PreparedStatement {
    /// Decoded form of one result row; `()` for statements returning nothing.
    type Row;

    /// SQL text with `$1..$N` placeholders in bind order.
    const SQL: &'static str;

    /// Encodes the bound fields, in placeholder order.
    fn make_bindings(&self) -> Result<PgArguments, BoxDynError>;

    /// Decodes one result row, column by column.
    fn decode_row(row: &PgRow) -> Result<Self::Row, sqlx::Error>;
}

/// Pairs [`PreparedStatement::SQL`] with the statement's bindings.
///
/// Nothing is sent to the database; execute the returned query with any
/// `sqlx` executor.
pub fn query<S: PreparedStatement>(
    statement: &S,
) -> Result<Query<'static, Postgres, PgArguments>, BoxDynError> {
    Ok(sqlx::query_with(S::SQL, statement.make_bindings()?))
}
