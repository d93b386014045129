use proc_macro::TokenStream;

mod codegen;
mod opts;

/// Turns a SQL template into a typed prepared statement on the annotated struct.
///
/// ```ignore
/// #[statement("SELECT {id, Uuid}, {name, String} FROM users WHERE {bind: age, i64} > age")]
/// pub struct UsersOlderThan;
/// ```
///
/// Adds one field per bind to the struct, declares `UsersOlderThanRow` with one
/// field per column, and implements `pgstmt::PreparedStatement`. Named
/// arguments after the template: `crate = "path"` for the runtime crate and
/// `row = "Name"` for the row type.
#[proc_macro_attribute]
pub fn statement(args: TokenStream, input: TokenStream) -> TokenStream {
    match codegen::expand(args.into(), input.into()) {
        Ok(ts) => ts.into(),
        Err(e) => e.write_errors().into(),
    }
}
