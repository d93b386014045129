use std::path::Path;
use std::process::{Command, Output};

const MANIFEST: &str = r#"
[generator]
header = true

[[statements]]
name = "users_older_than"
sql = "SELECT {id, Uuid}, {name, String} FROM users WHERE {bind: age, i64} > age"
doc = "Users older than a given age."

[[statements]]
name = "insert_user"
sql = "INSERT INTO users (id, name) VALUES ({bind: id, Uuid}, {bind: name, String})"
"#;

const BROKEN: &str = r#"
[[statements]]
name = "users"
sql = "SELECT {id, Option<Option<Uuid>>} FROM users"
"#;

fn pgstmt_gen(dir: &Path, args: &[&str]) -> anyhow::Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_pgstmt-gen"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()?)
}

#[test]
fn writes_the_module() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("statements.toml"), MANIFEST)?;

    let output = pgstmt_gen(dir.path(), &["--out", "queries.rs"])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let source = std::fs::read_to_string(dir.path().join("queries.rs"))?;
    assert!(source.starts_with("// @generated by pgstmt-gen"));
    assert!(source.contains("pub struct UsersOlderThan {"));
    assert!(source.contains("pub type InsertUserRow = ();"));
    assert!(source.contains(r#""INSERT INTO users (id, name) VALUES ($1, $2)""#));
    syn::parse_file(&source)?;
    Ok(())
}

#[test]
fn prints_to_stdout_without_out() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("queries.toml"), MANIFEST)?;

    let output = pgstmt_gen(dir.path(), &["-m", "queries.toml"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("impl ::pgstmt::PreparedStatement for InsertUser"));
    Ok(())
}

#[test]
fn check_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("statements.toml"), MANIFEST)?;

    let output = pgstmt_gen(dir.path(), &["--check", "--out", "queries.rs"])?;
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!dir.path().join("queries.rs").exists());
    Ok(())
}

#[test]
fn failure_reports_and_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("statements.toml"), BROKEN)?;

    let output = pgstmt_gen(dir.path(), &["--out", "queries.rs"])?;
    assert!(!output.status.success());
    assert!(!dir.path().join("queries.rs").exists());

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("error[unprocessable-interpolation]: Cannot parse type for column with name 'id'"), "{stderr}");
    assert!(stderr.contains("--> statements.toml#users:1:8"), "{stderr}");
    Ok(())
}

#[test]
fn json_failures_on_stdout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("statements.toml"), BROKEN)?;

    let output = pgstmt_gen(dir.path(), &["--message-format", "json"])?;
    assert!(!output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let value: serde_json::Value = serde_json::from_str(stdout.trim())?;
    assert_eq!(value["statement"], "users");
    assert_eq!(value["id"], "unprocessable-interpolation");
    Ok(())
}

#[test]
fn missing_manifest_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = pgstmt_gen(dir.path(), &[])?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("manifest statements.toml not found"));
    Ok(())
}
