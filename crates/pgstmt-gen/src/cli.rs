use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// pgstmt-gen - write typed Postgres prepared statements from a manifest
#[derive(Parser, Debug)]
#[command(name = "pgstmt-gen")]
#[command(version)]
#[command(about = "Generate typed Postgres prepared statements from SQL templates", long_about = None)]
pub struct Cli {
    /// Statement manifest (TOML)
    #[arg(short = 'm', long = "manifest", default_value = "statements.toml")]
    pub manifest: PathBuf,

    /// Write the generated module here instead of stdout
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,

    /// How failures are reported
    #[arg(long = "message-format", value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Compile every statement and report failures without writing anything
    #[arg(long = "check")]
    pub check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    /// rustc-style text on stderr
    Human,
    /// One JSON object per line on stdout
    Json,
}
