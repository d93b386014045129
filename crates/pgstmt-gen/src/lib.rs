//! Offline generator for pgstmt prepared statements.
//!
//! Reads a statement manifest, compiles every template with the same compiler
//! the `#[statement]` attribute uses, and writes one formatted Rust module.

pub mod cli;
pub mod config;
pub mod generate;
pub mod observability;
pub mod report;

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{Cli, MessageFormat};
use crate::config::GeneratorConfig;
use crate::generate::{Generator, Outcome};

/// Generates, checks or reports; nothing is written unless every statement compiles.
pub fn run(cli: &Cli, config: &GeneratorConfig) -> Result<ExitCode> {
    let generator = Generator::from_settings(&config.generator)?;
    info!(
        manifest = %cli.manifest.display(),
        statements = config.statements.len(),
        "loaded manifest"
    );

    match generator.generate(&config.statements)? {
        Outcome::Module(source) => {
            if cli.check {
                info!("all statements compile");
            } else if let Some(out) = &cli.out {
                std::fs::write(out, &source)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                info!(out = %out.display(), "wrote generated module");
            } else {
                std::io::stdout()
                    .write_all(source.as_bytes())
                    .context("failed to write generated module to stdout")?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Rejected(failures) => {
            match cli.message_format {
                MessageFormat::Human => {
                    eprint!("{}", report::human(&cli.manifest, &failures));
                }
                MessageFormat::Json => {
                    print!("{}", report::json(&cli.manifest, &failures)?);
                }
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
