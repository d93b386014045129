use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use pgstmt_gen::cli::Cli;
use pgstmt_gen::config::GeneratorConfig;
use pgstmt_gen::observability;

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if !cli.manifest.exists() {
        bail!("manifest {} not found", cli.manifest.display());
    }

    let config = GeneratorConfig::load_from_file(&cli.manifest)
        .with_context(|| format!("failed to load {}", cli.manifest.display()))?;
    observability::init(&config.logging)?;

    pgstmt_gen::run(&cli, &config)
}
