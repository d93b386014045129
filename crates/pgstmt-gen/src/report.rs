//! Reporting rejected statements.

use std::path::Path;

use pgstmt_core::Diagnostic;
use serde::Serialize;

use crate::generate::Failure;

#[derive(Serialize)]
struct Record<'a> {
    manifest: &'a str,
    statement: &'a str,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

/// rustc-style blocks, one per failure, pointing into each template.
pub fn human(manifest: &Path, failures: &[Failure]) -> String {
    let manifest = manifest.display();
    let mut out = String::new();
    for failure in failures {
        let origin = format!("{manifest}#{}", failure.statement);
        out.push_str(&failure.diagnostic.render(&origin, &failure.template));
        out.push('\n');
    }
    out.push_str(&format!(
        "error: could not generate {} statement{}\n",
        failures.len(),
        if failures.len() == 1 { "" } else { "s" }
    ));
    out
}

/// One JSON object per failure, one per line.
pub fn json(manifest: &Path, failures: &[Failure]) -> serde_json::Result<String> {
    let manifest = manifest.to_string_lossy();
    let mut out = String::new();
    for failure in failures {
        let record = Record {
            manifest: &manifest,
            statement: &failure.statement,
            diagnostic: &failure.diagnostic,
        };
        out.push_str(&serde_json::to_string(&record)?);
        out.push('\n');
    }
    Ok(out)
}
