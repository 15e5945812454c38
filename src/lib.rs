//! Shared bootstrap for the pipeline binaries.

pub mod telemetry;

use std::process::ExitCode;

use tracing::error;

/// Loads a local `.env` when present. CI passes everything through the
/// environment, so a missing file is not an error.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring unreadable .env: {e}");
        }
    }
}

/// Maps a pipeline result onto the process exit code: `Ok` is 0, `Err`
/// is logged and becomes 1.
pub fn exit_with(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "pipeline failed");
            ExitCode::FAILURE
        }
    }
}
