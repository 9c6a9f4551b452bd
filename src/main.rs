mod loader;
mod model;
mod prompt;
mod selector;
mod suggest;
mod tui;

use anyhow::Result;
use loader::{LoadError, ManifestLoader, DEFAULT_TIMEOUT, MANIFEST_URL};
use model::Manifest;
use prompt::{LinePrompt, Prompt};
use selector::Outcome;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tui::TerminalPrompt;

fn main() -> ExitCode {
    init_tracing();

    let fetch = || -> Result<Manifest, LoadError> {
        ManifestLoader::new(MANIFEST_URL, DEFAULT_TIMEOUT)?.fetch()
    };

    let res = if io::stdin().is_terminal() && io::stdout().is_terminal() {
        run(fetch, &mut TerminalPrompt)
    } else {
        run(fetch, &mut LinePrompt::new(io::stdin().lock(), io::stdout()))
    };

    match res {
        Ok(Outcome::Confirmed(selection)) => {
            println!("{}@{}", selection.step, selection.version);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Exited) => ExitCode::SUCCESS,
        Err(RunError::Load(e)) => {
            tracing::error!(
                "Failed to fetch the step list from the server, error: {:#}",
                anyhow::Error::from(e)
            );
            ExitCode::FAILURE
        }
        Err(RunError::Prompt(e)) => {
            tracing::error!("Selection aborted, error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
enum RunError {
    Load(LoadError),
    Prompt(anyhow::Error),
}

/// Load the manifest, then run the selection. The prompt is never touched
/// when loading fails.
fn run<F, P>(fetch: F, prompt: &mut P) -> Result<Outcome, RunError>
where
    F: FnOnce() -> Result<Manifest, LoadError>,
    P: Prompt,
{
    tracing::info!("Fetching step list");
    let manifest = fetch().map_err(RunError::Load)?;

    tracing::info!(steps = manifest.steps.len(), "Step list fetched");
    if tracing::enabled!(tracing::Level::DEBUG) {
        let names = serde_json::to_string_pretty(&manifest.step_names()).unwrap_or_default();
        tracing::debug!("available steps:\n{}", names);
    }

    let outcome = selector::select(&manifest, prompt).map_err(RunError::Prompt)?;
    match &outcome {
        Outcome::Confirmed(selection) => {
            tracing::info!(step = %selection.step, version = %selection.version, "Failing step selected");
        }
        Outcome::Exited => tracing::info!("Selection cancelled"),
    }
    Ok(outcome)
}
