use std::path::PathBuf;
use std::process::ExitCode;

use vcad_editor_lib::harness::Harness;
use vcad_editor_lib::protocol::execute_json_batch;
use vcad_editor_lib::state::EditorSettings;
use vcad_editor_lib::SessionError;

/// Paths given on the command line.
#[derive(Debug, Default)]
struct Args {
    session: Option<PathBuf>,
    requests: Option<PathBuf>,
    save: Option<PathBuf>,
}

fn main() -> ExitCode {
    let settings = EditorSettings::load();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.filter.as_str().into()),
        )
        .init();

    let args = parse_args();
    match run(settings, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: EditorSettings, args: &Args) -> Result<(), String> {
    let mut harness = Harness::with_settings(settings);

    if let Some(path) = &args.session {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), SessionError::Io(e)))?;
        harness
            .load_session(&json)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        tracing::info!(
            "Loaded session from {} ({} models)",
            path.display(),
            harness.model_count()
        );
    }

    if let Some(path) = &args.requests {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read requests file {}: {e}", path.display()))?;
        for response in execute_json_batch(&mut harness, &json)? {
            let line = serde_json::to_string(&response).map_err(|e| e.to_string())?;
            println!("{line}");
        }
    }

    if let Some(path) = &args.save {
        let json = harness.export_session().map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| SessionError::Io(e).to_string())?;
        tracing::info!("Saved session to {}", path.display());
    }

    let scene = serde_json::to_string_pretty(&harness.inspect()).map_err(|e| e.to_string())?;
    println!("{scene}");
    Ok(())
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let slot = match arg.as_str() {
            "--session" => &mut args.session,
            "--requests" => &mut args.requests,
            "--save" => &mut args.save,
            other => {
                tracing::warn!("Ignoring unknown argument {other}");
                continue;
            }
        };
        match iter.next() {
            Some(value) => *slot = Some(PathBuf::from(value)),
            None => tracing::warn!("{arg} expects a path"),
        }
    }
    args
}
