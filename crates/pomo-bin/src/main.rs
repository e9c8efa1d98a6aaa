//! Pomo entrypoint.
use anyhow::{Context, Result};
use clap::Parser;
use core_events::{
    EVENT_CHANNEL_CAP, EventSourceRegistry, InterruptEventSource, KEYPRESS_TOTAL,
    ResizeEventSource, TICKS_TOTAL, TickEventSource,
};
use core_render::{GlyphSet, Renderer};
use core_state::AppState;
use core_terminal::{CrosstermBackend, Screen};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod runtime;

use runtime::PomoRuntime;

const DEFAULT_LOG_FILE: &str = "pomo.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "pomo", version, about = "Terminal pomodoro task list")]
struct Args {
    /// Configuration file path (overrides discovery of `pomo.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    debug: bool,
    /// Where to write the log file. An existing file is truncated at startup.
    #[arg(long = "log-file", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

/// Start each run with an empty log. Only regular files are truncated;
/// anything else at `path` is left alone and reported.
fn truncate_log_file(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_file() => {
            anyhow::bail!("log path is not a regular file: {}", path.display())
        }
        Ok(_) => {
            std::fs::File::create(path)
                .with_context(|| format!("couldn't truncate log file {}", path.display()))?;
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("couldn't inspect log path {}", path.display())),
    }
}

fn configure_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    let path = args.log_file.as_path();
    truncate_log_file(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // Global subscriber already installed; drop guard so the writer shuts down.
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

async fn run(args: &Args) -> Result<()> {
    let config = core_config::load_from(args.config.clone())?;
    let display = config.display();
    let glyphs = GlyphSet {
        filled: display.filled_glyph.clone(),
        unfilled: display.unfilled_glyph.clone(),
        selection_marker: display.selection_marker.clone(),
    };

    let mut backend = CrosstermBackend::new();
    let mut guard = backend.enter_guard()?;
    let viewport = guard.viewport_size()?;
    info!(
        target: "runtime.startup",
        rows = viewport.rows,
        cols = viewport.cols,
        pomodoro_secs = config.pomodoro_duration().as_secs(),
        config = config.source.as_ref().map(|p| p.display().to_string()).as_deref(),
        "bootstrap_complete"
    );

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
    core_input::spawn_input_thread(tx.clone()).context("couldn't start input thread")?;
    let mut registry = EventSourceRegistry::new();
    registry.register(TickEventSource::new(config.tick_interval()));
    registry.register(ResizeEventSource);
    registry.register(InterruptEventSource);
    let source_handles = registry.spawn_all(&tx);
    drop(tx);

    let outcome = {
        let mut runtime = PomoRuntime::new(
            AppState::new(config.pomodoro_duration()),
            Renderer::new(viewport, glyphs),
            Screen::new(std::io::stdout()),
            rx,
            || guard.viewport_size(),
        );
        runtime.run().await
    };
    // The runtime (and its receiver) is gone; sources observe the closed channel.
    finalize_shutdown(source_handles).await;

    let released = guard.release();
    match &outcome {
        Ok(reason) => info!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown_complete"),
        Err(err) => error!(target: "runtime.shutdown", %err, "shutdown_fatal"),
    }
    outcome?;
    released?;
    Ok(())
}

async fn finalize_shutdown(mut handles: Vec<JoinHandle<()>>) {
    while let Some(handle) = handles.pop() {
        match tokio::time::timeout(Duration::from_millis(200), handle).await {
            Ok(Ok(())) => trace!(target: "runtime.shutdown", "event_source_task_stopped"),
            Ok(Err(err)) if err.is_cancelled() => {
                trace!(target: "runtime.shutdown", "event_source_task_cancelled")
            }
            Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "event_source_task_error"),
            Err(_) => warn!(target: "runtime.shutdown", "event_source_task_timeout"),
        }
    }
    info!(
        target: "runtime.shutdown",
        keypresses = KEYPRESS_TOTAL.load(Ordering::Relaxed),
        ticks = TICKS_TOTAL.load(Ordering::Relaxed),
        "counters"
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = match configure_logging(&args) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("pomo: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    install_panic_hook();
    info!(target: "runtime", "startup");

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pomo: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let args = Args::try_parse_from(["pomo"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.debug);
        assert_eq!(args.log_file, PathBuf::from("pomo.log"));
    }

    #[test]
    fn cli_flags() {
        let args = Args::try_parse_from([
            "pomo",
            "--config",
            "/tmp/p.toml",
            "--debug",
            "--log-file",
            "/tmp/pomo-test.log",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/p.toml")));
        assert!(args.debug);
        assert_eq!(args.log_file, PathBuf::from("/tmp/pomo-test.log"));
    }

    #[test]
    fn existing_log_is_truncated_not_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomo.log");
        std::fs::write(&path, "previous run\n").unwrap();
        truncate_log_file(&path).unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn missing_log_is_left_for_the_appender() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomo.log");
        truncate_log_file(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn directory_log_path_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = truncate_log_file(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a regular file"), "{err}");
        assert!(dir.path().is_dir());
    }
}
