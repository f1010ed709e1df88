//! redline: a terminal viewer that keeps open files in sync with an agent
//! editing them on disk, and highlights what changed.
//!
//! Entry point for the `redline` binary. Wires together the terminal lifecycle
//! (`tui`), the terminal event bus (`event`), the UI (`ui`), the theme system
//! (`theme`), and the reconciliation engine from `redline-core`.
//!
//! # Startup sequence
//!
//! 1. Parse arguments and load config: read-only, safe before terminal init.
//! 2. Start file logging. The terminal belongs to the TUI, so logs go to
//!    `$XDG_STATE_HOME/redline/redline.log`.
//! 3. Open documents and set up the engine: watcher, marker file, commit
//!    detection. Failures here degrade the engine; they never abort.
//! 4. `install_panic_hook()`, `register_sigterm()`, `init_tui()`.
//! 5. Spawn the terminal event task and run the loop.
//!
//! The engine is driven only from the loop below: terminal events, events
//! from the watcher thread (through an `EngineHandle`), and engine deadlines
//! are all handled one at a time on this task.

mod app;
mod event;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use clap::Parser;
use redline_core::{Editor, EngineConfig, EngineEvent, EngineHandle, Outcome, ReconciliationEngine};
use tokio::time::{sleep_until, Instant};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::ui::keybindings::{handle_key, KeyAction};

/// Returns the path to the redline config file.
///
/// Prefers `$XDG_CONFIG_HOME/redline/config.toml`; falls back to
/// `~/.config/redline/config.toml` when the env var is absent.
fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("config.toml")
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    let base = std::env::var(var)
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(fallback)))
        .unwrap_or_else(|| PathBuf::from(fallback));
    base.join("redline")
}

/// Loads the theme name and the `[engine]` table from the config file.
///
/// Config errors are soft failures: a warning on stderr, then defaults.
fn load_config(path: &Path) -> (String, EngineConfig) {
    let theme = std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| toml::from_str::<toml::Table>(&raw).ok())
        .and_then(|table| table.get("theme").and_then(|v| v.as_str()).map(str::to_owned))
        .unwrap_or_else(|| "catppuccin-mocha".to_owned());
    let engine = EngineConfig::load(path).unwrap_or_else(|e| {
        eprintln!("redline: {e}; using default engine settings");
        EngineConfig::default()
    });
    (theme, engine)
}

/// Installs the file logger. Filter comes from `REDLINE_LOG` (default `info`).
///
/// The returned guard flushes the non-blocking writer on drop and must live
/// until exit.
fn init_logging() -> Option<WorkerGuard> {
    let dir = xdg_dir("XDG_STATE_HOME", ".local/state");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("redline: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    let file_appender = tracing_appender::rolling::never(&dir, "redline.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env("REDLINE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

/// Keep open files in sync with an agent editing them on disk.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Marker file the agent appends changed paths to (overrides config)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    marker: Option<PathBuf>,

    /// Files to open
    #[arg(value_hint = clap::ValueHint::FilePath)]
    files: Vec<PathBuf>,
}

/// Builds the engine and connects every change source. Nothing here is fatal.
fn setup_engine(
    config: EngineConfig,
    state: &mut app::AppState,
    handle: &EngineHandle,
    marker: Option<PathBuf>,
) -> ReconciliationEngine {
    let now = Instant::now();
    let marker = marker.or_else(|| config.marker_file.clone());
    let mut engine = ReconciliationEngine::new(config);

    if let Err(e) = engine.start_watching(handle.fs_sink()) {
        tracing::warn!("filesystem watching unavailable: {e}");
    }
    let paths: Vec<PathBuf> = state.documents.iter().map(|d| d.path.clone()).collect();
    for path in paths {
        engine.handle(state, EngineEvent::DocumentOpened(path), now);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if let Some(marker) = marker {
        let marker = if marker.is_relative() { cwd.join(marker) } else { marker };
        if let Err(e) = engine.enable_marker_file(&marker, now) {
            tracing::warn!("marker file disabled: {e}");
        }
    }
    if let Err(e) = engine.enable_commit_detection(&cwd, now) {
        tracing::info!("commit detection disabled: {e}");
    }
    engine
}

/// Handles one engine event and mirrors engine state into the UI.
fn dispatch(engine: &mut ReconciliationEngine, state: &mut app::AppState, event: EngineEvent) {
    let outcomes = engine.handle(state, event, Instant::now());
    after_engine(engine, state, &outcomes);
}

fn after_engine(engine: &ReconciliationEngine, state: &mut app::AppState, outcomes: &[Outcome]) {
    for outcome in outcomes {
        tracing::debug!(?outcome, "reconciliation outcome");
    }
    state.session_active = engine.session_active();
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Cli::parse();
    let (theme_name, engine_config) = load_config(&config_path());
    let _log_guard = init_logging();
    let theme = theme::Theme::from_name(&theme_name);

    let mut state = app::AppState::default();
    for file in &args.files {
        if let Err(e) = state.open(file) {
            eprintln!("redline: cannot open {}: {e}", file.display());
        }
    }

    let (engine_handle, mut engine_rx) = EngineHandle::channel();
    let mut engine = setup_engine(engine_config, &mut state, &engine_handle, args.marker);
    state.select(0);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    // Exits only via `break`, never via `?`, so `restore_tui()` always runs.
    'event_loop: loop {
        let deadline = engine.next_deadline();
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when the
            // terminal is quiet.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            _ = wait_for(deadline) => {
                let outcomes = engine.tick(&mut state, Instant::now());
                after_engine(&engine, &mut state, &outcomes);
            }
            Some(engine_event) = engine_rx.recv() => {
                dispatch(&mut engine, &mut state, engine_event);
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            tracing::error!("draw failed: {e}");
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Key(key)) => match handle_key(key, &mut state) {
                        KeyAction::Quit => break 'event_loop,
                        KeyAction::Dispatch(engine_event) => {
                            dispatch(&mut engine, &mut state, engine_event);
                        }
                        KeyAction::CloseDocument => {
                            if let Some(path) = state.current_path() {
                                dispatch(&mut engine, &mut state, EngineEvent::DocumentClosed(path));
                                state.close_current();
                            }
                        }
                        KeyAction::Continue => {}
                    },
                    Some(event::AppEvent::FocusGained) => {
                        dispatch(&mut engine, &mut state, EngineEvent::FocusGained);
                    }
                    Some(event::AppEvent::Resize(_, _)) => {
                        // ratatui picks up the new size on the next Render.
                    }
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    tracing::info!(open = state.open_documents().len(), "shutting down");
    engine.shutdown(&mut state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn marker_flag_and_files_parse() {
        let cli = Cli::try_parse_from(["redline", "--marker", "changes.txt", "a.rs", "b.rs"]).unwrap();
        assert_eq!(cli.marker, Some(PathBuf::from("changes.txt")));
        assert_eq!(cli.files, vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
    }

    #[test]
    fn marker_flag_needs_a_path() {
        assert!(Cli::try_parse_from(["redline", "--marker"]).is_err());
    }
}
