//! Slate entrypoint.
//!
//! Wires configuration, logging, and the TCP transport around the session
//! loop. Default mode dials the rendering surface; `--listen` inverts that
//! and accepts surface connections, one independent session per connection.

use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{DiskStore, FileStore};
use core_render::Theme;
use core_state::EditorState;
use core_text::Buffer;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod session;
use session::Session;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "slate", version, about = "Text-editing engine for a remote rendering surface")]
struct Args {
    /// Path to open at startup. The file does not have to exist yet; saving
    /// will create it.
    path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `slate.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Surface address to connect to (overrides the config file).
    #[arg(long, conflicts_with = "listen")]
    connect: Option<String>,
    /// Accept surface connections on this address instead of dialing out.
    #[arg(long)]
    listen: Option<String>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_path = std::path::Path::new("slate.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }
    let file_appender = tracing_appender::rolling::never(".", "slate.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed; drop the guard so the writer
        // shuts down.
        Err(_) => None,
    }
}

/// Build the startup state. An unreadable path still becomes the session's
/// path (so saving creates it) with the failure in the status bar.
fn bootstrap_state(path: Option<PathBuf>) -> EditorState {
    let Some(path) = path else {
        return EditorState::new(Buffer::new());
    };
    match DiskStore.load(&path) {
        Ok(lines) => {
            info!(target: "io", path = %path.display(), lines = lines.len(), "opened file");
            EditorState::with_path(Buffer::from_lines(&lines), path)
        }
        Err(e) => {
            warn!(target: "io", path = %path.display(), error = %e, "open failed, starting empty");
            let mut state = EditorState::with_path(Buffer::new(), path);
            state.status_message = Some(format!("Open failed: {e}"));
            state
        }
    }
}

fn run_connect(address: &str, state: EditorState, theme: Theme, tab_width: usize) -> Result<()> {
    let stream = TcpStream::connect(address)
        .with_context(|| format!("connecting to surface at {address}"))?;
    let _ = stream.set_nodelay(true);
    info!(target: "runtime", address, "connected to surface");
    let reader = stream.try_clone().context("cloning surface stream")?;
    Session::new(reader, stream, state, theme, tab_width).run()?;
    info!(target: "runtime", "session closed");
    Ok(())
}

fn run_listener(address: &str, state: EditorState, theme: Theme, tab_width: usize) -> Result<()> {
    let listener =
        TcpListener::bind(address).with_context(|| format!("binding listener at {address}"))?;
    info!(target: "runtime", address, "listening for surfaces");
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                warn!(target: "runtime", error = %e, "accept failed");
                continue;
            }
        };
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let reader = match stream.try_clone() {
            Ok(r) => r,
            Err(e) => {
                error!(target: "runtime", %peer, error = %e, "stream clone failed");
                continue;
            }
        };
        let _ = stream.set_nodelay(true);
        info!(target: "runtime", %peer, "surface connected");
        // Each surface gets its own state; sessions never share documents.
        let state = state.clone();
        thread::spawn(move || {
            match Session::new(reader, stream, state, theme, tab_width).run() {
                Ok(()) => info!(target: "session", %peer, "session closed"),
                Err(e) => error!(target: "session", %peer, error = %e, "session error"),
            }
        });
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    info!(target: "runtime", "startup");

    let config = core_config::load_from(args.config.clone())?;
    let theme = config.theme.resolve();
    let tab_width = config.editor.tab_width;
    let state = bootstrap_state(args.path.clone());

    match args.listen.as_deref() {
        Some(address) => run_listener(address, state, theme, tab_width),
        None => {
            let address = args
                .connect
                .unwrap_or_else(|| config.connection.address());
            run_connect(&address, state, theme, tab_width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_loads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "alpha\nbeta\n").unwrap();
        let state = bootstrap_state(Some(path.clone()));
        // Trailing newline yields a final empty line, as the buffer counts it.
        assert_eq!(
            state.buffer.lines(),
            vec!["alpha".to_string(), "beta".into(), "".into()]
        );
        assert_eq!(state.path.as_deref(), Some(path.as_path()));
        assert!(!state.modified);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn bootstrap_missing_file_keeps_path_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let state = bootstrap_state(Some(path.clone()));
        assert_eq!(state.buffer.lines(), vec!["".to_string()]);
        assert_eq!(state.path.as_deref(), Some(path.as_path()));
        let msg = state.status_message.expect("failure surfaces in status");
        assert!(msg.starts_with("Open failed"));
    }

    #[test]
    fn bootstrap_without_path_is_untitled() {
        let state = bootstrap_state(None);
        assert!(state.path.is_none());
        assert_eq!(state.file_name(), "Untitled");
    }

    #[test]
    fn cli_connect_and_listen_are_exclusive() {
        use clap::CommandFactory;
        let err = Args::command()
            .try_get_matches_from(["slate", "--connect", "a:1", "--listen", "b:2"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
