//! Headless pantheon progression server.
//!
//! Reads JSON lines from stdin (game events and player commands, see
//! [`input`]) and writes every progression event to stdout as a JSON line.
//! Player notifications go to the log. The world is saved on EOF or Ctrl-C.
//!
//! ```bash
//! PANTHEON_DATA_DIR=./world RUST_LOG=debug cargo run -p pantheon-server < session.jsonl
//! ```

mod config;
mod input;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use pantheon_runtime::{
    Event, FileWorldStorage, InMemoryStatSink, LogNotifier, Runtime, RuntimeConfig, Topic,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::config::ServerConfig;
use crate::input::Input;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let server_config = ServerConfig::from_env();

    // 2. Setup logging
    let _guard = logging::setup_logging(server_config.log_dir.as_deref())?;

    tracing::info!("Starting pantheon server");

    // 3. Load content and open world storage
    let content = server_config.load_content()?;
    let world_dir = server_config.world_dir();
    let storage = FileWorldStorage::new(&world_dir)
        .with_context(|| format!("Failed to open world storage at {}", world_dir.display()))?;
    tracing::info!("World storage: {}", world_dir.display());

    // 4. Build Runtime
    let mut runtime_config = RuntimeConfig::default();
    if let Some(capacity) = server_config.event_buffer {
        runtime_config.event_buffer_size = capacity;
    }
    let mut runtime = Runtime::builder()
        .config(runtime_config)
        .content(content)
        .storage(Arc::new(storage))
        .notifier(LogNotifier)
        .stat_sink(InMemoryStatSink::new())
        .build()?;

    // 5. Stream progression events to stdout
    let mut events = runtime.subscribe(Topic::Progression);
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::Progression(event)) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("Failed to encode event: {e}"),
                },
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 6. Feed stdin into the runtime until EOF or Ctrl-C
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    tracing::info!("Input closed");
                    break;
                };
                handle_line(&mut runtime, &line);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    runtime.shutdown()?;
    printer.await.context("Event printer panicked")?;

    Ok(())
}

fn handle_line(runtime: &mut Runtime, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }

    match Input::parse(line) {
        Ok(Input::Event(event)) => {
            if let Err(e) = runtime.dispatch(event) {
                tracing::warn!("Event failed: {e}");
            }
        }
        Ok(Input::Command { player, command }) => {
            // The reason has already been sent to the player.
            let _ = runtime.execute(&player, &command);
        }
        Err(e) => tracing::warn!("Ignoring malformed input {line:?}: {e}"),
    }
}
