pub mod clock;
pub mod commands;
pub mod composer;
pub mod config;
pub mod error;
pub mod events;
pub mod render;
pub mod reply;
pub mod scroll;
pub mod session;
pub mod state;
pub mod window;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use crate::commands::Command;
use crate::config::ClientConfig;
use crate::state::AppState;

/// Install the global subscriber. Logs go to stderr so they do not
/// interleave with the conversation on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("murmur_client_lib=debug,murmur_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Interactive loop: reads commands from stdin and draws session events.
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    tracing::info!("Starting murmur");

    let mut state = AppState::open(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", commands::HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(cmd) = commands::parse(&line) else { continue };
                if cmd == Command::Quit {
                    break;
                }
                if let Err(e) = commands::dispatch(&mut state, cmd).await {
                    println!("error: {e}");
                }
            }
            event = state.next_event() => match event {
                Some(event) => render::present(&state, event).await,
                None => {
                    tracing::debug!("session event stream ended");
                    state.active = None;
                }
            },
        }
    }

    state.close_active().await;
    tracing::info!("Shutting down");
    Ok(())
}
