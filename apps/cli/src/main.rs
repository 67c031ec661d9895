use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, ChatClient, ClientEvent};
use shared::domain::ConnectionState;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{Command, IdentityTracker};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the chat server")]
struct Args {
    /// WebSocket endpoint, e.g. ws://localhost:8081/ws
    #[arg(long)]
    server_url: Option<String>,
    /// Display name sent as soon as the connection opens
    #[arg(long)]
    name: Option<String>,
    /// Path to a client.toml settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }

    let (client, events) = ChatClient::connect(&settings)
        .with_context(|| format!("failed to start client for {}", settings.server_url))?;
    let tracker = IdentityTracker::default();
    let auto_name = args.name.map(|name| (client.clone(), name));
    let printer = tokio::spawn(print_events(events, auto_name, tracker.clone()));

    println!("connecting to {} ...", settings.server_url);
    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = Command::parse(&line, tracker.is_named());
        let result = match command {
            Command::SetIdentity(name) => client.set_identity(name),
            Command::Send(text) => client.send(text),
            Command::Public => client.enter_public(),
            Command::Private => client.enter_private(),
            Command::SelectPeer(name) => client.select_peer(name),
            Command::Rename(name) => client.rename(name),
            Command::Help => {
                println!("{}", commands::HELP);
                Ok(())
            }
            Command::Quit => break,
        };
        if let Err(err) = result {
            warn!(error = %err, "cli: command rejected");
            break;
        }
    }

    let _ = client.close();
    drop(client);
    if tokio::time::timeout(SHUTDOWN_GRACE, printer).await.is_err() {
        warn!("cli: connection did not close in time");
    }
    Ok(())
}

async fn print_events(
    mut events: broadcast::Receiver<ClientEvent>,
    mut auto_name: Option<(ChatClient, String)>,
    tracker: IdentityTracker,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "cli: event stream lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        tracker.observe(&event);

        match event {
            ClientEvent::Chat {
                from,
                content,
                is_own,
            } => {
                let marker = if is_own { "*" } else { " " };
                println!("{marker}{from}: {content}");
            }
            ClientEvent::System(content) => println!("[system] {content}"),
            ClientEvent::PeerList(names) if names.is_empty() => {
                println!("[users] nobody else is online");
            }
            ClientEvent::PeerList(names) => {
                println!("[users] {} (use /to <name>)", names.join(", "));
            }
            ClientEvent::Identity(name) => println!("[you] {name}"),
            ClientEvent::ConnectionStatus(state) => {
                println!("[status] {state}");
                // The handle is only needed while the connection can still open.
                if state.is_terminal() {
                    auto_name = None;
                }
                if state == ConnectionState::Closed {
                    break;
                }
            }
            ClientEvent::IdentityRequested => match auto_name.take() {
                Some((client, name)) => {
                    if let Err(err) = client.set_identity(name) {
                        warn!(error = %err, "cli: could not submit display name");
                    }
                }
                None => println!("enter your display name:"),
            },
            ClientEvent::InputRejected(err) => println!("[input] {err}"),
        }
    }
}
