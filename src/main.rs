//! mysafe: wallet connection from the command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   config (TOML) ──▶ discovery ──▶ registry ──▶ store.wallets ──▶ modal view
//!                                       │
//!   `connect <WALLET>` ─────────────────┴──▶ connector ──▶ store.connected
//!                                                              ▲
//!   wallet events (memory / polled node) ──▶ event sync ───────┘
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use mysafe::config::watcher::ConfigWatcher;
use mysafe::config::{load_config, AppConfig};
use mysafe::lifecycle::{shutdown_signal, App};
use mysafe::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "mysafe")]
#[command(about = "Discover and connect wallets for the mysafe bank", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply without one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered wallets
    Wallets,
    /// Connect to a wallet by uuid, rdns or name
    Connect {
        wallet: String,

        /// Switch to this chain after connecting
        #[arg(long)]
        chain: Option<u64>,

        /// Keep following wallet events until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mysafe starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let app = App::bootstrap(&config);

    match cli.command {
        Commands::Wallets => {
            let button = app.connect_button();
            button.click();
            println!("{}", app.shell.render(&button.modal().view()));
            app.shutdown();
        }
        Commands::Connect {
            wallet,
            chain,
            watch,
        } => {
            let Some(detail) = app.registry.lookup(&wallet) else {
                app.shutdown();
                return Err(format!("no wallet matches '{wallet}'").into());
            };

            let button = app.connect_button();
            button.click();
            button.modal().select(&detail).await;

            if let Some(chain_id) = chain {
                if let Err(e) = app.connector.switch_chain(chain_id).await {
                    eprintln!("Chain switch failed: {e}");
                }
            }
            println!("{}", app.shell.render(&button.modal().view()));

            if watch {
                follow(app, cli.config.as_deref(), &config).await?;
            } else {
                app.shutdown();
            }
        }
    }

    Ok(())
}

/// Print every change to the connection until a shutdown signal arrives.
async fn follow(
    mut app: App,
    config_path: Option<&Path>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = app.spawn_pollers();
    tracing::debug!(pollers = started, "Event pollers started");

    let printer = app.store.connected.subscribe(|connected| match connected {
        Some(wallet) => println!(
            "account={} chain={}",
            wallet.primary_account().unwrap_or("-"),
            wallet.chain_id
        ),
        None => println!("disconnected"),
    });

    let (reloads, _watcher) = match config_path {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path, config);
            (Some(rx), Some(watcher.run()?))
        }
        None => (None, None),
    };

    tracing::info!("Following wallet events, press Ctrl-C to stop");
    match reloads {
        Some(mut reloads) => loop {
            tokio::select! {
                _ = shutdown_signal() => break,
                Some(config) = reloads.recv() => {
                    app.reload(&config);
                }
            }
        },
        None => shutdown_signal().await,
    }

    printer.unsubscribe();
    app.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
