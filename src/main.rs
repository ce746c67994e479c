//! Layout supervisor: command-line entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  TcpLineTransport   ServoKit        MonotonicClock           │
//! │  (Transport)        (ServoOutput)   (Clock)                  │
//! │  LogEventSink                                                │
//! │  (EventSink)                                                 │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ───────────────         │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          Supervisor (single-threaded loop)             │  │
//! │  │  DeviceRegistry · Turnout · Signal · Motion            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `serve` runs the supervisor; `send` is a one-shot panel request.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use layoutctl::adapters::log_sink::LogEventSink;
use layoutctl::adapters::servo_kit::ServoKit;
use layoutctl::adapters::tcp::{TcpLineTransport, TcpRequestChannel};
use layoutctl::adapters::time::MonotonicClock;
use layoutctl::app::service::Supervisor;
use layoutctl::client::PanelClient;
use layoutctl::config::SupervisorConfig;
use layoutctl::registry::DeviceRegistry;
use layoutctl::rpc::command::Command;
use layoutctl::rpc::transport::RequestChannel;

#[derive(Parser)]
#[command(name = "layout-supervisor")]
#[command(version)]
#[command(about = "Servo supervisor for model railway turnouts and signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the supervisor loop until a panel sends `shutdown`
    Serve {
        /// JSON configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Override the configured listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Send one request to a running supervisor and print the reply
    Send {
        /// Supervisor address (host:port)
        #[arg(short, long, default_value = "127.0.0.1:5555")]
        connect: String,

        /// For `set` requests, poll `status` until the device is on target
        #[arg(short, long)]
        wait: bool,

        /// Request line, e.g. `set:turnout:West:reverse`
        request: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn serve(config_path: PathBuf, listen: Option<String>) -> Result<()> {
    let mut config = SupervisorConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(listen) = listen {
        config.listen = listen;
    }

    let kit = ServoKit::new(config.channels);
    let registry = DeviceRegistry::from_config(&config, |ch| Box::new(kit.channel(ch)))
        .context("registering devices")?;
    let transport = TcpLineTransport::bind(config.listen.as_str())
        .with_context(|| format!("binding {}", config.listen))?;

    let mut supervisor = Supervisor::new(
        config.name.clone(),
        registry,
        transport,
        MonotonicClock::new(),
        config.poll_wait(),
    );
    supervisor.run(&mut LogEventSink::new());
    Ok(())
}

fn send(connect: &str, wait: bool, request: &str) -> Result<()> {
    let addr = connect
        .to_socket_addrs()
        .with_context(|| format!("resolving {connect}"))?
        .next()
        .with_context(|| format!("{connect} resolved to no address"))?;
    let mut channel = TcpRequestChannel::connect(addr, TcpRequestChannel::DEFAULT_TIMEOUT)
        .with_context(|| format!("connecting to {addr}"))?;

    if !wait {
        // Unvalidated; the supervisor answers `error` for bad requests.
        let reply = channel.request(request)?;
        println!("{reply}");
        return Ok(());
    }

    let mut client = PanelClient::new(channel);
    match request.parse::<Command>() {
        Ok(Command::SetTurnout { id, setting }) => client.set_turnout(&id, setting)?,
        Ok(Command::SetSignal { id, aspect }) => client.set_signal(&id, aspect)?,
        Ok(_) => bail!("--wait only applies to set requests"),
        Err(e) => bail!("'{request}' is not a valid request: {e}"),
    }
    println!("set");
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            info!("layout-supervisor v{}", env!("CARGO_PKG_VERSION"));
            serve(config, listen)
        }
        Commands::Send {
            connect,
            wait,
            request,
        } => send(&connect, wait, &request),
    }
}
