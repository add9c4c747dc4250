//! Linecmd daemon — newline-delimited JSON command server over TCP.

mod logging;

use clap::{Parser, Subcommand};
use linecmd_server::{register_builtins, Client, CommandRegistry, Server, DEFAULT_BIND_ADDR};
use logging::init_logging;
use tracing::info;

/// Linecmd daemon command-line interface.
#[derive(Parser)]
#[command(name = "linecmdd")]
#[command(about = "Newline-delimited JSON command server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Address to listen on (or probe, for `status`)
    #[arg(long, env = "LINECMD_BIND", default_value = DEFAULT_BIND_ADDR, global = true)]
    bind: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in the foreground
    Serve,
    /// Check whether a server is accepting connections
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    match cli.command {
        Some(Commands::Serve) | None => serve(&cli.bind).await?,
        Some(Commands::Status) => status(&cli.bind).await,
    }

    Ok(())
}

async fn serve(bind: &str) -> anyhow::Result<()> {
    let registry = CommandRegistry::new();
    register_builtins(&registry).await;

    let server = Server::new(registry);
    server.start(bind).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    server.stop().await;

    Ok(())
}

async fn status(bind: &str) {
    let client = Client::new(bind);
    if client.is_running().await {
        println!("linecmdd is running at {}", bind);
    } else {
        println!("linecmdd is not running at {}", bind);
        std::process::exit(1);
    }
}
