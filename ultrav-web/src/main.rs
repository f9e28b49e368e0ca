use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use ultrav_web::{run_server, AppState, ServerConfig, Translations};

#[derive(Parser, Debug)]
#[command(name = "ultrav-web")]
#[command(about = "Serve the Ultra-V site")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig { bind: cli.bind };
    run_server(config, AppState::new(Translations::builtin())).await?;
    Ok(())
}
