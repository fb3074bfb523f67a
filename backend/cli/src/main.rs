mod popup_cmd;
mod status_cmd;
mod stores;
mod terminal_output;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use folio_config::{FolioConfig, LoggingConfig};
use folio_gateway::GatewayState;
use folio_logging::{init_logger, LoggingOptions};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio: portfolio site backend")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (defaults to ~/.folio/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Count one visit against the configured store and print the total
    Count,
    /// Query the health endpoint of a running server
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Preview the referral popup in the terminal
    Popup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| folio_config::config_file_path(&folio_config::config_dir()));
    let config = folio_config::load_and_prepare(&config_path)
        .await
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    init_logger(&logging_options(config.logging.as_ref()));

    match cli.command {
        Commands::Serve { port } => run_server(config, port).await?,
        Commands::Count => {
            let counter = stores::visitor_counter(&config)?;
            let count = counter.increment_and_get().await?;
            terminal_output::note_success(&format!("Visitor count: {count}"));
        }
        Commands::Status { port } => {
            let port = port.unwrap_or_else(|| gateway_port(&config));
            status_cmd::run(port).await?;
        }
        Commands::Popup => popup_cmd::run(&config).await?,
    }

    Ok(())
}

fn logging_options(logging: Option<&LoggingConfig>) -> LoggingOptions {
    let defaults = LoggingOptions::default();
    match logging {
        Some(logging) => LoggingOptions {
            level: logging.level.clone().unwrap_or(defaults.level),
            dir: logging.dir.as_ref().map(PathBuf::from),
            json: logging.json.unwrap_or(defaults.json),
        },
        None => defaults,
    }
}

fn gateway_port(config: &FolioConfig) -> u16 {
    config
        .gateway
        .as_ref()
        .and_then(|g| g.port)
        .unwrap_or(folio_config::defaults::DEFAULT_PORT)
}

async fn run_server(config: FolioConfig, port: Option<u16>) -> Result<()> {
    let bind = config
        .gateway
        .as_ref()
        .and_then(|g| g.bind.clone())
        .unwrap_or_else(|| folio_config::defaults::DEFAULT_BIND.to_string());
    let port = port.unwrap_or_else(|| gateway_port(&config));
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;

    let counter = stores::visitor_counter(&config)?;
    info!(
        %addr,
        path = %counter.path(),
        strategy = ?counter.strategy(),
        "Starting Folio gateway"
    );

    folio_gateway::start_server(addr, Arc::new(GatewayState { counter })).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_with_port() {
        let cli = Cli::try_parse_from(["folio", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::try_parse_from(["folio", "popup", "--config", "/tmp/site.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/site.yaml")));
        assert!(matches!(cli.command, Commands::Popup));
    }

    #[test]
    fn test_logging_options_from_config() {
        let options = logging_options(Some(&LoggingConfig {
            level: Some("debug".into()),
            dir: Some("/var/log/folio".into()),
            json: None,
        }));
        assert_eq!(options.level, "debug");
        assert_eq!(options.dir, Some(PathBuf::from("/var/log/folio")));
        assert!(!options.json);
    }
}
