//! mini-ai-gateway - OpenAI-compatible gateway for local AI capabilities
//!
//! Loads `.env`, reads configuration from the environment and serves HTTP.

#![allow(missing_docs)]

use clap::Parser;
use mini_ai_gateway::{Config, Gateway, server};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Command line overrides; everything else comes from the environment
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about)]
struct Args {
    /// Environment file loaded before reading configuration
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Listen host (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let env_loaded = match &args.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| Some(path.clone())),
        None => Ok(dotenvy::dotenv().ok()),
    };

    init_logging();

    match env_loaded {
        Ok(Some(path)) => tracing::debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: failed to load environment file: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Level from LOG_LEVEL; LOG_FORMAT=json switches to structured output
fn init_logging() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

async fn run(args: Args) -> mini_ai_gateway::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let gateway = Gateway::new(config)?;
    server::builder::run_server(gateway).await
}
