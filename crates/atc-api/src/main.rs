use anyhow::Context;
use atc_api::Server;
use atc_core::{telemetry, ConfigManager};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "atc-proxy")]
#[command(about = "Relay ATC phrases to a chat-completion API and return plain-English explanations", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration environment; selects `<env>.toml` in the config directory
    #[arg(long)]
    env: Option<String>,

    /// Directory holding `default.toml` and friends
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConfigManager::load(cli.env, cli.config_dir).context("loading configuration")?;

    telemetry::init_tracing(&config.settings().logging.level);
    info!(
        config_dir = %config.config_dir().display(),
        env = %config.settings().env,
        model = %config.settings().llm.model,
        "Configuration loaded"
    );

    let settings = config.into_settings();
    if settings.secrets.openai_api_key.is_none() {
        warn!(
            "{} is not set; decode requests will fail until it is configured",
            atc_core::config::OPENAI_API_KEY_ENV
        );
    }

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("server.host must be an IP address")?;

    let server = Server::new(addr, &settings)?;
    server.run().await?;
    Ok(())
}
