mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geoseed_core::{
    load_config, validate_config, AdminApi, GeoServerClient, Provisioner, SanitizedConfig,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file used when none is given; optional.
const DEFAULT_CONFIG: &str = "geoseed.toml";

#[derive(Parser)]
#[command(
    name = "geoseed",
    about = "Provision a GeoServer workspace: tile datastore, layers, style, layer group",
    version
)]
struct Cli {
    /// Configuration file (default: ./geoseed.toml when present)
    #[arg(long, short, env = "GEOSEED_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration (password redacted) and exit
    #[arg(long)]
    show_config: bool,

    /// Print the final report as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,reqwest=warn,hyper=warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // An explicitly named config must exist; the default one is optional.
    let (config_path, required) = match cli.config {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path, required)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    if cli.show_config {
        let sanitized = SanitizedConfig::from(&config);
        println!("{}", serde_json::to_string_pretty(&sanitized)?);
        return Ok(());
    }

    info!(version = VERSION, "geoseed starting");
    info!("Target server: {}", config.server.url);
    info!(
        "Workspace: {}, datastore: {}",
        config.workspace.name, config.datastore.name
    );

    let api: Arc<dyn AdminApi> = Arc::new(GeoServerClient::new(config.server.clone()));
    let provisioner = Provisioner::new(config.clone(), api);

    let report = provisioner
        .run()
        .await
        .context("Provisioning aborted")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_summary(&report, &config);
    }

    Ok(())
}
