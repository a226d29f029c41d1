//! Verident daemon — entry point for running the webhook server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use verident_engine::{
    run_dispatch_worker, AuditLogger, ChainIngestor, DocumentIngestor, HttpActionTrigger,
    PostVerificationDispatcher, Reconciler,
};
use verident_ingress::{AppState, IngressMetrics, WebhookServer};
use verident_signature::SecretRegistry;
use verident_store_memory::MemoryStore;

mod config;
mod logging;

use config::ServerConfig;
use logging::LogFormat;

#[derive(Parser)]
#[command(name = "verident-daemon", about = "Verident webhook reconciliation daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "VERIDENT_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind the webhook listener to.
    #[arg(long, env = "VERIDENT_BIND")]
    bind: Option<String>,

    /// Port for the webhook listener.
    #[arg(long, env = "VERIDENT_PORT")]
    port: Option<u16>,

    /// URL of the downstream named-action endpoint.
    #[arg(long, env = "VERIDENT_ACTION_ENDPOINT")]
    action_endpoint: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VERIDENT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VERIDENT_LOG_FORMAT")]
    log_format: Option<String>,
}

/// Load the base config from the file named on the CLI, then apply CLI
/// overrides. Runs before the tracing subscriber exists, so problems are
/// reported as a note for the caller to log once logging is up.
fn load_config(cli: &Cli) -> (ServerConfig, Option<String>) {
    let mut note = None;
    let mut config = match &cli.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ServerConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(e) => {
                    note = Some(format!("failed to parse config file: {e}, using defaults"));
                    ServerConfig::default()
                }
            },
            Err(e) => {
                note = Some(format!(
                    "failed to read config file {}: {e}, using defaults",
                    path.display()
                ));
                ServerConfig::default()
            }
        },
        None => ServerConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(endpoint) = &cli.action_endpoint {
        config.action_endpoint = Some(endpoint.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    (config, note)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_note) = load_config(&cli);

    logging::init_logging(LogFormat::parse(&config.log_format), &config.log_level);
    if let Some(note) = config_note {
        tracing::warn!("{note}");
    } else if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    let store = Arc::new(MemoryStore::new());
    let audit = AuditLogger::new(store.clone());

    let (dispatcher, dispatch_rx) = PostVerificationDispatcher::new(config.dispatch_queue_depth);
    let trigger = config.action_endpoint.as_deref().map(HttpActionTrigger::new);
    if trigger.is_none() {
        tracing::warn!("no action endpoint configured; post-verification actions will be dropped");
    }
    tokio::spawn(run_dispatch_worker(dispatch_rx, trigger));

    let secrets = SecretRegistry::from_pairs(config.secrets.clone());
    let configured: Vec<&str> = secrets.providers().collect();
    tracing::info!(providers = ?configured, "webhook secrets configured");

    let state = AppState {
        secrets,
        reconciler: Reconciler::new(
            store.clone(),
            store.clone(),
            audit.clone(),
            Arc::new(dispatcher),
        ),
        chain: ChainIngestor::new(store.clone(), store.clone(), audit.clone()),
        documents: DocumentIngestor::new(store.clone(), store.clone(), audit),
        metrics: IngressMetrics::new(),
    };

    let server = WebhookServer::new(config.bind.clone(), config.port, Arc::new(state));
    server.start().await?;

    tracing::info!("verident daemon exited cleanly");
    Ok(())
}
