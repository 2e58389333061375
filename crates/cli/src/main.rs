use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use perch_whatsapp::{IdentityStore, NoopBackendFactory, SessionManager};

#[derive(Parser)]
#[command(name = "perch", about = "Perch: panel + messaging monitoring relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server.
    Serve {
        /// Override the configured bind address.
        #[arg(long)]
        bind: Option<String>,
        /// Override the configured port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check panel connectivity and exit.
    Probe,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "perch starting");

    match cli.command {
        Commands::Serve { bind, port } => {
            let mut config = perch_config::discover_and_load();
            if let Some(bind) = bind {
                config.gateway.bind = bind;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }

            let identity =
                IdentityStore::new(config.whatsapp_data_dir(), config.whatsapp.client_id.clone());
            let session = SessionManager::new(identity, Arc::new(NoopBackendFactory));
            session.initialize().await;

            perch_gateway::server::start(&config, session).await
        },
        Commands::Probe => {
            let config = perch_config::discover_and_load();
            let panel =
                perch_panel::PanelClient::new(&config.panel.base_url, &config.panel.api_key)?;
            match panel.probe().await {
                Ok(()) => {
                    println!("panel reachable: {}", config.panel.base_url);
                    Ok(())
                },
                Err(e) => {
                    eprintln!("panel unreachable: {e}");
                    std::process::exit(1);
                },
            }
        },
    }
}
