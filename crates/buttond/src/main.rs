use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use buttond::Config;
use buttond::Engine;
use buttond::EngineSettings;
use buttond::bus::EventIngestor;
use buttond::bus::RumqttcClient;
use buttond::fixtures::HttpFixtureClient;
use clap::Parser;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Turns button presses into lighting commands
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(default_value = "buttond.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(config.logging.targets())
        .init();

    info!("buttond starting");
    info!("Loaded config from: {}", args.config.display());

    let client = match HttpFixtureClient::connect(&config.fixtures).await {
        Ok(client) => client,
        Err(e) => {
            error!("Fixture service at {} is not usable: {}", config.fixtures.base_url, e);
            return Err(e).context("Failed to connect to fixture service");
        }
    };
    info!("Fixture service at {} is up", config.fixtures.base_url);

    let engine = Engine::new(Arc::new(client), EngineSettings::from(&config));

    info!(
        "Connecting to MQTT broker at {}:{}",
        config.bus.broker, config.bus.port
    );
    let ingestor = EventIngestor::new(
        RumqttcClient::new(&config.bus),
        config.bus.topic.clone(),
        engine.sender(),
    );

    let mut ingest_task = tokio::spawn(ingestor.run());
    let mut engine_task = tokio::spawn(engine.run());

    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        },
        result = &mut ingest_task => match result {
            Ok(Ok(())) => warn!("Event ingest ended"),
            Ok(Err(e)) => error!("Event ingest failed: {}", e),
            Err(e) => error!("Event ingest task failed: {}", e),
        },
        result = &mut engine_task => match result {
            Ok(()) => warn!("Engine stopped"),
            Err(e) => error!("Engine task failed: {}", e),
        },
    }

    ingest_task.abort();
    engine_task.abort();

    info!("buttond shutdown complete");

    Ok(())
}
