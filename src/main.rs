//! sykmeldinger-arbeidsgiver
//!
//! Syncs sykmeldinger, narmesteleder relations and read-status counters
//! from Kafka into Postgres and serves the authenticated Dine Sykmeldte
//! read API:
//! - One sync consumer per topic with upsert/tombstone semantics
//! - Join-based read projections computed at query time
//! - Leader-elected retention sweeper for records outside the sync window

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use db::{Db, DatabaseConfig};
use kafka::KafkaConfig;
use telemetry::{health, init_tracing_from_env};
use worker::{
    AlwaysLeader, LeaderElector, PdlConfig, PdlPersonClient, PersonLookup, PodLeaderElector,
    Shutdown, SyncScheduler,
};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Cluster name; anything but dev-gcp treats pdl "not found" as fatal
    #[serde(default = "default_cluster")]
    cluster: String,

    /// Token introspection endpoint ("mock" accepts any bearer token)
    #[serde(default = "default_introspection_url")]
    introspection_url: String,

    /// Elector sidecar URL; absent means this instance always leads
    #[serde(default)]
    elector_url: Option<String>,

    #[serde(default)]
    kafka: KafkaConfig,

    #[serde(default)]
    database: DatabaseConfig,

    #[serde(default)]
    pdl: PdlConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cluster() -> String {
    "dev-gcp".to_string()
}

fn default_introspection_url() -> String {
    "mock".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cluster: default_cluster(),
            introspection_url: default_introspection_url(),
            elector_url: None,
            kafka: KafkaConfig::default(),
            database: DatabaseConfig::default(),
            pdl: PdlConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider BEFORE any TLS operations
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!(
        "Starting sykmeldinger-arbeidsgiver v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = load_config()?;

    info!(
        cluster = %config.cluster,
        brokers = ?config.kafka.brokers,
        "Loaded configuration"
    );

    // Connect the store and make sure the schema exists
    let database = Arc::new(
        Db::connect(config.database.clone())
            .await
            .context("Failed to connect to postgres")?,
    );
    db::health::init_schema(&database)
        .await
        .context("Failed to initialize postgres schema")?;

    // Check component health and update probe status
    check_health(&config, &database).await;

    // Shutdown token shared by every long-running loop
    let shutdown = Shutdown::new();

    // PDL enrichment client
    let person_lookup: Arc<dyn PersonLookup> = Arc::new(
        PdlPersonClient::new(config.pdl.clone())
            .map_err(|e| anyhow::anyhow!("Failed to create pdl client: {}", e))?,
    );

    // Leader election for the retention sweeper
    let elector: Arc<dyn LeaderElector> = match &config.elector_url {
        Some(url) => Arc::new(PodLeaderElector::new(url.clone())),
        None => Arc::new(AlwaysLeader),
    };

    // Start the sync consumers and the retention sweeper
    let scheduler = SyncScheduler::new(
        database.clone(),
        config.kafka.clone(),
        person_lookup,
        elector,
        config.cluster.clone(),
    );
    let _worker_handles = scheduler.start(shutdown.clone());

    // Create application state and router
    let state = AppState::new(database.clone(), config.introspection_url.clone());
    let app = router(state);

    // Trip the shutdown token on SIGINT/SIGTERM
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        health().set_shutting_down();
        signal_shutdown.trigger();
    });

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Serve until the shutdown token trips (OS signal or a fatal consumer)
    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_shutdown.triggered().await })
        .await
        .context("Server error")?;

    info!("Shutting down...");
    shutdown.trigger();

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("SYKMELDINGER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(brokers) = std::env::var("SYKMELDINGER_KAFKA_BROKERS") {
        config.kafka.brokers = brokers.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Ok(username) = std::env::var("SYKMELDINGER_KAFKA_SASL_USERNAME") {
        config.kafka.sasl_username = Some(username);
    }
    if let Ok(password) = std::env::var("SYKMELDINGER_KAFKA_SASL_PASSWORD") {
        config.kafka.sasl_password = Some(password);
    }
    if let Ok(url) = std::env::var("SYKMELDINGER_DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(url) = std::env::var("SYKMELDINGER_INTROSPECTION_URL") {
        config.introspection_url = url;
    }

    // Platform-provided environment
    if let Ok(cluster) = std::env::var("NAIS_CLUSTER_NAME") {
        config.cluster = cluster;
    }
    if let Ok(elector_path) = std::env::var("ELECTOR_PATH") {
        config.elector_url = Some(format!("http://{}", elector_path));
    }

    Ok(config)
}

/// Check component health on startup.
async fn check_health(config: &Config, database: &Db) {
    let kafka_healthy = kafka::health::check_connection(&config.kafka).await;
    if kafka_healthy {
        health().kafka.set_healthy();
        info!("Kafka connection: healthy");
    } else {
        health().kafka.set_unhealthy("Connection failed");
        error!("Kafka connection: unhealthy");
    }

    let postgres_healthy = db::health::check_connection(database).await;
    if postgres_healthy {
        health().postgres.set_healthy();
        info!("Postgres connection: healthy");
    } else {
        health().postgres.set_unhealthy("Connection failed");
        error!("Postgres connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
