mod auth;
mod config;
mod email;
mod error;
mod google;
mod handlers;
mod metrics;
mod server;
mod sweep;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Router};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use hirelane_billing::{BillingConfig, MockPaymentGateway};
use hirelane_events::EventBus;
use hirelane_events_memory::MemoryEventBus;
use hirelane_storage::{CreatePrincipalParams, Role, Store, StoreError};
use hirelane_store_sqlite::SqliteStore;

use config::ServerConfig;
use server::AppState;

// ────────────────────────────── CLI Types ──────────────────────────────

#[derive(Parser)]
#[command(name = "hirelane-server")]
#[command(about = "Hirelane server CLI for administration and serving")]
struct Cli {
    /// Database URL (sqlite://path/to/db.db)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// API listen address
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: String,

        /// Health check / metrics listen address
        #[arg(long, default_value = "0.0.0.0:8080")]
        health_addr: String,
    },
    /// Admin account management
    Admin {
        #[command(subcommand)]
        admin_cmd: AdminCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create a platform admin (there is no self-serve admin registration)
    Create {
        #[arg(long)]
        email: String,

        #[arg(long)]
        full_name: String,

        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hirelane_server=info,hirelane_billing=info")),
        )
        .init();

    let cli = Cli::parse();
    let db_url = cli
        .database_url
        .unwrap_or_else(|| "sqlite://hirelane.db".to_string());

    match cli.command {
        Command::Serve { addr, health_addr } => cmd_serve(&db_url, &addr, &health_addr).await,
        Command::Admin {
            admin_cmd: AdminCommand::Create {
                email,
                full_name,
                password,
            },
        } => cmd_admin_create(&db_url, &email, &full_name, &password).await,
    }
}

// ───────────────────────────── Serve command ───────────────────────────

async fn cmd_serve(
    db_url: &str,
    addr: &str,
    health_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr: std::net::SocketAddr = addr.parse()?;
    let health_addr: std::net::SocketAddr = health_addr.parse()?;

    let config = ServerConfig::from_env()?;
    let billing = match BillingConfig::from_env() {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "payment gateway not configured, using test credentials");
            BillingConfig::test()
        }
    };

    let email_provider: Option<Arc<dyn email::EmailProvider>> = match &config.email {
        Some(email_config) => {
            let provider = email::create_provider(email_config)?;
            Some(Arc::from(provider))
        }
        None => {
            tracing::warn!("no email provider configured, notification emails are disabled");
            None
        }
    };

    let store = Arc::new(SqliteStore::open(db_url).await?);
    let events: Arc<dyn EventBus> = Arc::new(MemoryEventBus::new());
    let state = AppState::new_sqlite(
        store,
        events,
        config,
        billing,
        Arc::new(MockPaymentGateway),
        email_provider,
    );

    let metrics_handle = metrics::init_metrics();

    // Hourly subscription-expiry sweep (plus code/denylist cleanup).
    let _sweeper = sweep::spawn(state.clone());

    let mut app = handlers::router(state.clone());
    if let Some(origin) = &state.config.frontend_origin {
        let cors = CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true);
        app = app.layer(cors);
    }

    // Readiness flips true once both listeners are bound.
    let (readiness_tx, readiness_rx) = tokio::sync::watch::channel(false);

    let health_router = Router::new()
        .route("/healthz", get(health_handler))
        .route("/readyz", get(readiness_handler))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        )
        .with_state(ReadinessCheck::new(readiness_rx));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let health_listener = tokio::net::TcpListener::bind(health_addr).await?;

    tracing::info!(addr = %listener.local_addr()?, "hirelane-server listening");
    tracing::info!(addr = %health_listener.local_addr()?, "health checks listening");

    let _ = readiness_tx.send(true);

    // Broadcast channel fanning the shutdown signal to both servers.
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx_clone.send(());
    });

    let mut shutdown_rx1 = shutdown_tx.subscribe();
    let api_server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx1.recv().await;
    });

    let mut shutdown_rx2 = shutdown_tx.subscribe();
    let health_server =
        axum::serve(health_listener, health_router).with_graceful_shutdown(async move {
            let _ = shutdown_rx2.recv().await;
        });

    let (api_result, health_result) = tokio::join!(api_server, health_server);
    api_result?;
    health_result?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[derive(Clone)]
struct ReadinessCheck {
    ready: tokio::sync::watch::Receiver<bool>,
}

impl ReadinessCheck {
    fn new(ready: tokio::sync::watch::Receiver<bool>) -> Self {
        Self { ready }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn readiness_handler(
    State(check): State<ReadinessCheck>,
) -> Result<&'static str, axum::http::StatusCode> {
    if *check.ready.borrow() {
        Ok("ok")
    } else {
        Err(axum::http::StatusCode::SERVICE_UNAVAILABLE)
    }
}

// ───────────────────────────── Admin command ───────────────────────────

async fn cmd_admin_create(
    db_url: &str,
    email: &str,
    full_name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open(db_url).await?;

    let password_hash = auth::hash_password(password)
        .map_err(|e| format!("failed to hash password: {}", e))?;

    let result = store
        .create_principal(&CreatePrincipalParams {
            role: Role::Admin,
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: Some(password_hash),
            is_verified: true,
        })
        .await;

    match result {
        Ok(id) => {
            println!("Admin account created: {} ({})", email, id.0);
            Ok(())
        }
        Err(StoreError::AlreadyExists) => {
            Err(format!("an account with email {} already exists", email).into())
        }
        Err(e) => Err(e.into()),
    }
}
