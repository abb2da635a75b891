use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

mod config;
mod db;
mod domain;
mod errors;
mod rest;
mod seed;
mod storage;
mod token;
mod validation;

use config::AppConfig;
use db::DbConnection;
use domain::CustomerService;
use rest::AppState;
use storage::CustomerRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = AppConfig::load();

    info!("Setting up database");
    let db = DbConnection::new(&config.database_url).await?;

    let repository = CustomerRepository::new(db);
    let customer_service = CustomerService::new(repository.clone());

    // Populate the table with fake customers on first start
    seed::seed_if_empty(&repository, &customer_service, config.seed_count).await?;

    // CORS setup to allow a browser frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = rest::router(AppState::new(customer_service)).layer(cors);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, exiting");
}
