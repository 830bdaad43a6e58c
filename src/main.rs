//! Item API server.
//!
//! Serves create, read, update, delete and list over HTTP for items kept in a DynamoDB table
//! (or in memory). Updates merge nested JSON patches into the stored item.
//!
//! # Endpoints
//!
//! - `GET /items` - Every item
//! - `GET /items/{id}` - One item
//! - `POST /items` - Create or replace an item
//! - `PUT /items/{id}` - Merge a patch into an existing item
//! - `DELETE /items/{id}` - Delete an item
//! - `GET /health` - Liveness check
//!
//! # Example
//!
//! ```bash
//! dynamodb-item-patch \
//!   --table-name items \
//!   --region eu-west-1 \
//!   --listen 0.0.0.0:8080
//! ```

use clap::Parser;
use dynamodb_item_patch::{
    config::{Config, StoreBackend},
    http,
    repository::ItemRepository,
    store::{ItemStore, dynamodb::DynamoDbStore, memory::MemoryStore},
};
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_LOG_FILTER: &str = "dynamodb_item_patch=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::parse();

    info!(
        listen = %config.listen,
        store = ?config.store,
        key_name = %config.key_name,
        "Starting item API server"
    );

    match config.store {
        StoreBackend::Memory => {
            let mut store = MemoryStore::new(&config.key_name);
            if let Some(page_size) = config.scan_page_size {
                store = store.with_page_size(page_size.into());
            }
            serve(&config, store).await
        }
        StoreBackend::Dynamodb => {
            let table_name = config
                .table_name
                .clone()
                .ok_or("--table-name (DYNAMO_TABLE_NAME) is required for the dynamodb store")?;
            let client = config.dynamodb_client().await;
            info!(table_name = %table_name, "Using DynamoDB table");
            let mut store = DynamoDbStore::new(client, table_name);
            if let Some(page_size) = config.scan_page_size {
                store = store.with_page_size(page_size.into());
            }
            serve(&config, store).await
        }
    }
}

async fn serve<S: ItemStore + 'static>(
    config: &Config,
    store: S,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = Arc::new(ItemRepository::new(store, config.key_name.clone()));
    let app = http::router(repository);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(address = %config.listen, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
