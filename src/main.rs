//! webfm server - Entry Point
//!
//! Serves the file manager protocol over a single HTTP endpoint.

use log::{error, info, warn};
use std::sync::Arc;

use webfm::config::ManagerConfig;
use webfm::http::{AppState, router};
use webfm::provider::FilesystemProvider;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match ManagerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(config.root_path()) {
        warn!("Failed to create root directory {}: {}", config.root, e);
    } else {
        info!("Serving files from {}", config.root);
    }

    let address = config.bind_socket();
    let endpoint = config.endpoint.clone();
    let state = AppState {
        provider: Arc::new(FilesystemProvider::new(&config)),
        config: Arc::new(config),
    };

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => {
            info!("File manager endpoint {} listening on {}", endpoint, address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", address, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, router(state)).await {
        error!("Server error: {}", e);
    }
}
