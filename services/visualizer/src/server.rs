//! Visualizer API server implementation

use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    middleware,
    response::Json,
    routing::get,
};
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    config::VisualizerConfig,
    dataset::{CsvDataset, DatasetProvider},
    error::VisualizerError,
    handlers::{DataHandlers, HealthHandlers},
    middleware::{create_cors_layer, logging_middleware},
    models::{ChartQuery, HealthCheckResponse, RecordsQuery},
    table::Table,
};

/// Unified application state containing all handlers
#[derive(Clone)]
pub struct AppState {
    pub data_handlers: DataHandlers,
    pub health_handlers: HealthHandlers,
}

/// Visualizer API server
pub struct VisualizerServer {
    config: VisualizerConfig,
    dataset: Arc<dyn DatasetProvider>,
    start_time: Instant,
}

impl VisualizerServer {
    /// Create a server reading the CSV dataset named in the configuration
    pub fn new(config: VisualizerConfig) -> Result<Self> {
        info!("Initializing visualizer API server");

        let dataset = CsvDataset::from_config(&config.dataset)?;
        if !dataset.path().exists() {
            error!(
                "Dataset file {} does not exist yet; data requests will fail until it does",
                dataset.path().display()
            );
        }

        Ok(Self::with_dataset(config, Arc::new(dataset)))
    }

    /// Create a server over any dataset provider
    pub fn with_dataset(config: VisualizerConfig, dataset: Arc<dyn DatasetProvider>) -> Self {
        Self {
            config,
            dataset,
            start_time: Instant::now(),
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = match self.config.server_address().parse() {
            Ok(addr) => addr,
            Err(e) => {
                error!(
                    "Invalid server address '{}': {}",
                    self.config.server_address(),
                    e
                );
                return Err(anyhow::anyhow!("Invalid server address: {}", e));
            }
        };

        let app = self.router();

        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("Visualizer API listening on {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind TCP listener to {}: {}", addr, e);
                return Err(anyhow::anyhow!("Failed to bind to address {}: {}", addr, e));
            }
        };

        if let Err(e) = axum::serve(listener, app).await {
            error!("Server encountered a fatal error: {}", e);
            return Err(anyhow::anyhow!("Server error: {}", e));
        }

        Ok(())
    }

    /// Build the Axum application with all routes and middleware
    pub fn router(&self) -> Router {
        let app_state = AppState {
            data_handlers: DataHandlers::new(Arc::clone(&self.dataset)),
            health_handlers: HealthHandlers::new(Arc::clone(&self.dataset), self.start_time),
        };

        let mut app = Router::new()
            .route(&self.config.monitoring.health_path, get(health_check))
            .route("/parquet-data", get(parquet_data))
            .route("/chart-data", get(chart_data))
            .with_state(app_state)
            .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                self.config.server.timeout_seconds,
            )))
            .layer(middleware::from_fn(logging_middleware));

        if self.config.monitoring.tracing_enabled {
            app = app.layer(TraceLayer::new_for_http());
        }
        if self.config.server.compression {
            app = app.layer(CompressionLayer::new());
        }
        if self.config.cors.enabled {
            app = app.layer(create_cors_layer(&self.config.cors));
        }

        info!("Visualizer API routes configured");
        app
    }
}

// Handler wrapper functions to work with unified state
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    HealthHandlers::health_check(State(state.health_handlers)).await
}

async fn parquet_data(
    State(state): State<AppState>,
    query: Query<RecordsQuery>,
) -> Result<Json<Table>, VisualizerError> {
    DataHandlers::records(State(state.data_handlers), query).await
}

async fn chart_data(
    State(state): State<AppState>,
    query: Query<ChartQuery>,
) -> Result<Json<Table>, VisualizerError> {
    DataHandlers::chart_data(State(state.data_handlers), query).await
}

/// API route documentation
pub fn print_routes() {
    println!("Visualizer API Routes:");
    println!("======================");
    println!();
    println!("  GET  /health        - Health check and dataset status");
    println!("  GET  /parquet-data  - Dataset records");
    println!("       ?selected_agg=<verb>&selected_column=<group>[&selected_measure=<column>]");
    println!("  GET  /chart-data    - Grouped records for charts");
    println!("       ?selected_agg=<verb>&selected_y_columns=<a,b,...>&selected_x_column=<group>");
    println!();
    println!("Aggregation verbs: count, min, max, sum, dis-count, none");
}
