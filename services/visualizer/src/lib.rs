//! Visualizer API
//!
//! REST service feeding a charting front-end with tabular data.
//! Features:
//! - Raw dataset records as JSON
//! - Single-column groupby with count, min, max, sum and distinct count
//! - Datetime columns normalized to `YYYY-MM-DD HH:MM:SS`
//! - Configurable CORS, request tracing and compression

#![allow(missing_docs)]

use anyhow::Result;

pub mod aggregation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
pub mod table;

pub use aggregation::{AggVerb, AggregationRequest, aggregate};
pub use config::{CorsConfig, DatasetConfig, MonitoringConfig, ServerConfig, VisualizerConfig};
pub use dataset::{CsvDataset, DatasetProvider};
pub use error::VisualizerError;
pub use server::VisualizerServer;
pub use table::{Table, Value};

/// Start the visualizer API server
pub async fn start_server(config: VisualizerConfig) -> Result<()> {
    let server = VisualizerServer::new(config)?;
    server.start().await
}
