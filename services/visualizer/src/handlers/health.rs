//! Health check handler

use axum::{extract::State, response::Json};
use std::{sync::Arc, time::Instant};
use tracing::{error, info};

use crate::{dataset::DatasetProvider, models::HealthCheckResponse};

/// Health check handlers
#[derive(Clone)]
pub struct HealthHandlers {
    dataset: Arc<dyn DatasetProvider>,
    start_time: Instant,
}

impl HealthHandlers {
    pub fn new(dataset: Arc<dyn DatasetProvider>, start_time: Instant) -> Self {
        Self {
            dataset,
            start_time,
        }
    }

    /// Health check endpoint; degraded when the dataset cannot be loaded
    pub async fn health_check(State(handlers): State<Self>) -> Json<HealthCheckResponse> {
        info!("Health check request");

        let (status, rows, columns) = match handlers.dataset.load().await {
            Ok(table) => ("healthy", Some(table.len()), table.columns().to_vec()),
            Err(e) => {
                error!("Health check failed: {}", e);
                ("degraded", None, Vec::new())
            }
        };

        Json(HealthCheckResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: handlers.start_time.elapsed().as_secs(),
            dataset: handlers.dataset.describe(),
            rows,
            columns,
        })
    }
}
