//! Record listing and chart data handlers

use axum::{
    extract::{Query, State},
    response::Json,
};
use std::sync::Arc;
use tracing::info;

use crate::{
    dataset::DatasetProvider,
    error::VisualizerError,
    models::{ChartQuery, RecordsQuery},
    table::Table,
};

/// Handlers serving dataset records
#[derive(Clone)]
pub struct DataHandlers {
    dataset: Arc<dyn DatasetProvider>,
}

impl DataHandlers {
    pub fn new(dataset: Arc<dyn DatasetProvider>) -> Self {
        Self { dataset }
    }

    /// Raw records, or a single-measure aggregation when both verb and column are given
    pub async fn records(
        State(handlers): State<Self>,
        Query(query): Query<RecordsQuery>,
    ) -> Result<Json<Table>, VisualizerError> {
        let request = query.aggregation()?;
        let table = handlers.dataset.load().await?;

        let Some(request) = request else {
            info!(rows = table.len(), "Serving raw records");
            return Ok(Json(table));
        };

        info!(
            verb = %request.verb,
            group = %request.group_column,
            measures = ?request.measure_columns,
            "Aggregating records"
        );
        Ok(Json(request.apply(table)?))
    }

    /// Grouped records for charting, one field per requested measure
    pub async fn chart_data(
        State(handlers): State<Self>,
        Query(query): Query<ChartQuery>,
    ) -> Result<Json<Table>, VisualizerError> {
        let request = query.aggregation()?;
        let table = handlers.dataset.load().await?;

        info!(
            verb = %request.verb,
            x_column = %request.group_column,
            y_columns = ?request.measure_columns,
            "Chart data request"
        );
        let result = request.apply(table)?;
        info!(groups = result.len(), "Chart data ready");
        Ok(Json(result))
    }
}
