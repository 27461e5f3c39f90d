//! REST API models and request/response types

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    aggregation::{AggVerb, AggregationRequest},
    error::VisualizerError,
};

/// Query parameters for the record listing
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    /// Aggregation verb
    pub selected_agg: Option<String>,
    /// Group column
    pub selected_column: Option<String>,
    /// Measure column, defaults to the group column
    pub selected_measure: Option<String>,
}

impl RecordsQuery {
    /// Aggregation to run, or `None` for raw records.
    ///
    /// Blank parameters count as absent.
    pub fn aggregation(&self) -> Result<Option<AggregationRequest>, VisualizerError> {
        let (Some(verb), Some(column)) = (
            non_blank(self.selected_agg.as_deref()),
            non_blank(self.selected_column.as_deref()),
        ) else {
            return Ok(None);
        };

        let verb: AggVerb = verb.parse()?;
        let measure = non_blank(self.selected_measure.as_deref()).unwrap_or(column);
        Ok(Some(AggregationRequest::new(verb, column, [measure])))
    }
}

/// Query parameters for chart data
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Aggregation verb
    pub selected_agg: String,
    /// Comma-separated measure columns
    pub selected_y_columns: String,
    /// Group column
    pub selected_x_column: String,
}

impl ChartQuery {
    pub fn aggregation(&self) -> Result<AggregationRequest, VisualizerError> {
        let verb: AggVerb = self.selected_agg.parse()?;
        AggregationRequest::from_measure_list(
            verb,
            self.selected_x_column.trim(),
            &self.selected_y_columns,
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Error response model
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    pub details: Option<FxHashMap<String, String>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service version
    pub version: String,
    /// Service uptime in seconds
    pub uptime_seconds: u64,
    /// Dataset source
    pub dataset: String,
    /// Rows in the dataset, if it loaded
    pub rows: Option<usize>,
    /// Dataset columns, empty if it failed to load
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(agg: Option<&str>, column: Option<&str>, measure: Option<&str>) -> RecordsQuery {
        RecordsQuery {
            selected_agg: agg.map(ToString::to_string),
            selected_column: column.map(ToString::to_string),
            selected_measure: measure.map(ToString::to_string),
        }
    }

    #[test]
    fn test_records_without_both_params_is_raw() {
        assert!(records(None, None, None).aggregation().unwrap().is_none());
        assert!(records(Some("sum"), None, None).aggregation().unwrap().is_none());
        assert!(records(None, Some("species"), None).aggregation().unwrap().is_none());
        assert!(records(Some(""), Some("species"), None).aggregation().unwrap().is_none());
    }

    #[test]
    fn test_records_self_aggregation_by_default() {
        let request = records(Some("count"), Some("species"), None)
            .aggregation()
            .unwrap()
            .unwrap();
        assert_eq!(request.verb, AggVerb::Count);
        assert_eq!(request.group_column, "species");
        assert_eq!(request.measure_columns, vec!["species"]);
    }

    #[test]
    fn test_records_explicit_measure() {
        let request = records(Some("max"), Some("species"), Some("sepal_length"))
            .aggregation()
            .unwrap()
            .unwrap();
        assert_eq!(request.measure_columns, vec!["sepal_length"]);
    }

    #[test]
    fn test_records_bad_verb() {
        assert!(records(Some("avg"), Some("species"), None).aggregation().is_err());
    }

    #[test]
    fn test_chart_query_splits_measures() {
        let query = ChartQuery {
            selected_agg: "dis-count".to_string(),
            selected_y_columns: "sepal_length,petal_width".to_string(),
            selected_x_column: "species".to_string(),
        };
        let request = query.aggregation().unwrap();
        assert_eq!(request.verb, AggVerb::DistinctCount);
        assert_eq!(request.measure_columns, vec!["sepal_length", "petal_width"]);
    }
}
