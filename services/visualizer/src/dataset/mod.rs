//! Dataset providers
//!
//! A provider hands every request its own freshly loaded [`Table`], with
//! datetime columns already rendered as `YYYY-MM-DD HH:MM:SS` strings.

pub mod csv_file;
pub mod datetime;

use async_trait::async_trait;

use crate::{error::VisualizerError, table::Table};

pub use csv_file::CsvDataset;
pub use datetime::DatetimeNormalizer;

/// Source of the tabular dataset served by the API
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Load a fresh copy of the dataset
    async fn load(&self) -> Result<Table, VisualizerError>;

    /// Short description of where the data comes from
    fn describe(&self) -> String;
}
