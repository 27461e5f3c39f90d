//! CSV-backed dataset

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::{DatasetProvider, DatetimeNormalizer};
use crate::{
    config::DatasetConfig,
    error::VisualizerError,
    table::{Table, Value},
};

/// Cells treated as missing regardless of column type
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

/// Reads a delimited text file with a header row on every load
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
    delimiter: u8,
    datetimes: DatetimeNormalizer,
}

impl CsvDataset {
    /// Comma-delimited file with datetime detection enabled
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            datetimes: DatetimeNormalizer::new(Vec::new(), true),
        }
    }

    pub fn from_config(config: &DatasetConfig) -> Result<Self, VisualizerError> {
        let delimiter = u8::try_from(config.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                VisualizerError::DatasetLoad(format!(
                    "delimiter '{}' is not a single ASCII character",
                    config.delimiter
                ))
            })?;

        Ok(Self {
            path: PathBuf::from(&config.path),
            delimiter,
            datetimes: DatetimeNormalizer::new(
                config.datetime_columns.clone(),
                config.detect_datetimes,
            ),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV text into a normalized table
    pub fn parse(&self, data: &str) -> Result<Table, VisualizerError> {
        let mut table = parse_csv(data, self.delimiter)?;
        self.datetimes.apply(&mut table)?;
        Ok(table)
    }
}

#[async_trait]
impl DatasetProvider for CsvDataset {
    async fn load(&self) -> Result<Table, VisualizerError> {
        let data = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!("Failed to read dataset {}: {}", self.path.display(), e);
            VisualizerError::DatasetLoad(format!("cannot read '{}': {e}", self.path.display()))
        })?;

        let table = self.parse(&data)?;
        debug!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "Loaded dataset"
        );
        Ok(table)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn parse_csv(data: &str, delimiter: u8) -> Result<Table, VisualizerError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(VisualizerError::DatasetLoad(
            "dataset has no header row".to_string(),
        ));
    }

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|idx| infer_kind(records.iter().map(|record| record.get(idx).unwrap_or(""))))
        .collect();

    let rows = records.iter().map(|record| {
        record
            .iter()
            .zip(&kinds)
            .map(|(cell, kind)| convert(cell, *kind))
            .collect::<Vec<_>>()
    });

    Table::with_rows(headers, rows)
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Narrowest kind holding every non-missing cell: Int, then Float, then Bool, else Text.
fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let (mut all_int, mut all_float, mut all_bool) = (true, true, true);

    for cell in cells.filter(|cell| !is_missing(cell)).map(str::trim) {
        all_int &= cell.parse::<i64>().is_ok();
        all_float &= cell.parse::<f64>().is_ok();
        all_bool &= parse_bool(cell).is_some();
        if !(all_int || all_float || all_bool) {
            return ColumnKind::Text;
        }
    }

    if all_int {
        ColumnKind::Int
    } else if all_float {
        ColumnKind::Float
    } else if all_bool {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn convert(cell: &str, kind: ColumnKind) -> Value {
    if is_missing(cell) {
        return Value::Null;
    }
    let trimmed = cell.trim();
    let parsed = match kind {
        ColumnKind::Int => trimmed.parse().ok().map(Value::Int),
        ColumnKind::Float => trimmed.parse().ok().map(Value::Float),
        ColumnKind::Bool => parse_bool(trimmed).map(Value::Bool),
        ColumnKind::Text => None,
    };
    parsed.unwrap_or_else(|| Value::Text(cell.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = "\
sepal_length,petal_count,species,measured_at,flagged
5.1,3,setosa,2024-01-05 08:00:00,true
4.9,,setosa,2024-01-06T09:30:00,False
7.0,4,versicolor,NA,TRUE
";

    #[test]
    fn test_infers_column_kinds() {
        let table = CsvDataset::new("unused.csv").parse(SAMPLE).unwrap();

        assert_eq!(
            table.columns(),
            &["sepal_length", "petal_count", "species", "measured_at", "flagged"]
        );
        assert_eq!(
            table.rows()[0],
            vec![
                Value::Float(5.1),
                Value::Int(3),
                Value::from("setosa"),
                Value::from("2024-01-05 08:00:00"),
                Value::Bool(true),
            ]
        );
        assert_eq!(table.get(1, "petal_count"), Some(&Value::Null));
        assert_eq!(table.get(1, "measured_at"), Some(&Value::from("2024-01-06 09:30:00")));
        assert_eq!(table.get(2, "measured_at"), Some(&Value::Null));
        assert_eq!(table.get(1, "flagged"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let table = CsvDataset::new("unused.csv")
            .parse("code\n12\nA7\n")
            .unwrap();
        assert_eq!(table.get(0, "code"), Some(&Value::from("12")));
    }

    #[test]
    fn test_ragged_rows_fail() {
        let err = CsvDataset::new("unused.csv")
            .parse("a,b\n1,2\n3\n")
            .unwrap_err();
        assert!(matches!(err, VisualizerError::DatasetLoad(_)));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(CsvDataset::new("unused.csv").parse("").is_err());
    }

    #[test]
    fn test_custom_delimiter() {
        let config = DatasetConfig {
            path: "unused.csv".to_string(),
            delimiter: ';',
            datetime_columns: Vec::new(),
            detect_datetimes: false,
        };
        let table = CsvDataset::from_config(&config)
            .unwrap()
            .parse("a;b\n1;x\n")
            .unwrap();
        assert_eq!(table.get(0, "a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = DatasetConfig {
            delimiter: '§',
            ..DatasetConfig::default()
        };
        assert!(CsvDataset::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = CsvDataset::new(file.path());
        let table = dataset.load().await.unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(dataset.describe(), file.path().display().to_string());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let err = CsvDataset::new("/definitely/not/here.csv")
            .load()
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DATASET_LOAD_FAILED");
    }
}
