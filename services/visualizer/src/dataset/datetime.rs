//! Datetime column normalization

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::{
    error::VisualizerError,
    table::{Table, Value},
};

/// Rendering applied to every datetime cell
pub const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse the datetime spellings we accept in source data.
///
/// Offsets are dropped after parsing, keeping the wall-clock time.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Table transform rewriting datetime columns into [`OUTPUT_FORMAT`]
#[derive(Debug, Clone, Default)]
pub struct DatetimeNormalizer {
    columns: Vec<String>,
    detect: bool,
}

impl DatetimeNormalizer {
    /// `columns` must hold datetimes; with `detect` set, other text columns
    /// that parse entirely as datetimes are converted too.
    #[must_use]
    pub const fn new(columns: Vec<String>, detect: bool) -> Self {
        Self { columns, detect }
    }

    pub fn apply(&self, table: &mut Table) -> Result<(), VisualizerError> {
        for name in &self.columns {
            let idx = table.column_index(name).ok_or_else(|| {
                VisualizerError::DatasetLoad(format!("datetime column '{name}' not found"))
            })?;
            convert_column(table, idx)?;
        }

        if self.detect {
            for idx in 0..table.columns().len() {
                if self.columns.contains(&table.columns()[idx]) || !is_temporal(table, idx) {
                    continue;
                }
                debug!(column = %table.columns()[idx], "Detected datetime column");
                convert_column(table, idx)?;
            }
        }

        Ok(())
    }
}

fn is_temporal(table: &Table, idx: usize) -> bool {
    let mut seen = false;
    for value in table.column_values(idx) {
        match value {
            Value::Null => {}
            Value::Text(raw) if parse_datetime(raw).is_some() => seen = true,
            _ => return false,
        }
    }
    seen
}

fn convert_column(table: &mut Table, idx: usize) -> Result<(), VisualizerError> {
    let name = table.columns()[idx].clone();
    for row in table.rows_mut() {
        let cell = &mut row[idx];
        let formatted = match cell {
            Value::Null => continue,
            Value::Text(raw) => parse_datetime(raw)
                .ok_or_else(|| {
                    VisualizerError::DatasetLoad(format!(
                        "column '{name}': cannot parse '{raw}' as a datetime"
                    ))
                })?
                .format(OUTPUT_FORMAT)
                .to_string(),
            other => {
                return Err(VisualizerError::DatasetLoad(format!(
                    "column '{name}': '{other}' is not a datetime"
                )));
            }
        };
        *cell = Value::Text(formatted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-03-01 09:15:00", "2024-03-01 09:15:00")]
    #[case("2024-03-01T09:15:00", "2024-03-01 09:15:00")]
    #[case("2024-03-01 09:15:00.250", "2024-03-01 09:15:00")]
    #[case("2024-03-01T09:15:00+05:30", "2024-03-01 09:15:00")]
    #[case("2024/03/01 09:15:00", "2024-03-01 09:15:00")]
    #[case("2024-03-01", "2024-03-01 00:00:00")]
    fn test_accepted_spellings(#[case] raw: &str, #[case] expected: &str) {
        let parsed = parse_datetime(raw).unwrap();
        assert_eq!(parsed.format(OUTPUT_FORMAT).to_string(), expected);
    }

    #[rstest]
    #[case("setosa")]
    #[case("5.1")]
    #[case("2024-13-01")]
    fn test_rejected_spellings(#[case] raw: &str) {
        assert!(parse_datetime(raw).is_none());
    }

    fn table(rows: Vec<Vec<Value>>) -> Table {
        Table::with_rows(vec!["when".to_string(), "label".to_string()], rows).unwrap()
    }

    #[test]
    fn test_detects_and_converts_datetime_columns() {
        let mut t = table(vec![
            vec!["2024-03-01T10:00:00".into(), "a".into()],
            vec![Value::Null, "b".into()],
        ]);
        DatetimeNormalizer::new(Vec::new(), true).apply(&mut t).unwrap();
        assert_eq!(t.get(0, "when"), Some(&Value::from("2024-03-01 10:00:00")));
        assert_eq!(t.get(1, "when"), Some(&Value::Null));
        assert_eq!(t.get(0, "label"), Some(&Value::from("a")));
    }

    #[test]
    fn test_detection_disabled_leaves_text() {
        let mut t = table(vec![vec!["2024-03-01T10:00:00".into(), "a".into()]]);
        DatetimeNormalizer::new(Vec::new(), false).apply(&mut t).unwrap();
        assert_eq!(t.get(0, "when"), Some(&Value::from("2024-03-01T10:00:00")));
    }

    #[test]
    fn test_declared_column_must_parse() {
        let mut t = table(vec![vec!["2024-03-01".into(), "a".into()]]);
        let err = DatetimeNormalizer::new(vec!["label".to_string()], false)
            .apply(&mut t)
            .unwrap_err();
        assert!(matches!(err, VisualizerError::DatasetLoad(_)));
    }

    #[test]
    fn test_declared_column_must_exist() {
        let mut t = table(Vec::new());
        assert!(
            DatetimeNormalizer::new(vec!["missing".to_string()], false)
                .apply(&mut t)
                .is_err()
        );
    }
}
