//! Groupby aggregation engine
//!
//! Partitions a [`Table`] by one group column and reduces each measure column
//! per group with a single [`AggVerb`]. Groups come out in the order their key
//! first appears in the input.

use rustc_hash::{FxHashMap, FxHashSet};
use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{
    error::VisualizerError,
    table::{Table, Value},
};

/// Aggregation verb as sent by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggVerb {
    Count,
    Min,
    Max,
    Sum,
    DistinctCount,
    /// Pass the table through untouched
    None,
}

impl AggVerb {
    /// Wire name of the verb
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::DistinctCount => "dis-count",
            Self::None => "none",
        }
    }

    const fn reducer(self) -> Option<Reducer> {
        match self {
            Self::Count => Some(Reducer::Count),
            Self::Min => Some(Reducer::Min),
            Self::Max => Some(Reducer::Max),
            Self::Sum => Some(Reducer::Sum),
            Self::DistinctCount => Some(Reducer::DistinctCount),
            Self::None => None,
        }
    }
}

impl FromStr for AggVerb {
    type Err = VisualizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "count" => Ok(Self::Count),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            "dis-count" | "distinct_count" => Ok(Self::DistinctCount),
            "none" => Ok(Self::None),
            other => Err(VisualizerError::InvalidVerb(other.to_string())),
        }
    }
}

impl fmt::Display for AggVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregation call: verb, group column and measure columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub verb: AggVerb,
    pub group_column: String,
    pub measure_columns: Vec<String>,
}

impl AggregationRequest {
    pub fn new<I, S>(verb: AggVerb, group_column: impl Into<String>, measure_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            verb,
            group_column: group_column.into(),
            measure_columns: measure_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a request from a comma-separated measure list.
    ///
    /// Entries are trimmed and blanks dropped; at least one must remain.
    pub fn from_measure_list(
        verb: AggVerb,
        group_column: impl Into<String>,
        measures: &str,
    ) -> Result<Self, VisualizerError> {
        let measure_columns: Vec<String> = measures
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToString::to_string)
            .collect();

        if measure_columns.is_empty() {
            return Err(VisualizerError::InvalidColumn {
                column: measures.to_string(),
                reason: "no measure columns requested".to_string(),
            });
        }

        Ok(Self {
            verb,
            group_column: group_column.into(),
            measure_columns,
        })
    }

    /// Run the request against a table
    pub fn apply(&self, table: Table) -> Result<Table, VisualizerError> {
        aggregate(table, self.verb, &self.group_column, &self.measure_columns)
    }
}

#[derive(Debug, Clone, Copy)]
enum Reducer {
    Count,
    Min,
    Max,
    Sum,
    DistinctCount,
}

struct Group<'a> {
    key: &'a Value,
    rows: Vec<usize>,
}

/// Aggregate `table` by `group_column`, reducing every measure column with `verb`.
///
/// `AggVerb::None` returns the table unchanged and ignores the column
/// arguments. Any other verb validates every column up front, so a failure
/// never yields partial output. A measure named like the group column writes
/// its aggregate into the group column's field.
pub fn aggregate(
    table: Table,
    verb: AggVerb,
    group_column: &str,
    measure_columns: &[String],
) -> Result<Table, VisualizerError> {
    let Some(reducer) = verb.reducer() else {
        return Ok(table);
    };

    let group_idx = table.require_column(group_column)?;

    // (source column, output slot)
    let mut measures: Vec<(usize, usize)> = Vec::with_capacity(measure_columns.len());
    let mut output_columns = vec![group_column.to_string()];
    for name in measure_columns {
        let source = table.require_column(name)?;
        let slot = match output_columns.iter().position(|column| column == name) {
            Some(slot) if measures.iter().any(|&(_, taken)| taken == slot) => continue,
            Some(slot) => slot,
            None => {
                output_columns.push(name.clone());
                output_columns.len() - 1
            }
        };
        if matches!(reducer, Reducer::Sum) {
            ensure_numeric(&table, source, name)?;
        }
        measures.push((source, slot));
    }

    let groups = partition(&table, group_idx);
    let mut rows = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut row = vec![Value::Null; output_columns.len()];
        row[0] = group.key.clone();
        for &(source, slot) in &measures {
            let values = group.rows.iter().map(|&r| &table.rows()[r][source]);
            row[slot] = reduce(reducer, values, &table.columns()[source])?;
        }
        rows.push(row);
    }

    Table::with_rows(output_columns, rows)
}

/// Row indices per group key, in first-appearance order. Missing keys form no group.
fn partition(table: &Table, group_idx: usize) -> Vec<Group<'_>> {
    let mut index: FxHashMap<&Value, usize> = FxHashMap::default();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for (row_idx, key) in table.column_values(group_idx).enumerate() {
        if key.is_missing() {
            continue;
        }
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                key,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(row_idx);
    }

    groups
}

fn ensure_numeric(table: &Table, idx: usize, name: &str) -> Result<(), VisualizerError> {
    if table
        .column_values(idx)
        .any(|value| matches!(value, Value::Text(_)))
    {
        return Err(VisualizerError::non_numeric_column(name));
    }
    Ok(())
}

fn reduce<'a>(
    reducer: Reducer,
    values: impl Iterator<Item = &'a Value>,
    column: &str,
) -> Result<Value, VisualizerError> {
    let present = values.filter(|value| !value.is_missing());
    let value = match reducer {
        Reducer::Count => count_value(present.count()),
        Reducer::DistinctCount => count_value(present.collect::<FxHashSet<_>>().len()),
        Reducer::Sum => sum(present),
        Reducer::Min => extreme(present, Ordering::Less, column)?,
        Reducer::Max => extreme(present, Ordering::Greater, column)?,
    };
    Ok(value)
}

fn count_value(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Integer sums stay integral until a float shows up or the total overflows.
#[allow(clippy::cast_precision_loss)]
fn sum<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    let mut int_total = Some(0_i64);
    let mut float_total = 0.0_f64;
    let mut saw_float = false;

    for value in values {
        match value {
            Value::Int(v) => {
                int_total = int_total.and_then(|total| total.checked_add(*v));
                float_total += *v as f64;
            }
            Value::Bool(v) => {
                int_total = int_total.and_then(|total| total.checked_add(i64::from(*v)));
                float_total += f64::from(u8::from(*v));
            }
            Value::Float(v) => {
                saw_float = true;
                float_total += v;
            }
            // text is rejected before reduction
            Value::Null | Value::Text(_) => {}
        }
    }

    match int_total {
        Some(total) if !saw_float => Value::Int(total),
        _ => Value::Float(float_total),
    }
}

fn extreme<'a>(
    values: impl Iterator<Item = &'a Value>,
    wanted: Ordering,
    column: &str,
) -> Result<Value, VisualizerError> {
    let mut best: Option<&Value> = None;
    for value in values {
        best = match best {
            None => Some(value),
            Some(current) => match value.natural_cmp(current) {
                Some(ordering) if ordering == wanted => Some(value),
                Some(_) => Some(current),
                None => {
                    return Err(VisualizerError::InvalidColumn {
                        column: column.to_string(),
                        reason: "column mixes values that cannot be ordered".to_string(),
                    });
                }
            },
        };
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}
