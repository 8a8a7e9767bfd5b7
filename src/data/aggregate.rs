//! Summary views derived from a [`Table`].  Every function here is pure:
//! the table is only read and each result is a fresh value.
//!
//! Null handling is the same everywhere: null keys are dropped, null (or
//! textual) measurements are left out of both the sum and the count, and a
//! group without any numeric measurement reports `None` instead of a mean.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::error::ColumnNotFound;
use super::model::{Table, Value};

// ---------------------------------------------------------------------------
// Running mean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, value: &Value) {
        if let Some(v) = value.as_f64() {
            self.sum += v;
            self.n += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

// ---------------------------------------------------------------------------
// Frequency count
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

/// Occurrences of each distinct non-null value, most frequent first.
/// Equal counts keep the order in which the values first appear.
pub fn frequency_count(table: &Table, column: &str) -> Result<Vec<ValueCount>, ColumnNotFound> {
    let mut position: HashMap<&Value, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for value in table.values(column)? {
        if value.is_null() {
            continue;
        }
        match position.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                position.insert(value, counts.len());
                counts.push(ValueCount {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(counts)
}

// ---------------------------------------------------------------------------
// Group mean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: Value,
    /// `None` when no row of the group has a numeric measurement.
    pub mean: Option<f64>,
    /// Rows in the group.
    pub rows: usize,
    /// Rows that contributed to the mean.
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMeans {
    pub group_column: String,
    pub value_column: String,
    /// One entry per distinct non-null key, in ascending key order.
    pub groups: Vec<GroupMean>,
}

impl GroupMeans {
    /// Mean for `key`; `None` for unknown keys and for groups without data.
    pub fn mean_of(&self, key: &Value) -> Option<f64> {
        self.groups
            .iter()
            .find(|g| &g.key == key)
            .and_then(|g| g.mean)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Arithmetic mean of `value_column` per distinct value of `group_column`.
pub fn group_mean(
    table: &Table,
    group_column: &str,
    value_column: &str,
) -> Result<GroupMeans, ColumnNotFound> {
    let g = table.column_index(group_column)?;
    let v = table.column_index(value_column)?;

    let mut acc: BTreeMap<&Value, (usize, MeanAcc)> = BTreeMap::new();
    for rec in table.records() {
        let key = rec.get(g);
        if key.is_null() {
            continue;
        }
        let entry = acc.entry(key).or_default();
        entry.0 += 1;
        entry.1.push(rec.get(v));
    }

    let groups = acc
        .into_iter()
        .map(|(key, (rows, m))| GroupMean {
            key: key.clone(),
            mean: m.mean(),
            rows,
            samples: m.n,
        })
        .collect();

    Ok(GroupMeans {
        group_column: group_column.to_string(),
        value_column: value_column.to_string(),
        groups,
    })
}

// ---------------------------------------------------------------------------
// Pivot mean
// ---------------------------------------------------------------------------

/// Dense two-way table of means.  `cells[r][c]` belongs to
/// `(row_keys[r], col_keys[c])`; combinations without data are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub row_column: String,
    pub col_column: String,
    pub value_column: String,
    pub row_keys: Vec<Value>,
    pub col_keys: Vec<Value>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn get(&self, row_key: &Value, col_key: &Value) -> Option<f64> {
        let r = self.row_keys.iter().position(|k| k == row_key)?;
        let c = self.col_keys.iter().position(|k| k == col_key)?;
        self.cells[r][c]
    }
}

/// Mean of `value_column` for each `(row_column, col_column)` key pair.
/// Keys come from rows where both key cells are non-null, sorted ascending.
pub fn pivot_mean(
    table: &Table,
    row_column: &str,
    col_column: &str,
    value_column: &str,
) -> Result<PivotTable, ColumnNotFound> {
    let r = table.column_index(row_column)?;
    let c = table.column_index(col_column)?;
    let v = table.column_index(value_column)?;

    let mut row_keys: BTreeSet<&Value> = BTreeSet::new();
    let mut col_keys: BTreeSet<&Value> = BTreeSet::new();
    let mut acc: HashMap<(&Value, &Value), MeanAcc> = HashMap::new();

    for rec in table.records() {
        let (rk, ck) = (rec.get(r), rec.get(c));
        if rk.is_null() || ck.is_null() {
            continue;
        }
        row_keys.insert(rk);
        col_keys.insert(ck);
        acc.entry((rk, ck)).or_default().push(rec.get(v));
    }

    let cells = row_keys
        .iter()
        .map(|rk| {
            col_keys
                .iter()
                .map(|ck| acc.get(&(*rk, *ck)).and_then(MeanAcc::mean))
                .collect()
        })
        .collect();

    Ok(PivotTable {
        row_column: row_column.to_string(),
        col_column: col_column.to_string(),
        value_column: value_column.to_string(),
        row_keys: row_keys.into_iter().cloned().collect(),
        col_keys: col_keys.into_iter().cloned().collect(),
        cells,
    })
}

// ---------------------------------------------------------------------------
// Histogram buckets
// ---------------------------------------------------------------------------

/// `[start, end)` bucket; the last bucket of a histogram also includes `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Split the range of the numeric values of `column` into `bucket_count`
/// equal-width buckets.  Nulls and text are not counted.
///
/// Returns an empty vector when `bucket_count` is zero or the column holds
/// no numbers.  A single distinct value is given the range `[v - 0.5, v + 0.5]`.
pub fn histogram(
    table: &Table,
    column: &str,
    bucket_count: usize,
) -> Result<Vec<Bucket>, ColumnNotFound> {
    let values: Vec<f64> = table.values(column)?.filter_map(Value::as_f64).collect();
    let Some(mut buckets) = empty_buckets(&values, bucket_count) else {
        return Ok(Vec::new());
    };
    for v in values {
        let idx = bucket_index(&buckets, v);
        buckets[idx].count += 1;
    }
    Ok(buckets)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupHistogram {
    pub key: Value,
    pub buckets: Vec<Bucket>,
}

/// Histogram of `column` split by `group_column`.  Every group shares the
/// bucket edges of the whole column, so the series stack.  Rows with a null
/// key are left out; groups come in ascending key order.
pub fn histogram_by_group(
    table: &Table,
    column: &str,
    group_column: &str,
    bucket_count: usize,
) -> Result<Vec<GroupHistogram>, ColumnNotFound> {
    let g = table.column_index(group_column)?;
    let v = table.column_index(column)?;

    let values: Vec<f64> = table.records().iter().filter_map(|r| r.get(v).as_f64()).collect();
    let Some(template) = empty_buckets(&values, bucket_count) else {
        return Ok(Vec::new());
    };

    let mut groups: BTreeMap<&Value, Vec<Bucket>> = BTreeMap::new();
    for rec in table.records() {
        let key = rec.get(g);
        if key.is_null() {
            continue;
        }
        let buckets = groups.entry(key).or_insert_with(|| template.clone());
        if let Some(x) = rec.get(v).as_f64() {
            let idx = bucket_index(buckets, x);
            buckets[idx].count += 1;
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, buckets)| GroupHistogram {
            key: key.clone(),
            buckets,
        })
        .collect())
}

/// Zero-count buckets spanning `values`, or `None` when there is nothing to bucket.
/// Edges are interpolated as `min * (1 - t) + max * t`, which stays finite
/// for any pair of finite bounds.
fn empty_buckets(values: &[f64], bucket_count: usize) -> Option<Vec<Bucket>> {
    if bucket_count == 0 || values.is_empty() {
        return None;
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        min -= 0.5;
        max += 0.5;
    }

    let edge = |i: usize| -> f64 {
        if i == 0 {
            min
        } else if i == bucket_count {
            max
        } else {
            let t = i as f64 / bucket_count as f64;
            min * (1.0 - t) + max * t
        }
    };

    Some(
        (0..bucket_count)
            .map(|i| Bucket {
                start: edge(i),
                end: edge(i + 1),
                count: 0,
            })
            .collect(),
    )
}

/// Bucket holding `v`: `start <= v < next start`, the last bucket also taking `max`.
fn bucket_index(buckets: &[Bucket], v: f64) -> usize {
    let n = buckets.len();
    let min = buckets[0].start;
    let max = buckets[n - 1].end;

    // halves keep the span finite when the bounds are near f64::MAX
    let span = max / 2.0 - min / 2.0;
    let guess = if span > 0.0 {
        ((v / 2.0 - min / 2.0) / span * n as f64).floor()
    } else {
        0.0
    };
    let mut idx = if guess.is_finite() && guess > 0.0 {
        (guess as usize).min(n - 1)
    } else {
        0
    };

    // the guess can be one off after rounding; settle it against the edges
    while idx + 1 < n && v >= buckets[idx + 1].start {
        idx += 1;
    }
    while idx > 0 && v < buckets[idx].start {
        idx -= 1;
    }
    idx
}

// ---------------------------------------------------------------------------
// Group summary (box plot statistics)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: Value,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Five-number summary of `value_column` per group, ascending key order.
/// Quartiles use linear interpolation between closest ranks.  Groups
/// without numeric values are left out.
pub fn group_summary(
    table: &Table,
    group_column: &str,
    value_column: &str,
) -> Result<Vec<GroupSummary>, ColumnNotFound> {
    let g = table.column_index(group_column)?;
    let v = table.column_index(value_column)?;

    let mut groups: BTreeMap<&Value, Vec<f64>> = BTreeMap::new();
    for rec in table.records() {
        let key = rec.get(g);
        if key.is_null() {
            continue;
        }
        if let Some(x) = rec.get(v).as_f64() {
            groups.entry(key).or_default().push(x);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, mut xs)| {
            xs.sort_by(f64::total_cmp);
            GroupSummary {
                key: key.clone(),
                count: xs.len(),
                min: xs[0],
                q1: quantile(&xs, 0.25),
                median: quantile(&xs, 0.5),
                q3: quantile(&xs, 0.75),
                max: xs[xs.len() - 1],
            }
        })
        .collect())
}

/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Scatter points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub label: Value,
    /// Colour group of the point, e.g. its brand.
    pub series: Value,
}

/// `(x, y, label, series)` for every row where both coordinates are numeric,
/// in row order.
pub fn scatter_points(
    table: &Table,
    x_column: &str,
    y_column: &str,
    label_column: &str,
    series_column: &str,
) -> Result<Vec<ScatterPoint>, ColumnNotFound> {
    let x = table.column_index(x_column)?;
    let y = table.column_index(y_column)?;
    let l = table.column_index(label_column)?;
    let s = table.column_index(series_column)?;

    Ok(table
        .records()
        .iter()
        .filter_map(|rec| {
            Some(ScatterPoint {
                x: rec.get(x).as_f64()?,
                y: rec.get(y).as_f64()?,
                label: rec.get(l).clone(),
                series: rec.get(s).clone(),
            })
        })
        .collect())
}
