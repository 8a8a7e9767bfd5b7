use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use super::error::ColumnNotFound;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Ordered (`Null < Number < Text`) so values can key `BTreeMap`s.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    /// Always finite; non-finite input coerces to `Null`.
    Number(f64),
    Null,
}

// -- Manual Eq/Ord so Value can live in BTreeMap / BTreeSet --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Number(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Number(f) => f.to_bits().hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::Null => write!(f, "N/A"),
        }
    }
}

impl Value {
    /// Build a numeric value, mapping non-finite input to `Null`.
    pub fn number(v: f64) -> Self {
        if v.is_finite() {
            Value::Number(v)
        } else {
            Value::Null
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// The numeric payload, if any. Text is never reinterpreted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// How the cells of a column were coerced at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Column {
            name: name.into(),
            kind,
        }
    }
}

/// Columns always coerced to numbers, whatever the file contains.
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "ratings",
    "original_price",
    "discounted_price",
    "battery_capacity",
    "display_size",
];

/// Columns always kept as their string representation.
pub const TEXT_COLUMNS: [&str; 9] = [
    "brand",
    "model",
    "colour",
    "memory",
    "storage",
    "processor",
    "rear_camera",
    "front_camera",
    "battery_type",
];

/// Every column a listings file must provide.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    "brand",
    "model",
    "colour",
    "original_price",
    "discounted_price",
    "ratings",
    "memory",
    "storage",
    "processor",
    "rear_camera",
    "front_camera",
    "display_size",
    "battery_capacity",
    "battery_type",
];

/// Lower-case, trimmed, spaces replaced by underscores.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Trimmed cell text as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Record / Table
// ---------------------------------------------------------------------------

/// One listing; values are positionally aligned with [`Table::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Record { values }
    }

    /// Value at a column position; out-of-range positions read as `Null`.
    pub fn get(&self, idx: usize) -> &Value {
        const NULL: &Value = &Value::Null;
        self.values.get(idx).unwrap_or(NULL)
    }
}

/// The loaded dataset. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table from an already-coerced schema and rows.
    /// Rows shorter than the schema read as `Null` in the missing positions.
    pub fn new(columns: Vec<Column>, records: Vec<Record>) -> Self {
        Table { columns, records }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of `name`; the first column wins when headers collide.
    pub fn column_index(&self, name: &str) -> Result<usize, ColumnNotFound> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ColumnNotFound::new(name))
    }

    pub fn column(&self, name: &str) -> Result<&Column, ColumnNotFound> {
        let idx = self.column_index(name)?;
        Ok(&self.columns[idx])
    }

    /// Iterate one column's values in row order.
    pub fn values<'a>(
        &'a self,
        name: &str,
    ) -> Result<impl Iterator<Item = &'a Value> + 'a, ColumnNotFound> {
        let idx = self.column_index(name)?;
        Ok(self.records.iter().map(move |r| r.get(idx)))
    }

    /// Distinct non-null values of a column in first-seen order.
    pub fn distinct(&self, name: &str) -> Result<Vec<Value>, ColumnNotFound> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for v in self.values(name)? {
            if !v.is_null() && seen.insert(v) {
                out.push(v.clone());
            }
        }
        Ok(out)
    }

    /// Sorted, de-duplicated model names for selection widgets.
    pub fn model_options(&self) -> Result<Vec<String>, ColumnNotFound> {
        let set: BTreeSet<String> = self
            .values("model")?
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();
        Ok(set.into_iter().collect())
    }

    /// First record whose `column` equals `value`.
    pub fn find_first(&self, column: &str, value: &Value) -> Result<Option<&Record>, ColumnNotFound> {
        let idx = self.column_index(column)?;
        Ok(self.records.iter().find(|r| r.get(idx) == value))
    }

    /// Derived copy containing only the rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Table {
        let records = indices
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect();
        Table {
            columns: self.columns.clone(),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec![
                Column::new("model", ColumnKind::Text),
                Column::new("ratings", ColumnKind::Numeric),
            ],
            vec![
                Record::new(vec![Value::text("B"), Value::Number(4.0)]),
                Record::new(vec![Value::text("A"), Value::Null]),
                Record::new(vec![Value::text("B"), Value::Number(3.5)]),
            ],
        )
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_column_name(" Original Price "), "original_price");
        assert_eq!(normalize_column_name("Battery Type"), "battery_type");
        assert_eq!(normalize_column_name("ratings"), "ratings");
    }

    #[test]
    fn value_ordering_is_total() {
        let mut vals = vec![
            Value::text("b"),
            Value::Number(2.0),
            Value::Null,
            Value::Number(-1.0),
            Value::text("a"),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                Value::Null,
                Value::Number(-1.0),
                Value::Number(2.0),
                Value::text("a"),
                Value::text("b"),
            ]
        );
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(Value::number(f64::NAN), Value::Null);
        assert_eq!(Value::number(f64::INFINITY), Value::Null);
        assert_eq!(Value::number(1.5), Value::Number(1.5));
    }

    #[test]
    fn serializes_as_plain_json() {
        let json = serde_json::to_string(&vec![Value::text("x"), Value::Number(4.5), Value::Null])
            .unwrap();
        assert_eq!(json, r#"["x",4.5,null]"#);
    }

    #[test]
    fn missing_column_is_named() {
        let err = sample().column_index("brand").unwrap_err();
        assert_eq!(err.column, "brand");
    }

    #[test]
    fn distinct_keeps_first_seen_order() {
        let t = sample();
        assert_eq!(t.distinct("model").unwrap(), vec![Value::text("B"), Value::text("A")]);
        assert_eq!(t.distinct("ratings").unwrap().len(), 2);
    }

    #[test]
    fn model_options_are_sorted() {
        assert_eq!(sample().model_options().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn find_first_picks_earliest_row() {
        let t = sample();
        let rec = t.find_first("model", &Value::text("B")).unwrap().unwrap();
        assert_eq!(rec.get(1), &Value::Number(4.0));
    }

    #[test]
    fn short_rows_read_as_null() {
        let rec = Record::new(vec![Value::text("only")]);
        assert_eq!(rec.get(3), &Value::Null);
    }

    #[test]
    fn subset_is_a_fresh_copy() {
        let t = sample();
        let sub = t.subset(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.records()[0].get(1), &Value::Number(3.5));
        assert_eq!(t.len(), 3);
    }
}
