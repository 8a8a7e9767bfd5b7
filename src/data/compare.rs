use serde::Serialize;

use super::error::ColumnNotFound;
use super::model::{Table, Value};

/// Compared attributes in display order: (column, label).
pub const COMPARISON_ATTRIBUTES: [(&str, &str); 14] = [
    ("brand", "Brand"),
    ("model", "Model"),
    ("colour", "Colour"),
    ("original_price", "Original Price (INR)"),
    ("discounted_price", "Discounted Price (INR)"),
    ("ratings", "Ratings"),
    ("memory", "RAM (Memory)"),
    ("storage", "Storage"),
    ("processor", "Processor"),
    ("rear_camera", "Rear Camera"),
    ("front_camera", "Front Camera"),
    ("display_size", "Display Size (cm)"),
    ("battery_capacity", "Battery Capacity (mAh)"),
    ("battery_type", "Battery Type"),
];

/// One line of a side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedAttribute {
    pub column: &'static str,
    pub label: &'static str,
    pub a: Value,
    pub b: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "attributes", rename_all = "lowercase")]
pub enum Comparison {
    /// At least one side is unselected or matches no listing.
    Incomplete,
    Complete(Vec<ComparedAttribute>),
}

/// Line up two listings, looked up by `model`, attribute by attribute.
///
/// Blank keys and keys without a matching row give [`Comparison::Incomplete`].
/// With duplicate models the first row in the table is used.
pub fn compare(table: &Table, key_a: &str, key_b: &str) -> Result<Comparison, ColumnNotFound> {
    let positions = COMPARISON_ATTRIBUTES
        .iter()
        .map(|(col, _)| table.column_index(col))
        .collect::<Result<Vec<_>, _>>()?;

    let lookup = |key: &str| {
        if key.trim().is_empty() {
            return Ok(None);
        }
        table.find_first("model", &Value::text(key))
    };

    let (Some(a), Some(b)) = (lookup(key_a)?, lookup(key_b)?) else {
        log::debug!("Comparison of '{key_a}' and '{key_b}' is incomplete");
        return Ok(Comparison::Incomplete);
    };

    let attributes = COMPARISON_ATTRIBUTES
        .iter()
        .zip(positions)
        .map(|(&(column, label), idx)| ComparedAttribute {
            column,
            label,
            a: a.get(idx).clone(),
            b: b.get(idx).clone(),
        })
        .collect();

    Ok(Comparison::Complete(attributes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind, Record, NUMERIC_COLUMNS};

    fn phone(model: &str, brand: &str, ratings: Value) -> Record {
        Record::new(
            COMPARISON_ATTRIBUTES
                .iter()
                .map(|(col, _)| match *col {
                    "model" => Value::text(model),
                    "brand" => Value::text(brand),
                    "ratings" => ratings.clone(),
                    c if NUMERIC_COLUMNS.contains(&c) => Value::Number(100.0),
                    c => Value::text(format!("{c} of {model}")),
                })
                .collect(),
        )
    }

    fn table() -> Table {
        let columns = COMPARISON_ATTRIBUTES
            .iter()
            .map(|(col, _)| {
                let kind = if NUMERIC_COLUMNS.contains(col) {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Text
                };
                Column::new(*col, kind)
            })
            .collect();
        Table::new(
            columns,
            vec![
                phone("A", "X", Value::Number(4.0)),
                phone("B", "X", Value::Null),
                phone("A", "Z", Value::Number(1.0)),
            ],
        )
    }

    #[test]
    fn attributes_come_in_fixed_order() {
        let Comparison::Complete(rows) = compare(&table(), "A", "B").unwrap() else {
            panic!("expected a complete comparison");
        };
        let labels: Vec<&str> = rows.iter().map(|r| r.label).collect();
        let expected: Vec<&str> = COMPARISON_ATTRIBUTES.iter().map(|(_, l)| *l).collect();
        assert_eq!(labels, expected);
        assert_eq!(rows[5].column, "ratings");
        assert_eq!(rows[5].a, Value::Number(4.0));
        assert_eq!(rows[5].b, Value::Null);
    }

    #[test]
    fn same_model_twice_is_symmetric() {
        let Comparison::Complete(rows) = compare(&table(), "B", "B").unwrap() else {
            panic!("expected a complete comparison");
        };
        assert!(rows.iter().all(|r| r.a == r.b));
    }

    #[test]
    fn duplicate_model_uses_first_row() {
        let Comparison::Complete(rows) = compare(&table(), "A", "A").unwrap() else {
            panic!("expected a complete comparison");
        };
        assert_eq!(rows[0].a, Value::text("X"));
    }

    #[test]
    fn unknown_or_blank_keys_are_incomplete() {
        let t = table();
        assert_eq!(compare(&t, "nonexistent", "nonexistent").unwrap(), Comparison::Incomplete);
        assert_eq!(compare(&t, "A", "nonexistent").unwrap(), Comparison::Incomplete);
        assert_eq!(compare(&t, "", "A").unwrap(), Comparison::Incomplete);
        assert_eq!(compare(&t, "A", "  ").unwrap(), Comparison::Incomplete);
    }

    #[test]
    fn missing_attribute_column_is_an_error() {
        let t = Table::new(
            vec![Column::new("model", ColumnKind::Text)],
            vec![Record::new(vec![Value::text("A")])],
        );
        assert_eq!(compare(&t, "A", "A").unwrap_err().column, "brand");
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(Comparison::Incomplete).unwrap();
        assert_eq!(json, serde_json::json!({"status": "incomplete"}));

        let json = serde_json::to_value(compare(&table(), "A", "B").unwrap()).unwrap();
        assert_eq!(json["status"], "complete");
        assert_eq!(json["attributes"][0]["label"], "Brand");
        assert_eq!(json["attributes"][5]["b"], serde_json::Value::Null);
    }
}
