use std::collections::{BTreeMap, BTreeSet};

use super::error::{ColumnNotFound, FilterError};
use super::model::{parse_number, ColumnKind, Table, Value};

// ---------------------------------------------------------------------------
// Row selection: which values are accepted per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of accepted values.
/// Columns absent from the map are unconstrained.
pub type Selection = BTreeMap<String, BTreeSet<Value>>;

/// Return indices of records that pass every constraint of `selection`.
///
/// A record passes a column constraint when:
/// * The accepted set for that column is empty → nothing accepted → fails
/// * The record's value for that column is in the accepted set → passes
pub fn filtered_indices(table: &Table, selection: &Selection) -> Result<Vec<usize>, ColumnNotFound> {
    let constraints = selection
        .iter()
        .map(|(col, accepted)| table.column_index(col).map(|idx| (idx, accepted)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            constraints
                .iter()
                .all(|(idx, accepted)| accepted.contains(rec.get(*idx)))
        })
        .map(|(i, _)| i)
        .collect())
}

/// Build a [`Selection`] from `column=value` strings, typing each value by
/// its column's kind.  Repeating a column accepts any of the given values.
pub fn parse_selection(table: &Table, filters: &[String]) -> Result<Selection, FilterError> {
    let mut selection = Selection::new();
    for filter in filters {
        let (column, raw) = filter
            .split_once('=')
            .ok_or_else(|| FilterError::Syntax(filter.clone()))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(FilterError::Syntax(filter.clone()));
        }

        let value = match table.column(column)?.kind {
            ColumnKind::Text => Value::text(raw),
            ColumnKind::Numeric => {
                if raw.trim().is_empty() {
                    Value::Null
                } else {
                    parse_number(raw).map(Value::Number).ok_or_else(|| {
                        FilterError::NotNumeric {
                            column: column.to_string(),
                            value: raw.to_string(),
                        }
                    })?
                }
            }
        };
        selection.entry(column.to_string()).or_default().insert(value);
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Record};

    fn table() -> Table {
        Table::new(
            vec![
                Column::new("brand", ColumnKind::Text),
                Column::new("battery_capacity", ColumnKind::Numeric),
            ],
            vec![
                Record::new(vec![Value::text("X"), Value::Number(5000.0)]),
                Record::new(vec![Value::text("Y"), Value::Number(4000.0)]),
                Record::new(vec![Value::text("X"), Value::Null]),
            ],
        )
    }

    #[test]
    fn empty_selection_keeps_everything() {
        assert_eq!(filtered_indices(&table(), &Selection::new()).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn constraints_are_combined() {
        let t = table();
        let sel = parse_selection(&t, &["brand=X".into(), "battery_capacity=5000".into()]).unwrap();
        assert_eq!(filtered_indices(&t, &sel).unwrap(), vec![0]);

        let sel = parse_selection(&t, &["brand=X".into(), "brand=Y".into()]).unwrap();
        assert_eq!(filtered_indices(&t, &sel).unwrap(), vec![0, 1, 2]);

        let sel = parse_selection(&t, &["battery_capacity=".into()]).unwrap();
        assert_eq!(filtered_indices(&t, &sel).unwrap(), vec![2]);
    }

    #[test]
    fn empty_accepted_set_rejects_all() {
        let mut sel = Selection::new();
        sel.insert("brand".into(), BTreeSet::new());
        assert!(filtered_indices(&table(), &sel).unwrap().is_empty());
    }

    #[test]
    fn bad_filters_are_rejected() {
        let t = table();
        assert_eq!(
            parse_selection(&t, &["brand".into()]).unwrap_err(),
            FilterError::Syntax("brand".into())
        );
        assert!(matches!(
            parse_selection(&t, &["colour=Red".into()]).unwrap_err(),
            FilterError::Column(_)
        ));
        assert!(matches!(
            parse_selection(&t, &["battery_capacity=big".into()]).unwrap_err(),
            FilterError::NotNumeric { .. }
        ));
    }
}
