mod config;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value as Json;

use config::{Command, Config};
use phone_lens::data::aggregate::{frequency_count, group_mean, histogram, pivot_mean};
use phone_lens::data::filter::{filtered_indices, parse_selection};
use phone_lens::data::views::DashboardViews;
use phone_lens::{compare, load_with, Table};

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::parse();

    let table = load_with(&config.data, &config.load_options())
        .with_context(|| format!("loading listings from {}", config.data.display()))?;
    let table = apply_filters(table, &config.filters)?;

    let output = run(&config.command, &table)?;
    let text = if config.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}

/// Narrow the table to the rows matching every `column=value` filter.
fn apply_filters(table: Table, filters: &[String]) -> Result<Table> {
    if filters.is_empty() {
        return Ok(table);
    }
    let selection = parse_selection(&table, filters).context("parsing --filter")?;
    let indices = filtered_indices(&table, &selection)?;
    log::info!("{} of {} listings match the filters", indices.len(), table.len());
    Ok(table.subset(&indices))
}

fn run(command: &Command, table: &Table) -> Result<Json> {
    let output = match command {
        Command::Summary => serde_json::to_value(DashboardViews::build(table)?)?,
        Command::Counts { column } => serde_json::to_value(frequency_count(table, column)?)?,
        Command::Mean { group, value } => serde_json::to_value(group_mean(table, group, value)?)?,
        Command::Pivot { row, col, value } => {
            serde_json::to_value(pivot_mean(table, row, col, value)?)?
        }
        Command::Histogram { column, buckets } => {
            serde_json::to_value(histogram(table, column, *buckets)?)?
        }
        Command::Models => serde_json::to_value(table.model_options()?)?,
        Command::Compare { model_a, model_b } => {
            serde_json::to_value(compare(table, model_a, model_b)?)?
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phone_lens::data::model::{Column, ColumnKind, Record};
    use phone_lens::Value;

    fn table() -> Table {
        Table::new(
            vec![
                Column::new("brand", ColumnKind::Text),
                Column::new("model", ColumnKind::Text),
                Column::new("ratings", ColumnKind::Numeric),
            ],
            vec![
                Record::new(vec![Value::text("X"), Value::text("A"), Value::Number(4.0)]),
                Record::new(vec![Value::text("X"), Value::text("B"), Value::Null]),
                Record::new(vec![Value::text("Y"), Value::text("C"), Value::Number(3.0)]),
            ],
        )
    }

    #[test]
    fn mean_command_outputs_groups() {
        let out = run(
            &Command::Mean {
                group: "brand".into(),
                value: "ratings".into(),
            },
            &table(),
        )
        .unwrap();
        assert_eq!(out["groups"][0]["key"], "X");
        assert_eq!(out["groups"][0]["mean"], 4.0);
        assert_eq!(out["groups"][1]["mean"], 3.0);
    }

    #[test]
    fn models_are_listed_sorted() {
        let out = run(&Command::Models, &table()).unwrap();
        assert_eq!(out, serde_json::json!(["A", "B", "C"]));
    }

    #[test]
    fn unknown_column_fails() {
        let err = run(
            &Command::Counts {
                column: "colour".into(),
            },
            &table(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn filters_narrow_the_table() {
        let t = apply_filters(table(), &["brand=Y".to_string()]).unwrap();
        assert_eq!(t.len(), 1);
        assert!(apply_filters(table(), &["brand".to_string()]).is_err());
    }
}
