use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn an input file into a [`Table`](super::model::Table).
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited text that is not a consistent table (ragged rows, bad quoting).
    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Structurally valid file whose shape is not a table of records.
    #[error("not a table: {0}")]
    InvalidShape(String),

    /// A required column is absent after header normalisation.
    #[error("missing required column '{0}'")]
    MissingColumn(String),
}

/// An operation referenced a column the table does not have.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("column not found: '{column}'")]
pub struct ColumnNotFound {
    pub column: String,
}

impl ColumnNotFound {
    pub fn new(column: impl Into<String>) -> Self {
        ColumnNotFound {
            column: column.into(),
        }
    }
}

/// A `column=value` row filter that cannot be applied to the table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter '{0}', expected column=value")]
    Syntax(String),

    #[error(transparent)]
    Column(#[from] ColumnNotFound),

    #[error("filter value '{value}' for numeric column '{column}' is not a number")]
    NotNumeric { column: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        assert_eq!(
            ColumnNotFound::new("ratings").to_string(),
            "column not found: 'ratings'"
        );
        assert_eq!(
            LoadError::MissingColumn("model".into()).to_string(),
            "missing required column 'model'"
        );
    }
}
