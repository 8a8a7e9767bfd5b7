//! Smartphone listing analytics: load a listings file once, then derive
//! dashboard views and side-by-side comparisons from it.

pub mod data;

pub use data::compare::{compare, Comparison};
pub use data::error::{ColumnNotFound, FilterError, LoadError};
pub use data::loader::{load, load_with, LoadOptions};
pub use data::model::{Table, Value};
