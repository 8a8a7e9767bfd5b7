//! Data layer: core types, loading, aggregation and comparison.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → coerce cells → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table   │  immutable Vec<Record>, typed columns
//!   └──────────┘
//!        │
//!        ├─────────────┬──────────────┬──────────────┐
//!        ▼             ▼              ▼              ▼
//!   ┌─────────┐  ┌───────────┐  ┌──────────┐  ┌──────────┐
//!   │ filter  │  │ aggregate │  │  views   │  │ compare  │
//!   └─────────┘  └───────────┘  └──────────┘  └──────────┘
//!   sub-tables    counts, means   dashboard     side-by-side
//!                 pivots, bins    charts        listings
//! ```

pub mod aggregate;
pub mod compare;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod views;
