/// Data layer: core table types and loading.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  typed columns, class labels, feature matrices
///   └──────────┘
/// ```
pub mod loader;
pub mod model;
