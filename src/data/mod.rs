/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///   Student_dataset.csv
///         │
///         ▼
///    ┌──────────┐
///    │  loader   │  parse file → Dataset (memoized per path)
///    └──────────┘
///         │
///         ▼
///    ┌──────────┐
///    │  Dataset  │  named columns of CellValue
///    └──────────┘
/// ```

pub mod loader;
pub mod model;
