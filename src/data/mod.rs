/// Data layer: sheet model, loading, normalisation and selection.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / directory of .parquet|.csv|.json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read one sheet → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  trim headers and key columns
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category / geography → ScopedTable → latest-period row
///   └──────────┘
/// ```
pub mod columns;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
