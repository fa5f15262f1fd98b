//! Assistive Technology market snapshot.
//!
//! Reads the market, participant and provider sheets of a quarterly extract
//! and derives the figures shown on the dashboard for the latest period.

pub mod data;
pub mod error;
pub mod metrics;
pub mod snapshot;

pub use error::{Result, SnapshotError};
pub use snapshot::{MarketTables, SheetNames, Snapshot, SnapshotPipeline, SnapshotReport};
