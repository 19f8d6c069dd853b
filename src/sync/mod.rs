//! Board synchronization.
//!
//! This module drives full board-sync runs:
//!
//! - [`engine`] - the orchestrator (fetch, map, persist, summarize)
//! - [`report`] - run summaries and the per-record error collector
//!
//! # Architecture
//!
//! One run is strictly sequential: the board is fully fetched, then items
//! are mapped and persisted one at a time in source order. Fatal
//! conditions abort the board; per-record failures are counted and the
//! run continues.
//!
//! # Example
//!
//! ```ignore
//! use boardsync::sync::SyncEngine;
//!
//! let mut engine = SyncEngine::new(&client, &mut storage);
//! let report = engine.sync_board(&descriptor, 100).await?;
//! println!("{} imported, {} errors", report.imported, report.errors);
//! ```

pub mod engine;
pub mod report;

pub use engine::SyncEngine;
pub use report::{ErrorCollector, RecordError, RunOutcome, SyncReport, MAX_ERROR_SAMPLES};
