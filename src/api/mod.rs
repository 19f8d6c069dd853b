//! Board API access.
//!
//! - [`types`] - wire structures and the decoded [`types::ColumnValue`] union
//! - [`client`] - paginated GraphQL client
//! - [`BoardSource`] - the seam the orchestrator fetches through
//!
//! Decoding from the API's untyped column-value bags into the closed
//! union happens once, at this boundary; the rest of the pipeline never
//! sees raw JSON.

pub mod client;
pub mod types;

pub use client::BoardApiClient;
pub use types::{Board, Column, ColumnValue, Item};

use crate::error::Result;

/// Source of boards for the sync engine.
///
/// Implemented by [`BoardApiClient`] for the real API and by in-memory
/// fakes in orchestrator tests.
pub trait BoardSource: Send + Sync {
    /// Fetch one board with all of its items (fully paginated).
    fn fetch_board(
        &self,
        board_id: &str,
        page_size: u32,
    ) -> impl std::future::Future<Output = Result<Board>> + Send;
}
