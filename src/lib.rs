//! boardsync - board synchronization engine.
//!
//! Pulls boards from an external work-management API, normalizes their
//! heterogeneously-typed column values into relational records, and
//! persists them to a local SQLite database.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`api`] - GraphQL client, wire types, and the column-value union
//! - [`mapping`] - Extractor, normalizer, and the descriptor-driven mapper
//! - [`model`] - Records, field values, and the normalized enumerations
//! - [`storage`] - SQLite database layer
//! - [`sync`] - The sync orchestrator and run reporting
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod mapping;
pub mod model;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
