//! Command implementations.

pub mod boards;
pub mod completions;
pub mod init;
pub mod status;
pub mod sync;
pub mod version;
