//! Item-to-record mapping pipeline.
//!
//! - [`extract`] - decode one column value into a normalized scalar
//! - [`normalize`] - map source labels onto closed enumerations
//! - [`descriptor`] - declarative board/table/field mapping configuration
//! - [`mapper`] - the generic mapper interpreting descriptors

pub mod descriptor;
pub mod extract;
pub mod mapper;
pub mod normalize;

pub use descriptor::{builtin_descriptors, BoardDescriptor, FieldKind, FieldMap, SyncMode};
pub use mapper::map_item;
