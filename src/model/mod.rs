//! Structured document model.
//!
//! This module defines the intermediate representation that sits between a
//! parsed markup tree and a serialized Word package. A document is a flat,
//! ordered sequence of blocks; tables are contiguous runs of row blocks.

mod block;
mod document;
mod stats;

pub use block::StructuredBlock;
pub use document::{Segment, StructuredDocument};
pub use stats::DocumentStats;
