//! Search layer facade.
//!
//! - **[`index`]**: the `SearchIndex` contract the filter engine depends on.
//! - **[`tantivy`]**: in-RAM Tantivy implementation with prefix expansion.
//! - **[`filter`]**: the filter engine combining query hits and a price bound.

pub mod filter;
pub mod index;
pub mod tantivy;
