//! # Gilt Traits
//!
//! Reference data contracts for the gilt yield engine.
//!
//! This crate holds the shapes shared between data sources and consumers.
//! Implementations (workbook ingestion, in-memory sources) live in
//! extension crates.
//!
//! ## Module Structure
//!
//! - [`reference_data`]: gilt listing records, the immutable [`GiltDirectory`]
//!   snapshot, and the async [`GiltReferenceSource`] trait
//! - [`error`]: the shared [`TraitError`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod reference_data;

// Re-export commonly used types
pub use error::TraitError;
pub use reference_data::{GiltDirectory, GiltRecord, GiltReferenceSource};
