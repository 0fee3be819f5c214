//! # Gilt Ext File
//!
//! File-based reference data for the gilt yield engine.
//!
//! This crate reads the published "Gilts in Issue" `.xls` workbooks:
//! - [`workbook`]: parses the conventional gilts section of one workbook
//! - [`discovery`]: finds and orders workbooks in a directory
//! - [`XlsGiltSource`]: merges every workbook into a cached [`GiltDirectory`]
//! - [`InMemoryGiltSource`]: a fixed directory, for tests and demos
//!
//! [`GiltDirectory`]: gilt_traits::GiltDirectory

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod discovery;
pub mod error;
mod reference_data;
pub mod workbook;

pub use error::{IngestError, IngestResult};
pub use reference_data::*;

use std::path::Path;
use std::sync::Arc;

use gilt_traits::GiltReferenceSource;

/// Create a workbook-backed gilt reference source.
pub fn create_file_reference_data(gilts_dir: impl AsRef<Path>) -> Arc<dyn GiltReferenceSource> {
    Arc::new(XlsGiltSource::new(gilts_dir))
}
