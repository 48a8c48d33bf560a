//! History output pipeline.
//!
//! Provides the path from model state to gridded records:
//! - Master catalog of supported output variables
//! - Variable specs with dimensions, aggregation, and storage control
//! - Registration of specs against an open file's schema
//! - Scatter-based record writes from active-cell vectors

mod catalog;
mod variable;
mod writer;

pub use catalog::{CatalogError, OutputCatalog, OutputRequest};
pub use variable::{AggMethod, RegisteredVar, SchemaError, VarSpec};
pub use writer::{scatter_to_grid, scatter_to_grid_i32, WriteError};

#[cfg(feature = "netcdf")]
pub use writer::{write_cell_field, write_cell_field_i32};
