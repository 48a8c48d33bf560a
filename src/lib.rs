//! # hydrogrid
//!
//! Domain decomposition and gridded NetCDF I/O for a land surface model.
//!
//! This crate provides the spatial plumbing a gridded simulation runs on:
//! - Activity-mask decoding into an active-cell domain
//! - Global/local index translation and rank partitioning
//! - Per-cell vegetation tile maps
//! - NetCDF schema declaration, block reads, and record writes
//! - An output variable catalog with aggregation and fill handling

pub mod config;
pub mod domain;
pub mod io;
pub mod output;

// Re-export main types for convenience
pub use config::ModelConfig;

// Domain types
pub use domain::{
    Domain, DomainError, DomainSummary, GridCell, GridWindow, MaskVariables, PartitionPolicy,
    VegMap, VegMapError, COVERAGE_TOLERANCE, NODATA_VEG, UNSET_INDEX,
};

// I/O types
pub use io::{
    is_missing_f32, is_missing_f64, is_missing_i32, is_valid_f32, is_valid_f64, DimExtent,
    DimKind, FileDimensions, FillValues, StorageKind, FILL_VALUE_F32, FILL_VALUE_F64,
    FILL_VALUE_I32, FILL_VALUE_I8, MAX_VAR_DIMS, MISSING_VALUE, MISSING_VALUE_I32,
};
#[cfg(feature = "netcdf")]
pub use io::{
    dimension_len, has_variable, read_block_f32, read_block_f64, read_block_i32, variable_shape,
    GridFile, GridIoError,
};

// Output types
pub use output::{
    scatter_to_grid, scatter_to_grid_i32, AggMethod, CatalogError, OutputCatalog, OutputRequest,
    RegisteredVar, SchemaError, VarSpec, WriteError,
};
#[cfg(feature = "netcdf")]
pub use output::{write_cell_field, write_cell_field_i32};
