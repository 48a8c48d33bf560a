//! Gridded model file I/O.
//!
//! This module provides:
//! - **Dimension vocabulary**: the fixed set of dimensions model files declare
//! - **Fill values**: per-type fill constants and the missing-data sentinel
//! - **File handles**: open/closed lifecycle for output files (requires `netcdf` feature)
//! - **Block transfer**: typed hyperslab reads and fill-substituting writes
//!
//! # Example
//!
//! ```rust,ignore
//! use hydrogrid::io::{DimExtent, DimKind, FileDimensions, GridFile};
//!
//! let dims = FileDimensions::new()
//!     .with(DimKind::Time, DimExtent::Unlimited)
//!     .with(DimKind::Nj, DimExtent::Fixed(180))
//!     .with(DimKind::Ni, DimExtent::Fixed(360));
//!
//! let mut file = GridFile::new("fluxes.nc");
//! file.open_for_write(&dims)?;
//! // ... define variables, write blocks ...
//! file.close();
//! ```

mod dimensions;
mod fill;
#[cfg(feature = "netcdf")]
mod file;
#[cfg(feature = "netcdf")]
mod stream;

pub use dimensions::{DimExtent, DimKind, FileDimensions, StorageKind, MAX_VAR_DIMS};
pub use fill::{
    is_missing_f32, is_missing_f64, is_missing_i32, is_valid_f32, is_valid_f64, FillValues,
    FILL_VALUE_F32, FILL_VALUE_F64, FILL_VALUE_I32, FILL_VALUE_I8, MISSING_VALUE,
    MISSING_VALUE_I32,
};
#[cfg(feature = "netcdf")]
pub use file::GridFile;
#[cfg(feature = "netcdf")]
pub use stream::{
    dimension_len, has_variable, read_block_f32, read_block_f64, read_block_i32, variable_shape,
    GridIoError,
};
