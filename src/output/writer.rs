//! Record writing for gridded history variables.
//!
//! Model state lives in compact per-cell vectors ordered by the domain's
//! active-cell list; files store dense `[nj, ni]` rasters. The writer
//! scatters each sub-entity slab onto the grid, substitutes fill outside
//! the active cells, and puts one block per slab through an open
//! [`GridFile`](crate::io::GridFile).
//!
//! # Example
//!
//! ```rust,ignore
//! use hydrogrid::output::write_cell_field;
//!
//! // swe holds one value per active cell for this record.
//! write_cell_field(&mut file, &swe_var, &domain, Some(record), &swe)?;
//! ```

use thiserror::Error;

use crate::domain::Domain;
#[cfg(feature = "netcdf")]
use crate::io::GridFile;
#[cfg(feature = "netcdf")]
use crate::io::GridIoError;
#[cfg(feature = "netcdf")]
use crate::io::{is_missing_f64, MISSING_VALUE, MISSING_VALUE_I32};

#[cfg(feature = "netcdf")]
use super::variable::RegisteredVar;

/// Error type for record writes.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Error from the file layer
    #[cfg(feature = "netcdf")]
    #[error(transparent)]
    Io(#[from] GridIoError),

    /// Variable does not span the spatial grid
    #[error("variable '{var}' is not a gridded cell field")]
    NotCellField { var: String },

    /// Record variable written without a record index
    #[error("variable '{var}' has a record dimension, record index required")]
    MissingTimeIndex { var: String },

    /// Non-record variable written with a record index
    #[error("variable '{var}' has no record dimension, record index not allowed")]
    UnexpectedTimeIndex { var: String },

    /// Value vector does not cover every slab and cell
    #[error(
        "variable '{var}' expects {expected} values ({n_sub} slabs x {ncells} cells), got {got}"
    )]
    ValueCount {
        var: String,
        expected: usize,
        n_sub: usize,
        ncells: usize,
        got: usize,
    },
}

/// Scatter per-cell values onto a dense row-major grid.
///
/// `values` holds one entry per cell of the scope, in active-list order;
/// grid positions outside the scope get `fill`.
pub fn scatter_to_grid(domain: &Domain, values: &[f64], fill: f64) -> Vec<f64> {
    debug_assert_eq!(values.len(), domain.ncells_active);
    let mut grid = vec![fill; domain.n_nx * domain.n_ny];
    for (i, &value) in values.iter().enumerate() {
        grid[domain.global_grid_offset(i)] = value;
    }
    grid
}

/// Integer variant of [`scatter_to_grid`].
pub fn scatter_to_grid_i32(domain: &Domain, values: &[i32], fill: i32) -> Vec<i32> {
    debug_assert_eq!(values.len(), domain.ncells_active);
    let mut grid = vec![fill; domain.n_nx * domain.n_ny];
    for (i, &value) in values.iter().enumerate() {
        grid[domain.global_grid_offset(i)] = value;
    }
    grid
}

/// Write one record of a gridded variable from per-cell values.
///
/// `values` is slab-major: all cells of sub-entity slab 0, then slab 1,
/// and so on, each slab in the scope's active-list order. Values are
/// scaled by the variable's factor; missing values and grid positions
/// outside the scope become the file's fill. The spatial window spans the
/// whole grid, so the scope must cover every cell the record reports
/// (the global domain, or gathered values under a partitioned run).
#[cfg(feature = "netcdf")]
pub fn write_cell_field(
    file: &mut GridFile,
    var: &RegisteredVar,
    domain: &Domain,
    time_index: Option<usize>,
    values: &[f64],
) -> Result<(), WriteError> {
    check_record_shape(var, domain, time_index, values.len())?;

    let ncells = domain.ncells_active;
    for sub in 0..var.sub_count() {
        let slab = &values[sub * ncells..(sub + 1) * ncells];
        let scaled: Vec<f64> = slab
            .iter()
            .map(|&v| if is_missing_f64(v) { MISSING_VALUE } else { v * var.mult })
            .collect();
        let dense = scatter_to_grid(domain, &scaled, MISSING_VALUE);
        let (start, count) =
            var.block_window(time_index.unwrap_or(0), sub, domain.n_nx, domain.n_ny);
        file.write_block_f64(&var.name, &start, &count, &dense)?;
    }
    Ok(())
}

/// Integer variant of [`write_cell_field`]; no scale factor is applied.
#[cfg(feature = "netcdf")]
pub fn write_cell_field_i32(
    file: &mut GridFile,
    var: &RegisteredVar,
    domain: &Domain,
    time_index: Option<usize>,
    values: &[i32],
) -> Result<(), WriteError> {
    check_record_shape(var, domain, time_index, values.len())?;

    let ncells = domain.ncells_active;
    for sub in 0..var.sub_count() {
        let slab = &values[sub * ncells..(sub + 1) * ncells];
        let dense = scatter_to_grid_i32(domain, slab, MISSING_VALUE_I32);
        let (start, count) =
            var.block_window(time_index.unwrap_or(0), sub, domain.n_nx, domain.n_ny);
        file.write_block_i32(&var.name, &start, &count, &dense)?;
    }
    Ok(())
}

#[cfg(feature = "netcdf")]
fn check_record_shape(
    var: &RegisteredVar,
    domain: &Domain,
    time_index: Option<usize>,
    got: usize,
) -> Result<(), WriteError> {
    if !var.is_cell_field() {
        return Err(WriteError::NotCellField {
            var: var.name.clone(),
        });
    }
    if var.has_time() && time_index.is_none() {
        return Err(WriteError::MissingTimeIndex {
            var: var.name.clone(),
        });
    }
    if !var.has_time() && time_index.is_some() {
        return Err(WriteError::UnexpectedTimeIndex {
            var: var.name.clone(),
        });
    }
    let n_sub = var.sub_count();
    let ncells = domain.ncells_active;
    let expected = n_sub * ncells;
    if got != expected {
        return Err(WriteError::ValueCount {
            var: var.name.clone(),
            expected,
            n_sub,
            ncells,
            got,
        });
    }
    Ok(())
}
