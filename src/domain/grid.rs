//! Active-cell domain index over a 2-D land mask.
//!
//! The model grid is a regular `n_nx` by `n_ny` raster; only cells whose
//! mask value is positive take part in the simulation. A [`Domain`] holds
//! one [`GridCell`](super::GridCell) record per active cell, ordered by the
//! global active-cell index, and answers the local-to-global index lookups
//! every file write addresses the grid through.
//!
//! # Example
//!
//! ```rust,ignore
//! use hydrogrid::domain::{Domain, MaskVariables, PartitionPolicy};
//!
//! let domain = Domain::from_mask_file("domain.nc", &MaskVariables::default())?;
//! domain.log_summary(false);
//!
//! let local = domain.local_subset(&PartitionPolicy::Contiguous { n_ranks: 4 }, 0)?;
//! for i in 0..local.ncells_active {
//!     let offset = local.global_grid_offset(i);
//!     // gather values for the file block at `offset` ...
//! }
//! ```

use std::fmt;
#[cfg(feature = "netcdf")]
use std::path::Path;

#[cfg(feature = "netcdf")]
use log::warn;
use log::{debug, info};
use thiserror::Error;

#[cfg(feature = "netcdf")]
use crate::io::{has_variable, read_block_f64, variable_shape, GridIoError};

use super::location::GridCell;
use super::partition::PartitionPolicy;

/// Error type for domain construction.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Error from the file layer
    #[cfg(feature = "netcdf")]
    #[error(transparent)]
    Io(#[from] GridIoError),

    /// Mask declares no active cells
    #[error("domain mask has no active cells")]
    EmptyMask,

    /// Grid shape and mask length disagree, or an axis is zero
    #[error("invalid domain grid shape {nx} x {ny} for {len} mask values")]
    InvalidShape { nx: usize, ny: usize, len: usize },

    /// Mask variable is not a 2-D raster
    #[error("mask variable '{name}' in {file} must be 2-D, got shape {shape:?}")]
    MaskRank {
        file: String,
        name: String,
        shape: Vec<usize>,
    },

    /// Auxiliary variable does not match the grid
    #[error("variable '{name}' in {file} has shape {shape:?}, expected {expected:?}")]
    AuxiliaryShape {
        file: String,
        name: String,
        shape: Vec<usize>,
        expected: Vec<usize>,
    },

    /// Active fraction outside (0, 1]
    #[error("active fraction {frac} at (x {x}, y {y}) is outside (0, 1]")]
    InvalidFraction { x: usize, y: usize, frac: f64 },

    /// Requested rank does not exist under the partition policy
    #[error("rank {rank} out of range for {n_ranks} ranks")]
    RankOutOfRange { rank: usize, n_ranks: usize },

    /// Explicit owner map does not cover the active cells
    #[error("owner map has {got} entries for {expected} active cells")]
    OwnerMapLength { expected: usize, got: usize },
}

/// Variable names looked up in a domain file.
#[derive(Debug, Clone)]
pub struct MaskVariables {
    /// Activity mask, 2-D, required
    pub mask: String,
    /// Longitude coordinate, optional
    pub lon: String,
    /// Latitude coordinate, optional
    pub lat: String,
    /// Active fraction, optional (overrides fractional mask values)
    pub frac: String,
    /// Cell area, optional
    pub area: String,
}

impl Default for MaskVariables {
    fn default() -> Self {
        Self {
            mask: "mask".to_string(),
            lon: "lon".to_string(),
            lat: "lat".to_string(),
            frac: "frac".to_string(),
            area: "area".to_string(),
        }
    }
}

impl MaskVariables {
    /// Default variable names (`mask`, `lon`, `lat`, `frac`, `area`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mask variable name.
    pub fn with_mask(mut self, name: impl Into<String>) -> Self {
        self.mask = name.into();
        self
    }

    /// Set the coordinate variable names.
    pub fn with_coordinates(mut self, lon: impl Into<String>, lat: impl Into<String>) -> Self {
        self.lon = lon.into();
        self.lat = lat.into();
        self
    }

    /// Set the active-fraction variable name.
    pub fn with_frac(mut self, name: impl Into<String>) -> Self {
        self.frac = name.into();
        self
    }

    /// Set the area variable name.
    pub fn with_area(mut self, name: impl Into<String>) -> Self {
        self.area = name.into();
        self
    }
}

/// Rectangular start/count window into the model grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWindow {
    pub x_start: usize,
    pub y_start: usize,
    pub x_count: usize,
    pub y_count: usize,
}

/// Active-cell index for one scope of the model grid.
///
/// The global domain covers every active cell; a local domain produced by
/// [`local_subset`](Domain::local_subset) covers the cells one rank owns.
/// Grid shape is identical across scopes.
#[derive(Debug, Clone)]
pub struct Domain {
    /// Active cells in the full grid
    pub ncells_global: usize,
    /// Grid x size
    pub n_nx: usize,
    /// Grid y size
    pub n_ny: usize,
    /// Active cells in this scope
    pub ncells_active: usize,
    /// Cell records, ordered by ascending global cell index
    pub locations: Vec<GridCell>,
}

impl Domain {
    /// Build the global domain from an in-memory activity mask.
    ///
    /// `mask` is row-major `[y][x]`; a positive value marks an active cell,
    /// and values in (0, 1] double as the active fraction. Global cell
    /// indices are assigned in row-major order starting at 0.
    pub fn from_mask(mask: &[f64], n_nx: usize, n_ny: usize) -> Result<Self, DomainError> {
        if n_nx == 0 || n_ny == 0 || mask.len() != n_nx * n_ny {
            return Err(DomainError::InvalidShape {
                nx: n_nx,
                ny: n_ny,
                len: mask.len(),
            });
        }

        let mut locations = Vec::new();
        for y in 0..n_ny {
            for x in 0..n_nx {
                let value = mask[y * n_nx + x];
                if !(value > 0.0) {
                    continue;
                }
                // Integer-coded masks (1, 2, ...) mean fully active.
                let frac = if value <= 1.0 { value } else { 1.0 };
                let idx = locations.len();
                let mut cell = GridCell::unset();
                cell.frac = frac;
                cell.global_cell_idx = idx;
                cell.global_x_idx = x;
                cell.global_y_idx = y;
                cell.local_cell_idx = idx;
                cell.local_x_idx = x;
                cell.local_y_idx = y;
                locations.push(cell);
            }
        }

        if locations.is_empty() {
            return Err(DomainError::EmptyMask);
        }

        Ok(Self {
            ncells_global: locations.len(),
            n_nx,
            n_ny,
            ncells_active: locations.len(),
            locations,
        })
    }

    /// Build the global domain from a domain file.
    ///
    /// The mask variable is required and must be 2-D `[nj, ni]`. Coordinate
    /// variables may be 1-D (regular grid) or 2-D (curvilinear); fraction
    /// and area variables are optional 2-D rasters. Absent optionals leave
    /// the corresponding cell fields at their sentinels.
    #[cfg(feature = "netcdf")]
    pub fn from_mask_file(
        path: impl AsRef<Path>,
        vars: &MaskVariables,
    ) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let file = path.display().to_string();

        let shape = variable_shape(path, &vars.mask)?;
        if shape.len() != 2 {
            return Err(DomainError::MaskRank {
                file,
                name: vars.mask.clone(),
                shape,
            });
        }
        let (n_ny, n_nx) = (shape[0], shape[1]);
        if n_nx == 0 || n_ny == 0 {
            return Err(DomainError::InvalidShape {
                nx: n_nx,
                ny: n_ny,
                len: 0,
            });
        }

        let mask = read_block_f64(path, &vars.mask, &[0, 0], &[n_ny, n_nx])?;
        let mut domain = Self::from_mask(&mask, n_nx, n_ny)?;

        let has_lon = has_variable(path, &vars.lon)?;
        let has_lat = has_variable(path, &vars.lat)?;
        if has_lon && has_lat {
            read_coordinates(path, &file, vars, &mut domain)?;
        } else if has_lon != has_lat {
            warn!(
                "domain file {} has only one of '{}'/'{}', coordinates left unset",
                file, vars.lon, vars.lat
            );
        }

        if has_variable(path, &vars.frac)? {
            let frac = read_grid_var(path, &file, &vars.frac, n_nx, n_ny)?;
            for cell in &mut domain.locations {
                let v = frac[cell.global_y_idx * n_nx + cell.global_x_idx];
                if !(v > 0.0 && v <= 1.0) {
                    return Err(DomainError::InvalidFraction {
                        x: cell.global_x_idx,
                        y: cell.global_y_idx,
                        frac: v,
                    });
                }
                cell.frac = v;
            }
        }

        if has_variable(path, &vars.area)? {
            let area = read_grid_var(path, &file, &vars.area, n_nx, n_ny)?;
            for cell in &mut domain.locations {
                cell.area = area[cell.global_y_idx * n_nx + cell.global_x_idx];
            }
        }

        info!(
            "domain {}: {} active of {} cells ({} x {})",
            file,
            domain.ncells_active,
            n_nx * n_ny,
            n_nx,
            n_ny
        );
        Ok(domain)
    }

    /// Derive the local domain one rank owns under a partition policy.
    ///
    /// Local cell indices are assigned in the same relative order as the
    /// global list; global indices and the grid shape carry through
    /// unchanged. Call on the global domain.
    pub fn local_subset(
        &self,
        policy: &PartitionPolicy,
        rank: usize,
    ) -> Result<Domain, DomainError> {
        policy.validate(self.ncells_global, rank)?;

        let mut locations = Vec::new();
        for cell in &self.locations {
            if policy.owns(cell.global_cell_idx, self.ncells_global, rank) {
                let mut local = *cell;
                local.local_cell_idx = locations.len();
                local.local_x_idx = cell.global_x_idx;
                local.local_y_idx = cell.global_y_idx;
                locations.push(local);
            }
        }

        Ok(Domain {
            ncells_global: self.ncells_global,
            n_nx: self.n_nx,
            n_ny: self.n_ny,
            ncells_active: locations.len(),
            locations,
        })
    }

    /// Global active-cell index of the cell at a local position. O(1).
    #[inline]
    pub fn global_cell_index(&self, local_position: usize) -> usize {
        self.locations[local_position].global_cell_idx
    }

    /// Dense row-major grid offset of the cell at a local position. O(1).
    ///
    /// This is the coordinate file writes address the spatial window with.
    #[inline]
    pub fn global_grid_offset(&self, local_position: usize) -> usize {
        let cell = &self.locations[local_position];
        cell.global_y_idx * self.n_nx + cell.global_x_idx
    }

    /// Whether this scope covers every active cell.
    #[inline]
    pub fn is_global(&self) -> bool {
        self.ncells_active == self.ncells_global
    }

    /// Look up a cell of this scope by its global active-cell index.
    pub fn find_global(&self, global_cell_idx: usize) -> Option<&GridCell> {
        self.locations
            .binary_search_by_key(&global_cell_idx, |cell| cell.global_cell_idx)
            .ok()
            .map(|i| &self.locations[i])
    }

    /// Smallest start/count window covering this scope's cells.
    ///
    /// `None` only for an empty scope (a rank that owns no cells).
    pub fn bounding_window(&self) -> Option<GridWindow> {
        let first = self.locations.first()?;
        let mut x_min = first.global_x_idx;
        let mut x_max = first.global_x_idx;
        let mut y_min = first.global_y_idx;
        let mut y_max = first.global_y_idx;
        for cell in &self.locations[1..] {
            x_min = x_min.min(cell.global_x_idx);
            x_max = x_max.max(cell.global_x_idx);
            y_min = y_min.min(cell.global_y_idx);
            y_max = y_max.max(cell.global_y_idx);
        }
        Some(GridWindow {
            x_start: x_min,
            y_start: y_min,
            x_count: x_max - x_min + 1,
            y_count: y_max - y_min + 1,
        })
    }

    /// Summary statistics for this scope.
    pub fn summary(&self) -> DomainSummary {
        let partial_cells = self
            .locations
            .iter()
            .filter(|cell| cell.frac < 1.0)
            .count();
        DomainSummary {
            n_nx: self.n_nx,
            n_ny: self.n_ny,
            ncells_global: self.ncells_global,
            ncells_active: self.ncells_active,
            partial_cells,
        }
    }

    /// Log the summary; with `verbose`, also log every cell record.
    pub fn log_summary(&self, verbose: bool) {
        for line in self.summary().to_string().lines() {
            info!("{line}");
        }
        if verbose {
            for cell in &self.locations {
                debug!("{cell}");
            }
        }
    }
}

#[cfg(feature = "netcdf")]
fn read_grid_var(
    path: &Path,
    file: &str,
    name: &str,
    n_nx: usize,
    n_ny: usize,
) -> Result<Vec<f64>, DomainError> {
    let shape = variable_shape(path, name)?;
    if shape != [n_ny, n_nx] {
        return Err(DomainError::AuxiliaryShape {
            file: file.to_string(),
            name: name.to_string(),
            shape,
            expected: vec![n_ny, n_nx],
        });
    }
    Ok(read_block_f64(path, name, &[0, 0], &[n_ny, n_nx])?)
}

#[cfg(feature = "netcdf")]
fn read_coordinates(
    path: &Path,
    file: &str,
    vars: &MaskVariables,
    domain: &mut Domain,
) -> Result<(), DomainError> {
    let (n_nx, n_ny) = (domain.n_nx, domain.n_ny);
    let lon_shape = variable_shape(path, &vars.lon)?;
    let lat_shape = variable_shape(path, &vars.lat)?;

    match (lon_shape.len(), lat_shape.len()) {
        (1, 1) => {
            if lon_shape[0] != n_nx {
                return Err(DomainError::AuxiliaryShape {
                    file: file.to_string(),
                    name: vars.lon.clone(),
                    shape: lon_shape,
                    expected: vec![n_nx],
                });
            }
            if lat_shape[0] != n_ny {
                return Err(DomainError::AuxiliaryShape {
                    file: file.to_string(),
                    name: vars.lat.clone(),
                    shape: lat_shape,
                    expected: vec![n_ny],
                });
            }
            let lon = read_block_f64(path, &vars.lon, &[0], &[n_nx])?;
            let lat = read_block_f64(path, &vars.lat, &[0], &[n_ny])?;
            for cell in &mut domain.locations {
                cell.longitude = lon[cell.global_x_idx];
                cell.latitude = lat[cell.global_y_idx];
            }
        }
        (2, 2) => {
            let lon = read_grid_var(path, file, &vars.lon, n_nx, n_ny)?;
            let lat = read_grid_var(path, file, &vars.lat, n_nx, n_ny)?;
            for cell in &mut domain.locations {
                let offset = cell.global_y_idx * n_nx + cell.global_x_idx;
                cell.longitude = lon[offset];
                cell.latitude = lat[offset];
            }
        }
        _ => {
            let (name, shape, expected) = if lon_shape.len() > 2 || lon_shape.is_empty() {
                (vars.lon.clone(), lon_shape, vec![n_nx])
            } else {
                (vars.lat.clone(), lat_shape, vec![n_ny])
            };
            return Err(DomainError::AuxiliaryShape {
                file: file.to_string(),
                name,
                shape,
                expected,
            });
        }
    }
    Ok(())
}

/// Summary statistics for one domain scope.
#[derive(Debug, Clone)]
pub struct DomainSummary {
    /// Grid x size
    pub n_nx: usize,
    /// Grid y size
    pub n_ny: usize,
    /// Active cells in the full grid
    pub ncells_global: usize,
    /// Active cells in this scope
    pub ncells_active: usize,
    /// Cells with an active fraction below 1
    pub partial_cells: usize,
}

impl fmt::Display for DomainSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.n_nx * self.n_ny;
        writeln!(f, "Domain summary:")?;
        writeln!(f, "  grid: {} x {} ({} cells)", self.n_nx, self.n_ny, total)?;
        writeln!(
            f,
            "  active cells (global): {} ({:.1}%)",
            self.ncells_global,
            100.0 * self.ncells_global as f64 / total as f64
        )?;
        writeln!(f, "  active cells (this scope): {}", self.ncells_active)?;
        write!(f, "  partial-fraction cells: {}", self.partial_cells)
    }
}
