//! Per-cell vegetation tile map.
//!
//! Each active grid cell carries a map from vegetation class to tile: a
//! class is either inactive ([`NODATA_VEG`]) or holds a tile index plus the
//! fraction of the cell the class covers. Active coverages must sum to 1.

use thiserror::Error;

/// Tile marker for a vegetation class not present in the cell.
pub const NODATA_VEG: i32 = -1;

/// Allowed deviation of the active coverage sum from 1.
pub const COVERAGE_TOLERANCE: f64 = 1e-6;

/// Error type for vegetation map construction and validation.
#[derive(Debug, Error)]
pub enum VegMapError {
    /// Class index beyond the declared class count
    #[error("vegetation class {class} out of range for {nv_types} classes")]
    ClassOutOfRange { class: usize, nv_types: usize },

    /// Active coverages do not sum to 1
    #[error("vegetation coverage sums to {sum}, expected 1")]
    CoverageSum { sum: f64 },

    /// Two classes claim the same tile
    #[error("vegetation tile {tile} assigned to more than one class")]
    DuplicateTile { tile: i32 },

    /// Tile index beyond the active tile count
    #[error("vegetation tile {tile} out of range for {active} active tiles")]
    TileRange { tile: i32, active: usize },
}

/// Class-to-tile map for one grid cell.
///
/// Indexed by vegetation class over the full classification; `vidx` holds
/// the tile index of each active class (or [`NODATA_VEG`]) and `cv` its
/// coverage fraction. Tiles are numbered densely in activation order.
#[derive(Debug, Clone, PartialEq)]
pub struct VegMap {
    /// Classes in the vegetation classification
    pub nv_types: usize,
    /// Tile index per class, NODATA_VEG when inactive
    pub vidx: Vec<i32>,
    /// Coverage fraction per class, 0 when inactive
    pub cv: Vec<f64>,
}

impl VegMap {
    /// Empty map sized to a classification; every class starts inactive.
    pub fn new(nv_types: usize) -> Self {
        Self {
            nv_types,
            vidx: vec![NODATA_VEG; nv_types],
            cv: vec![0.0; nv_types],
        }
    }

    /// Tile count a fully populated cell carries: one tile per vegetation
    /// class plus bare soil, plus the above-treeline tile when enabled.
    pub fn expected_active(nveg: usize, compute_treeline: bool) -> usize {
        nveg + 1 + usize::from(compute_treeline)
    }

    /// Activate a class (or update its coverage) and return its tile index.
    pub fn set(&mut self, class: usize, coverage: f64) -> Result<usize, VegMapError> {
        if class >= self.nv_types {
            return Err(VegMapError::ClassOutOfRange {
                class,
                nv_types: self.nv_types,
            });
        }
        let tile = match self.tile_of(class) {
            Some(tile) => tile,
            None => {
                let tile = self.nv_active();
                self.vidx[class] = tile as i32;
                tile
            }
        };
        self.cv[class] = coverage;
        Ok(tile)
    }

    /// Whether a class holds a tile in this cell.
    #[inline]
    pub fn is_active(&self, class: usize) -> bool {
        self.vidx.get(class).is_some_and(|&tile| tile != NODATA_VEG)
    }

    /// Tile index of a class, if active.
    #[inline]
    pub fn tile_of(&self, class: usize) -> Option<usize> {
        match self.vidx.get(class) {
            Some(&tile) if tile != NODATA_VEG => Some(tile as usize),
            _ => None,
        }
    }

    /// Number of active tiles.
    pub fn nv_active(&self) -> usize {
        self.vidx.iter().filter(|&&tile| tile != NODATA_VEG).count()
    }

    /// Classes holding a tile, in class order.
    pub fn active_classes(&self) -> impl Iterator<Item = usize> + '_ {
        self.vidx
            .iter()
            .enumerate()
            .filter(|(_, &tile)| tile != NODATA_VEG)
            .map(|(class, _)| class)
    }

    /// Sum of active coverage fractions.
    pub fn coverage_sum(&self) -> f64 {
        self.active_classes().map(|class| self.cv[class]).sum()
    }

    /// Check tile assignment consistency and the coverage sum.
    pub fn validate(&self) -> Result<(), VegMapError> {
        let active = self.nv_active();
        let mut seen = vec![false; active];
        for &tile in self.vidx.iter().filter(|&&tile| tile != NODATA_VEG) {
            if tile < 0 || tile as usize >= active {
                return Err(VegMapError::TileRange { tile, active });
            }
            if seen[tile as usize] {
                return Err(VegMapError::DuplicateTile { tile });
            }
            seen[tile as usize] = true;
        }

        let sum = self.coverage_sum();
        if (sum - 1.0).abs() > COVERAGE_TOLERANCE {
            return Err(VegMapError::CoverageSum { sum });
        }
        Ok(())
    }

    /// Rescale active coverages so they sum to exactly 1.
    ///
    /// Fails when the current sum is too small to divide by.
    pub fn normalize(&mut self) -> Result<(), VegMapError> {
        let sum = self.coverage_sum();
        if sum <= COVERAGE_TOLERANCE {
            return Err(VegMapError::CoverageSum { sum });
        }
        for class in 0..self.nv_types {
            if self.vidx[class] != NODATA_VEG {
                self.cv[class] /= sum;
            }
        }
        Ok(())
    }
}
