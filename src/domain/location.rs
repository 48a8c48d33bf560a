//! Grid cell metadata records.

use std::fmt;

use crate::io::MISSING_VALUE;

/// Sentinel for an index that has not been assigned.
pub const UNSET_INDEX: usize = usize::MAX;

/// Metadata for one active cell of the model grid.
///
/// Carries the cell's geographic coordinates and its position in both the
/// global and the local (per-process) numbering. Populated once during
/// domain construction and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Latitude (degrees north)
    pub latitude: f64,
    /// Longitude (degrees east)
    pub longitude: f64,
    /// Cell area (m2)
    pub area: f64,
    /// Fraction of the cell that is active, in (0, 1]
    pub frac: f64,
    /// Index in the global active-cell list
    pub global_cell_idx: usize,
    /// Column in the global grid
    pub global_x_idx: usize,
    /// Row in the global grid
    pub global_y_idx: usize,
    /// Index in the local active-cell list
    pub local_cell_idx: usize,
    /// Column in the local numbering
    pub local_x_idx: usize,
    /// Row in the local numbering
    pub local_y_idx: usize,
}

impl GridCell {
    /// A cell with every field at its unset sentinel.
    pub fn unset() -> Self {
        Self {
            latitude: MISSING_VALUE,
            longitude: MISSING_VALUE,
            area: MISSING_VALUE,
            frac: MISSING_VALUE,
            global_cell_idx: UNSET_INDEX,
            global_x_idx: UNSET_INDEX,
            global_y_idx: UNSET_INDEX,
            local_cell_idx: UNSET_INDEX,
            local_x_idx: UNSET_INDEX,
            local_y_idx: UNSET_INDEX,
        }
    }

    /// Whether this cell has been assigned a place in the grid.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.global_cell_idx != UNSET_INDEX
    }
}

impl Default for GridCell {
    fn default() -> Self {
        Self::unset()
    }
}

fn fmt_idx(i: usize) -> String {
    if i == UNSET_INDEX {
        "-".to_string()
    } else {
        i.to_string()
    }
}

impl fmt::Display for GridCell {
    /// One bounded line per cell; safe on unset values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell {} (lat {:.4}, lon {:.4}, frac {:.3}): \
             global x {} y {}, local {} x {} y {}",
            fmt_idx(self.global_cell_idx),
            self.latitude,
            self.longitude,
            self.frac,
            fmt_idx(self.global_x_idx),
            fmt_idx(self.global_y_idx),
            fmt_idx(self.local_cell_idx),
            fmt_idx(self.local_x_idx),
            fmt_idx(self.local_y_idx),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_cell() {
        let cell = GridCell::unset();
        assert!(!cell.is_set());
        assert_eq!(cell.global_cell_idx, UNSET_INDEX);
        assert_eq!(cell.latitude, MISSING_VALUE);
        assert_eq!(cell, GridCell::default());
    }

    #[test]
    fn test_display_unset_is_safe() {
        let line = GridCell::unset().to_string();
        assert!(line.starts_with("cell -"));
        assert!(line.len() < 200);
    }

    #[test]
    fn test_display_set_cell() {
        let cell = GridCell {
            latitude: 45.25,
            longitude: -112.75,
            area: 1.0e8,
            frac: 1.0,
            global_cell_idx: 7,
            global_x_idx: 3,
            global_y_idx: 1,
            local_cell_idx: 7,
            local_x_idx: 3,
            local_y_idx: 1,
        };
        let line = cell.to_string();
        assert!(line.contains("cell 7"));
        assert!(line.contains("lat 45.2500"));
        assert!(line.contains("global x 3 y 1"));
    }
}
