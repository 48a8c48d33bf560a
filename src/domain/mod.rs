//! Model domain representation.
//!
//! Provides the spatial index the simulation runs over:
//! - Activity-mask decoding into an active-cell list
//! - Per-cell location records with global and local indices
//! - Partition policies for splitting cells across ranks
//! - Per-cell vegetation tile maps

mod grid;
mod location;
mod partition;
mod veg_map;

pub use grid::{Domain, DomainError, DomainSummary, GridWindow, MaskVariables};
pub use location::{GridCell, UNSET_INDEX};
pub use partition::PartitionPolicy;
pub use veg_map::{VegMap, VegMapError, COVERAGE_TOLERANCE, NODATA_VEG};
