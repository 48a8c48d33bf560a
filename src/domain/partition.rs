//! Ownership rules for splitting active cells across processes.

use super::grid::DomainError;

/// Rule assigning each active cell to exactly one owning rank.
///
/// Ownership is a pure function of the global active-cell index, so every
/// process derives the same split without communicating.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartitionPolicy {
    /// One process owns every cell
    #[default]
    Single,
    /// Contiguous runs of the active-cell list, balanced to within one cell
    Contiguous { n_ranks: usize },
    /// Cells dealt out cyclically across ranks
    RoundRobin { n_ranks: usize },
    /// Explicit owner rank per active cell
    Explicit(Vec<usize>),
}

impl PartitionPolicy {
    /// Number of ranks this policy splits across.
    pub fn n_ranks(&self) -> usize {
        match self {
            PartitionPolicy::Single => 1,
            PartitionPolicy::Contiguous { n_ranks } | PartitionPolicy::RoundRobin { n_ranks } => {
                *n_ranks
            }
            PartitionPolicy::Explicit(owners) => {
                owners.iter().max().map_or(0, |&max| max + 1)
            }
        }
    }

    /// Whether `rank` owns the cell with this global active-cell index.
    pub fn owns(&self, global_cell_idx: usize, ncells: usize, rank: usize) -> bool {
        match self {
            PartitionPolicy::Single => true,
            PartitionPolicy::Contiguous { n_ranks } => {
                contiguous_owner(global_cell_idx, ncells, *n_ranks) == rank
            }
            PartitionPolicy::RoundRobin { n_ranks } => global_cell_idx % n_ranks == rank,
            PartitionPolicy::Explicit(owners) => owners.get(global_cell_idx) == Some(&rank),
        }
    }

    /// Check the policy against a domain size and requested rank.
    pub(crate) fn validate(&self, ncells: usize, rank: usize) -> Result<(), DomainError> {
        if let PartitionPolicy::Explicit(owners) = self {
            if owners.len() != ncells {
                return Err(DomainError::OwnerMapLength {
                    expected: ncells,
                    got: owners.len(),
                });
            }
        }
        let n_ranks = self.n_ranks();
        if rank >= n_ranks {
            return Err(DomainError::RankOutOfRange { rank, n_ranks });
        }
        Ok(())
    }
}

/// Owner of a cell under the balanced contiguous split: the first
/// `ncells % n_ranks` ranks each take one extra cell.
fn contiguous_owner(idx: usize, ncells: usize, n_ranks: usize) -> usize {
    let base = ncells / n_ranks;
    let rem = ncells % n_ranks;
    if base == 0 {
        return idx;
    }
    let cut = rem * (base + 1);
    if idx < cut {
        idx / (base + 1)
    } else {
        rem + (idx - cut) / base
    }
}
