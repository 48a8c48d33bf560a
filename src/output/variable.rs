//! Output variable descriptions.
//!
//! A [`VarSpec`] says what a history variable looks like: dimensions,
//! storage type, units, and how instantaneous model values aggregate into
//! one record. Registering a spec against an open file resolves the
//! declared dimension lengths into a [`RegisteredVar`], which carries the
//! fixed-capacity start/count machinery used when writing blocks.

use thiserror::Error;

use crate::io::{DimKind, StorageKind, MAX_VAR_DIMS, MISSING_VALUE};
#[cfg(feature = "netcdf")]
use crate::io::{DimExtent, GridFile, GridIoError};

/// How instantaneous values within one output interval reduce to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggMethod {
    /// Unweighted mean over the interval
    #[default]
    Avg,
    /// Value at the start of the interval
    Beg,
    /// Value at the end of the interval
    End,
    /// Largest value in the interval
    Max,
    /// Smallest value in the interval
    Min,
    /// Sum over the interval
    Sum,
}

impl AggMethod {
    /// Reduce the values of one interval to a single record value.
    ///
    /// An empty interval yields the missing sentinel.
    pub fn reduce(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return MISSING_VALUE;
        }
        match self {
            Self::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Self::Beg => values[0],
            Self::End => values[values.len() - 1],
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Sum => values.iter().sum(),
        }
    }
}

/// Error type for variable registration.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Error from the file layer
    #[cfg(feature = "netcdf")]
    #[error(transparent)]
    Io(#[from] GridIoError),

    /// Variable declares more dimensions than a record can hold
    #[error("variable '{var}' has {got} dimensions, limit is {limit}")]
    TooManyDimensions { var: String, got: usize, limit: usize },

    /// Variable uses a dimension the file does not declare
    #[error("variable '{var}' uses dimension '{dim}' not declared in the file")]
    UndeclaredDimension { var: String, dim: &'static str },
}

/// Description of one history variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    /// Variable name in the file
    pub name: String,
    /// CF units string
    pub units: String,
    /// Human-readable description
    pub long_name: String,
    /// Dimensions in declaration order
    pub dims: Vec<DimKind>,
    /// On-disk storage type
    pub storage: StorageKind,
    /// Interval aggregation
    pub agg: AggMethod,
    /// Scale factor applied to model values before writing
    pub mult: f64,
    /// Whether the variable is selected for output
    pub write: bool,
}

impl VarSpec {
    /// Spec with default aggregation (mean), unit scale, and output off.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        dims: &[DimKind],
        storage: StorageKind,
    ) -> Self {
        let name = name.into();
        Self {
            long_name: name.clone(),
            name,
            units: units.into(),
            dims: dims.to_vec(),
            storage,
            agg: AggMethod::default(),
            mult: 1.0,
            write: false,
        }
    }

    /// Set the human-readable description.
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = long_name.into();
        self
    }

    /// Set the interval aggregation.
    pub fn with_agg(mut self, agg: AggMethod) -> Self {
        self.agg = agg;
        self
    }

    /// Set the scale factor.
    pub fn with_mult(mut self, mult: f64) -> Self {
        self.mult = mult;
        self
    }

    /// Set the on-disk storage type.
    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    /// Select or deselect the variable for output.
    pub fn with_write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Define the variable in an open file and resolve its dimensions.
    ///
    /// Every dimension the spec names must be declared in the file; the
    /// record dimension resolves to a per-write count of one.
    #[cfg(feature = "netcdf")]
    pub fn register(&self, file: &mut GridFile) -> Result<RegisteredVar, SchemaError> {
        let mut dims = Vec::with_capacity(self.dims.len());
        for &kind in &self.dims {
            let count = match file.declared_extent(kind) {
                DimExtent::Unused => {
                    return Err(SchemaError::UndeclaredDimension {
                        var: self.name.clone(),
                        dim: kind.name(),
                    })
                }
                DimExtent::Fixed(len) => len,
                DimExtent::Unlimited => 1,
            };
            dims.push((kind, count));
        }
        let var = RegisteredVar::new(&self.name, &dims, self.storage, self.agg, self.mult)?;
        file.define_variable(&self.name, &self.dims, self.storage, &self.units, &self.long_name)?;
        Ok(var)
    }
}

/// A variable bound to a file schema, with resolved dimension counts.
///
/// Dimension slots are fixed capacity; slots at `ndims` and beyond are
/// unused.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredVar {
    /// Variable name in the file
    pub name: String,
    /// Dimension kinds in declaration order
    pub dims: [Option<DimKind>; MAX_VAR_DIMS],
    /// Per-write count along each dimension
    pub counts: [usize; MAX_VAR_DIMS],
    /// Dimensions in use
    pub ndims: usize,
    /// On-disk storage type
    pub storage: StorageKind,
    /// Interval aggregation
    pub agg: AggMethod,
    /// Scale factor applied to model values before writing
    pub mult: f64,
}

impl RegisteredVar {
    /// Bind a name to resolved `(dimension, count)` pairs.
    pub fn new(
        name: impl Into<String>,
        dims: &[(DimKind, usize)],
        storage: StorageKind,
        agg: AggMethod,
        mult: f64,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if dims.len() > MAX_VAR_DIMS {
            return Err(SchemaError::TooManyDimensions {
                var: name,
                got: dims.len(),
                limit: MAX_VAR_DIMS,
            });
        }
        let mut slots = [None; MAX_VAR_DIMS];
        let mut counts = [0; MAX_VAR_DIMS];
        for (i, &(kind, count)) in dims.iter().enumerate() {
            slots[i] = Some(kind);
            counts[i] = count;
        }
        Ok(Self {
            name,
            dims: slots,
            counts,
            ndims: dims.len(),
            storage,
            agg,
            mult,
        })
    }

    /// Dimensions in use, in declaration order.
    pub fn used_dims(&self) -> impl Iterator<Item = (DimKind, usize)> + '_ {
        self.dims[..self.ndims]
            .iter()
            .zip(&self.counts[..self.ndims])
            .filter_map(|(kind, &count)| kind.map(|kind| (kind, count)))
    }

    /// Whether the variable carries the record dimension.
    pub fn has_time(&self) -> bool {
        self.used_dims().any(|(kind, _)| kind == DimKind::Time)
    }

    /// Whether the variable spans the spatial grid.
    pub fn is_cell_field(&self) -> bool {
        let mut nj = false;
        let mut ni = false;
        for (kind, _) in self.used_dims() {
            nj |= kind == DimKind::Nj;
            ni |= kind == DimKind::Ni;
        }
        nj && ni
    }

    /// Number of sub-entity slabs per record (product of non-record,
    /// non-spatial dimension counts).
    pub fn sub_count(&self) -> usize {
        self.used_dims()
            .filter(|&(kind, _)| !matches!(kind, DimKind::Time | DimKind::Nj | DimKind::Ni))
            .map(|(_, count)| count)
            .product()
    }

    /// Start/count window for one record and one sub-entity slab.
    ///
    /// The record dimension gets `(time_index, 1)`, spatial dimensions the
    /// full grid, and sub-entity dimensions the mixed-radix digits of
    /// `sub` with the last such dimension varying fastest.
    pub fn block_window(
        &self,
        time_index: usize,
        sub: usize,
        n_nx: usize,
        n_ny: usize,
    ) -> (Vec<usize>, Vec<usize>) {
        debug_assert!(sub < self.sub_count().max(1));

        let mut start = vec![0; self.ndims];
        let mut count = vec![1; self.ndims];
        let mut rem = sub;
        for i in (0..self.ndims).rev() {
            let kind = match self.dims[i] {
                Some(kind) => kind,
                None => continue,
            };
            match kind {
                DimKind::Time => start[i] = time_index,
                DimKind::Nj => count[i] = n_ny,
                DimKind::Ni => count[i] = n_nx,
                _ => {
                    let len = self.counts[i];
                    start[i] = rem % len;
                    rem /= len;
                }
            }
        }
        (start, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_methods() {
        let values = [2.0, 8.0, 4.0, 6.0];
        assert_eq!(AggMethod::Avg.reduce(&values), 5.0);
        assert_eq!(AggMethod::Beg.reduce(&values), 2.0);
        assert_eq!(AggMethod::End.reduce(&values), 6.0);
        assert_eq!(AggMethod::Max.reduce(&values), 8.0);
        assert_eq!(AggMethod::Min.reduce(&values), 2.0);
        assert_eq!(AggMethod::Sum.reduce(&values), 20.0);
        assert_eq!(AggMethod::Avg.reduce(&[]), MISSING_VALUE);
    }

    #[test]
    fn test_spec_builders() {
        let spec = VarSpec::new(
            "OUT_PREC",
            "mm",
            &[DimKind::Time, DimKind::Nj, DimKind::Ni],
            StorageKind::Float,
        )
        .with_long_name("precipitation")
        .with_agg(AggMethod::Sum)
        .with_mult(86400.0)
        .with_write(true);

        assert_eq!(spec.name, "OUT_PREC");
        assert_eq!(spec.long_name, "precipitation");
        assert_eq!(spec.agg, AggMethod::Sum);
        assert_eq!(spec.mult, 86400.0);
        assert!(spec.write);
    }

    #[test]
    fn test_registered_var_layout() {
        let var = RegisteredVar::new(
            "OUT_SOIL_MOIST",
            &[
                (DimKind::Time, 1),
                (DimKind::Layer, 3),
                (DimKind::Nj, 4),
                (DimKind::Ni, 5),
            ],
            StorageKind::Float,
            AggMethod::End,
            1.0,
        )
        .unwrap();

        assert_eq!(var.ndims, 4);
        assert!(var.has_time());
        assert!(var.is_cell_field());
        assert_eq!(var.sub_count(), 3);
        assert_eq!(var.dims[4], None);

        let (start, count) = var.block_window(7, 2, 5, 4);
        assert_eq!(start, vec![7, 2, 0, 0]);
        assert_eq!(count, vec![1, 1, 4, 5]);
    }

    #[test]
    fn test_block_window_mixed_radix() {
        let var = RegisteredVar::new(
            "layered_bands",
            &[
                (DimKind::Time, 1),
                (DimKind::Band, 2),
                (DimKind::Layer, 3),
                (DimKind::Nj, 2),
                (DimKind::Ni, 2),
            ],
            StorageKind::Double,
            AggMethod::Avg,
            1.0,
        )
        .unwrap();

        assert_eq!(var.sub_count(), 6);
        // Slab 4 decomposes into band 1, layer 1.
        let (start, count) = var.block_window(0, 4, 2, 2);
        assert_eq!(start, vec![0, 1, 1, 0, 0]);
        assert_eq!(count, vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_scalar_record_variable() {
        let var = RegisteredVar::new(
            "time",
            &[(DimKind::Time, 1)],
            StorageKind::Double,
            AggMethod::End,
            1.0,
        )
        .unwrap();
        assert!(var.has_time());
        assert!(!var.is_cell_field());
        assert_eq!(var.sub_count(), 1);
        assert_eq!(var.block_window(3, 0, 9, 9), (vec![3], vec![1]));
    }

    #[test]
    fn test_too_many_dimensions() {
        let dims: Vec<(DimKind, usize)> = std::iter::repeat((DimKind::Band, 1))
            .take(MAX_VAR_DIMS + 1)
            .collect();
        assert!(matches!(
            RegisteredVar::new("over", &dims, StorageKind::Float, AggMethod::Avg, 1.0),
            Err(SchemaError::TooManyDimensions { got: 11, limit: 10, .. })
        ));
    }
}
