//! Master list of supported history variables.
//!
//! [`OutputCatalog::defaults`] enumerates every variable the model can
//! write, each with its canonical units, dimensions, and aggregation.
//! User configuration names a subset, optionally overriding storage type
//! or scale factor; [`select`](OutputCatalog::select) resolves those
//! requests against the catalog.

use log::warn;
use thiserror::Error;

use crate::io::{DimKind, StorageKind};
use super::variable::{AggMethod, VarSpec};

/// Error type for output selection.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Requested variable is not in the catalog
    #[error("unknown output variable '{0}'")]
    UnknownVariable(String),
}

/// One user request for an output variable.
#[derive(Debug, Clone)]
pub struct OutputRequest {
    /// Catalog variable name
    pub name: String,
    /// Override the on-disk storage type
    pub storage: Option<StorageKind>,
    /// Override the scale factor
    pub mult: Option<f64>,
}

impl OutputRequest {
    /// Request a variable with its catalog defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: None,
            mult: None,
        }
    }

    /// Override the storage type.
    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Override the scale factor.
    pub fn with_mult(mut self, mult: f64) -> Self {
        self.mult = Some(mult);
        self
    }
}

fn cell(name: &str, units: &str, long_name: &str, agg: AggMethod) -> VarSpec {
    VarSpec::new(
        name,
        units,
        &[DimKind::Time, DimKind::Nj, DimKind::Ni],
        StorageKind::Float,
    )
    .with_long_name(long_name)
    .with_agg(agg)
}

fn layered(name: &str, units: &str, long_name: &str, agg: AggMethod) -> VarSpec {
    VarSpec::new(
        name,
        units,
        &[DimKind::Time, DimKind::Layer, DimKind::Nj, DimKind::Ni],
        StorageKind::Float,
    )
    .with_long_name(long_name)
    .with_agg(agg)
}

fn banded(name: &str, units: &str, long_name: &str, agg: AggMethod) -> VarSpec {
    VarSpec::new(
        name,
        units,
        &[DimKind::Time, DimKind::Band, DimKind::Nj, DimKind::Ni],
        StorageKind::Float,
    )
    .with_long_name(long_name)
    .with_agg(agg)
}

/// The full set of variables the model can write.
#[derive(Debug, Clone)]
pub struct OutputCatalog {
    specs: Vec<VarSpec>,
}

impl OutputCatalog {
    /// Build the catalog of supported variables.
    pub fn defaults() -> Self {
        use AggMethod::{Avg, End, Sum};
        let specs = vec![
            // Water balance terms accumulate over the output interval.
            cell("OUT_PREC", "mm", "incoming precipitation", Sum),
            cell("OUT_RAINF", "mm", "rainfall", Sum),
            cell("OUT_SNOWF", "mm", "snowfall", Sum),
            cell("OUT_EVAP", "mm", "total net evaporation", Sum),
            cell("OUT_RUNOFF", "mm", "surface runoff", Sum),
            cell("OUT_BASEFLOW", "mm", "baseflow out of the bottom layer", Sum),
            cell("OUT_SNOW_MELT", "mm", "snow melt", Sum),
            // Snow pack states report the end-of-interval value.
            cell("OUT_SWE", "mm", "snow water equivalent in snow pack", End),
            cell("OUT_SNOW_DEPTH", "cm", "depth of snow pack", End),
            cell("OUT_SNOW_COVER", "1", "fractional area of snow cover", Avg),
            banded("OUT_SWE_BAND", "mm", "snow water equivalent by elevation band", End),
            // Soil column states.
            layered("OUT_SOIL_MOIST", "mm", "soil total moisture content", End),
            layered("OUT_SOIL_ICE", "mm", "soil ice content", End),
            layered("OUT_SOIL_TEMP", "C", "soil temperature", Avg),
            // Near-surface conditions.
            cell("OUT_AIR_TEMP", "C", "air temperature", Avg),
            cell("OUT_SURF_TEMP", "C", "surface temperature", Avg),
            cell("OUT_ALBEDO", "1", "average surface albedo", Avg),
            cell("OUT_REL_HUMID", "%", "relative humidity", Avg),
            cell("OUT_WIND", "m/s", "near surface wind speed", Avg),
            // Energy balance terms.
            cell("OUT_SWNET", "W/m2", "net downward shortwave flux", Avg),
            cell("OUT_LWNET", "W/m2", "net downward longwave flux", Avg),
            cell("OUT_LATENT", "W/m2", "net upward latent heat flux", Avg),
            cell("OUT_SENSIBLE", "W/m2", "net upward sensible heat flux", Avg),
            cell("OUT_GRND_FLUX", "W/m2", "net heat flux into ground", Avg),
        ];
        Self { specs }
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Look up a catalog entry by name.
    pub fn find(&self, name: &str) -> Option<&VarSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Iterate over all catalog entries.
    pub fn iter(&self) -> impl Iterator<Item = &VarSpec> {
        self.specs.iter()
    }

    /// Resolve user requests into write-enabled variable specs.
    ///
    /// Any unknown name fails the whole selection. Duplicate requests for
    /// the same variable are collapsed, keeping the last. The result is in
    /// catalog order regardless of request order.
    pub fn select(&self, requests: &[OutputRequest]) -> Result<Vec<VarSpec>, CatalogError> {
        let mut chosen: Vec<Option<&OutputRequest>> = vec![None; self.specs.len()];
        for request in requests {
            let idx = self
                .specs
                .iter()
                .position(|spec| spec.name == request.name)
                .ok_or_else(|| CatalogError::UnknownVariable(request.name.clone()))?;
            if chosen[idx].is_some() {
                warn!("duplicate output request for '{}', keeping the last", request.name);
            }
            chosen[idx] = Some(request);
        }

        let mut selected = Vec::new();
        for (spec, request) in self.specs.iter().zip(&chosen) {
            let request = match request {
                Some(request) => request,
                None => continue,
            };
            let mut spec = spec.clone().with_write(true);
            if let Some(storage) = request.storage {
                spec = spec.with_storage(storage);
            }
            if let Some(mult) = request.mult {
                spec = spec.with_mult(mult);
            }
            selected.push(spec);
        }
        Ok(selected)
    }
}

impl Default for OutputCatalog {
    fn default() -> Self {
        Self::defaults()
    }
}
