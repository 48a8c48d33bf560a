//! Model-level configuration.

/// Structural settings that size the per-cell axes of model files.
///
/// These counts come from the run setup, not from any input file; they fix
/// the extents of the layer, band, node, frost, front, and root-zone
/// dimensions for every file the run writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Number of vegetation classes in the library
    pub nveg_types: usize,
    /// Number of soil moisture layers
    pub nlayer: usize,
    /// Number of soil thermal nodes
    pub nnode: usize,
    /// Number of snow elevation bands
    pub nband: usize,
    /// Number of frost sub-areas
    pub nfrost: usize,
    /// Number of freezing fronts tracked per layer
    pub nfront: usize,
    /// Number of root zones
    pub nroot: usize,
    /// Whether cells above the treeline get an extra bare band
    pub compute_treeline: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            nveg_types: 12,
            nlayer: 3,
            nnode: 3,
            nband: 1,
            nfrost: 1,
            nfront: 3,
            nroot: 3,
            compute_treeline: false,
        }
    }
}

impl ModelConfig {
    /// Create a configuration with default axis sizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of vegetation classes.
    pub fn with_veg_types(mut self, n: usize) -> Self {
        self.nveg_types = n;
        self
    }

    /// Set the number of soil moisture layers.
    pub fn with_layers(mut self, n: usize) -> Self {
        self.nlayer = n;
        self
    }

    /// Set the number of soil thermal nodes.
    pub fn with_nodes(mut self, n: usize) -> Self {
        self.nnode = n;
        self
    }

    /// Set the number of snow elevation bands.
    pub fn with_bands(mut self, n: usize) -> Self {
        self.nband = n;
        self
    }

    /// Set the number of frost sub-areas.
    pub fn with_frost_areas(mut self, n: usize) -> Self {
        self.nfrost = n;
        self
    }

    /// Set the number of root zones.
    pub fn with_root_zones(mut self, n: usize) -> Self {
        self.nroot = n;
        self
    }

    /// Enable the above-treeline band.
    pub fn with_treeline(mut self, enabled: bool) -> Self {
        self.compute_treeline = enabled;
        self
    }
}
