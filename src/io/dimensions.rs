//! Dimension vocabulary for gridded model output files.
//!
//! Every file this crate writes draws its dimensions from a fixed set of ten
//! kinds. A [`FileDimensions`] value picks which kinds a file declares and at
//! what extent; variables registered against the file may only use declared
//! kinds.

use crate::config::ModelConfig;

/// Maximum number of dimensions a registered variable may carry.
pub const MAX_VAR_DIMS: usize = 10;

/// The fixed set of dimensions a model file can declare.
///
/// Listed in canonical declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimKind {
    /// Snow elevation band
    Band,
    /// Freezing front
    Front,
    /// Frost sub-area
    Frost,
    /// Soil moisture layer
    Layer,
    /// Grid x axis
    Ni,
    /// Grid y axis
    Nj,
    /// Soil thermal node
    Node,
    /// Root zone
    RootZone,
    /// Output record axis
    Time,
    /// Vegetation class
    Veg,
}

impl DimKind {
    /// All kinds, in canonical declaration order.
    pub const ALL: [DimKind; 10] = [
        DimKind::Band,
        DimKind::Front,
        DimKind::Frost,
        DimKind::Layer,
        DimKind::Ni,
        DimKind::Nj,
        DimKind::Node,
        DimKind::RootZone,
        DimKind::Time,
        DimKind::Veg,
    ];

    /// Dimension name as written to file.
    pub fn name(&self) -> &'static str {
        match self {
            DimKind::Band => "snow_band",
            DimKind::Front => "front",
            DimKind::Frost => "frost_area",
            DimKind::Layer => "nlayer",
            DimKind::Ni => "ni",
            DimKind::Nj => "nj",
            DimKind::Node => "node",
            DimKind::RootZone => "root_zone",
            DimKind::Time => "time",
            DimKind::Veg => "veg_class",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// On-file storage type of an output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Byte
    Char,
    /// 32-bit integer
    Int,
    /// Single precision
    Float,
    /// Double precision
    Double,
}

/// Declared extent of one dimension in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimExtent {
    /// The file does not declare this dimension
    #[default]
    Unused,
    /// Fixed length
    Fixed(usize),
    /// Record dimension, grows as records are written
    Unlimited,
}

impl DimExtent {
    /// Fixed extent; zero means the dimension is absent.
    pub fn fixed(len: usize) -> Self {
        if len == 0 {
            DimExtent::Unused
        } else {
            DimExtent::Fixed(len)
        }
    }

    /// Whether the file declares this dimension at all.
    #[inline]
    pub fn is_used(&self) -> bool {
        !matches!(self, DimExtent::Unused)
    }
}

/// The set of dimensions declared when a file is opened.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileDimensions {
    extents: [DimExtent; 10],
}

impl FileDimensions {
    /// Start with no dimensions declared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare one dimension. `Fixed(0)` normalizes to `Unused`.
    pub fn with(mut self, kind: DimKind, extent: DimExtent) -> Self {
        self.set(kind, extent);
        self
    }

    /// Declare one dimension in place.
    pub fn set(&mut self, kind: DimKind, extent: DimExtent) {
        self.extents[kind.index()] = match extent {
            DimExtent::Fixed(n) => DimExtent::fixed(n),
            other => other,
        };
    }

    /// Declared extent of a dimension kind.
    #[inline]
    pub fn extent(&self, kind: DimKind) -> DimExtent {
        self.extents[kind.index()]
    }

    /// Iterate over the declared dimensions in canonical order.
    pub fn iter_used(&self) -> impl Iterator<Item = (DimKind, DimExtent)> + '_ {
        DimKind::ALL
            .iter()
            .map(|&kind| (kind, self.extent(kind)))
            .filter(|(_, extent)| extent.is_used())
    }

    /// Number of declared dimensions.
    pub fn n_used(&self) -> usize {
        self.iter_used().count()
    }

    /// Dimension set for a history (flux/state output) file.
    ///
    /// Time is the record dimension; per-layer and per-band axes are sized
    /// from the model configuration.
    pub fn history(config: &ModelConfig, n_nx: usize, n_ny: usize) -> Self {
        Self::new()
            .with(DimKind::Time, DimExtent::Unlimited)
            .with(DimKind::Layer, DimExtent::fixed(config.nlayer))
            .with(DimKind::Band, DimExtent::fixed(config.nband))
            .with(DimKind::Nj, DimExtent::fixed(n_ny))
            .with(DimKind::Ni, DimExtent::fixed(n_nx))
    }

    /// Dimension set for a model state snapshot file.
    ///
    /// State files carry no time axis; every per-cell axis the state needs
    /// is declared at its configured size.
    pub fn state(config: &ModelConfig, n_nx: usize, n_ny: usize) -> Self {
        Self::new()
            .with(DimKind::Veg, DimExtent::fixed(config.nveg_types))
            .with(DimKind::Band, DimExtent::fixed(config.nband))
            .with(DimKind::Layer, DimExtent::fixed(config.nlayer))
            .with(DimKind::Node, DimExtent::fixed(config.nnode))
            .with(DimKind::Frost, DimExtent::fixed(config.nfrost))
            .with(DimKind::RootZone, DimExtent::fixed(config.nroot))
            .with(DimKind::Nj, DimExtent::fixed(n_ny))
            .with(DimKind::Ni, DimExtent::fixed(n_nx))
    }
}
