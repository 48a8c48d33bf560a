//! Fill values and missing-data sentinels.
//!
//! Model code marks unavailable values with [`MISSING_VALUE`]; file storage
//! marks them with the NetCDF default fill value of the variable's storage
//! type. The write path substitutes one for the other, so neither sentinel
//! leaks into the wrong side.

/// Fill value for missing data (CF-conventions standard).
pub const FILL_VALUE_F64: f64 = 9.96920996838687e+36;
pub const FILL_VALUE_F32: f32 = 9.96921e+36;

/// NetCDF default fill for integer variables.
pub const FILL_VALUE_I32: i32 = -2147483647;

/// NetCDF default fill for byte variables.
pub const FILL_VALUE_I8: i8 = 0;

/// Sentinel the model uses for a value that was never produced.
pub const MISSING_VALUE: f64 = -99999.0;

/// Integer counterpart of [`MISSING_VALUE`].
pub const MISSING_VALUE_I32: i32 = -99999;

/// Check if a value is valid (not a fill value).
#[inline]
pub fn is_valid_f32(v: f32) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// Check if a value is valid (not a fill value).
#[inline]
pub fn is_valid_f64(v: f64) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// Check if a value carries the model's missing sentinel.
///
/// Non-finite values count as missing; the test never relies on NaN
/// equality.
#[inline]
pub fn is_missing_f64(v: f64) -> bool {
    !v.is_finite() || v == MISSING_VALUE
}

/// Check if a value carries the model's missing sentinel.
#[inline]
pub fn is_missing_f32(v: f32) -> bool {
    !v.is_finite() || v == MISSING_VALUE as f32
}

/// Check if an integer value carries the model's missing sentinel.
#[inline]
pub fn is_missing_i32(v: i32) -> bool {
    v == MISSING_VALUE_I32
}

/// Per-storage-type fill values attached to an output file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillValues {
    /// Fill for byte variables
    pub char_fill: i8,
    /// Fill for integer variables
    pub int_fill: i32,
    /// Fill for single-precision variables
    pub float_fill: f32,
    /// Fill for double-precision variables
    pub double_fill: f64,
}

impl Default for FillValues {
    fn default() -> Self {
        Self {
            char_fill: FILL_VALUE_I8,
            int_fill: FILL_VALUE_I32,
            float_fill: FILL_VALUE_F32,
            double_fill: FILL_VALUE_F64,
        }
    }
}

impl FillValues {
    /// NetCDF default fills for every storage type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the integer fill value.
    pub fn with_int_fill(mut self, fill: i32) -> Self {
        self.int_fill = fill;
        self
    }

    /// Set the single-precision fill value.
    pub fn with_float_fill(mut self, fill: f32) -> Self {
        self.float_fill = fill;
        self
    }

    /// Set the double-precision fill value.
    pub fn with_double_fill(mut self, fill: f64) -> Self {
        self.double_fill = fill;
        self
    }
}
