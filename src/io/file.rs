//! Output file handles.
//!
//! A [`GridFile`] owns the single writable handle for one file on disk. It
//! starts closed, is opened once with a declared dimension set, accepts
//! block writes while open, and closes idempotently. Opening an already
//! open handle is an error; the file system resource is never shared.

use std::path::{Path, PathBuf};

use chrono::Utc;
use log::debug;

use super::dimensions::{DimExtent, DimKind, FileDimensions, StorageKind};
use super::fill::{is_missing_f64, is_missing_i32, FillValues};
use super::stream::{block_extents, check_window, GridIoError};

/// Writable handle for one gridded output file.
pub struct GridFile {
    path: PathBuf,
    file: Option<netcdf::FileMut>,
    dims: FileDimensions,
    fill: FillValues,
}

impl GridFile {
    /// Create a closed handle for the given path. Nothing touches the file
    /// system until [`open_for_write`](Self::open_for_write).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            dims: FileDimensions::new(),
            fill: FillValues::default(),
        }
    }

    /// Set the fill values written in place of missing data.
    pub fn with_fill_values(mut self, fill: FillValues) -> Self {
        self.fill = fill;
        self
    }

    /// Path this handle writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the handle currently holds the open file.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Fill values used by this handle.
    #[inline]
    pub fn fill_values(&self) -> FillValues {
        self.fill
    }

    /// Extent the open file declares for a dimension kind.
    #[inline]
    pub fn declared_extent(&self, kind: DimKind) -> DimExtent {
        self.dims.extent(kind)
    }

    /// Create the file and declare its dimensions.
    ///
    /// Fails with `DoubleOpen` if the handle is already open. An existing
    /// file at the path is truncated.
    pub fn open_for_write(&mut self, dims: &FileDimensions) -> Result<(), GridIoError> {
        if self.file.is_some() {
            return Err(GridIoError::DoubleOpen {
                file: self.path.display().to_string(),
            });
        }

        let mut file = netcdf::create(&self.path)?;

        for (kind, extent) in dims.iter_used() {
            match extent {
                DimExtent::Fixed(len) => {
                    file.add_dimension(kind.name(), len)?;
                }
                DimExtent::Unlimited => {
                    file.add_unlimited_dimension(kind.name())?;
                }
                DimExtent::Unused => {}
            }
        }

        file.add_attribute("Conventions", "CF-1.8")?;
        file.add_attribute("source", "hydrogrid")?;
        let now = Utc::now();
        file.add_attribute(
            "history",
            format!(
                "{}: Created by hydrogrid",
                now.format("%Y-%m-%d %H:%M:%S UTC")
            )
            .as_str(),
        )?;

        self.dims = dims.clone();
        self.file = Some(file);
        debug!("opened {} for writing", self.path.display());
        Ok(())
    }

    /// Close the handle. Safe to call on a closed handle.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            // Dropping the inner file flushes and releases it.
            drop(file);
            debug!("closed {}", self.path.display());
        }
    }

    /// Define a variable over declared dimensions, with standard attributes.
    ///
    /// The `_FillValue` attribute matches the storage type's fill from this
    /// handle's [`FillValues`].
    pub fn define_variable(
        &mut self,
        name: &str,
        dims: &[DimKind],
        storage: StorageKind,
        units: &str,
        long_name: &str,
    ) -> Result<(), GridIoError> {
        let path = self.path.display().to_string();
        let fill = self.fill;
        let file = self
            .file
            .as_mut()
            .ok_or(GridIoError::NotOpen { file: path })?;

        let dim_names: Vec<&str> = dims.iter().map(|d| d.name()).collect();
        match storage {
            StorageKind::Char => {
                let mut var = file.add_variable::<i8>(name, &dim_names)?;
                var.put_attribute("units", units)?;
                var.put_attribute("long_name", long_name)?;
                var.put_attribute("_FillValue", fill.char_fill)?;
            }
            StorageKind::Int => {
                let mut var = file.add_variable::<i32>(name, &dim_names)?;
                var.put_attribute("units", units)?;
                var.put_attribute("long_name", long_name)?;
                var.put_attribute("_FillValue", fill.int_fill)?;
            }
            StorageKind::Float => {
                let mut var = file.add_variable::<f32>(name, &dim_names)?;
                var.put_attribute("units", units)?;
                var.put_attribute("long_name", long_name)?;
                var.put_attribute("_FillValue", fill.float_fill)?;
            }
            StorageKind::Double => {
                let mut var = file.add_variable::<f64>(name, &dim_names)?;
                var.put_attribute("units", units)?;
                var.put_attribute("long_name", long_name)?;
                var.put_attribute("_FillValue", fill.double_fill)?;
            }
        }
        Ok(())
    }

    /// Write one block of double-precision values.
    ///
    /// Values carrying the missing sentinel (or any non-finite value) are
    /// replaced by the handle's double fill before the transfer. The NetCDF
    /// layer narrows to the variable's declared storage type, so one entry
    /// point serves float and double variables alike.
    pub fn write_block_f64(
        &mut self,
        name: &str,
        start: &[usize],
        count: &[usize],
        values: &[f64],
    ) -> Result<(), GridIoError> {
        let path = self.path.display().to_string();
        let fill = self.fill.double_fill;
        let file = self
            .file
            .as_mut()
            .ok_or(GridIoError::NotOpen { file: path.clone() })?;

        let mut var = file
            .variable_mut(name)
            .ok_or_else(|| GridIoError::VariableNotFound {
                file: path.clone(),
                name: name.to_string(),
            })?;
        check_window(&path, name, &var, start, count, true)?;

        let expected: usize = count.iter().product();
        if values.len() != expected {
            return Err(GridIoError::Length {
                file: path,
                var: name.to_string(),
                expected,
                got: values.len(),
            });
        }

        let buf: Vec<f64> = values
            .iter()
            .map(|&v| if is_missing_f64(v) { fill } else { v })
            .collect();
        var.put_values(&buf, block_extents(start, count).as_slice())?;
        Ok(())
    }

    /// Write one block of integer values, substituting the integer fill for
    /// the missing sentinel.
    pub fn write_block_i32(
        &mut self,
        name: &str,
        start: &[usize],
        count: &[usize],
        values: &[i32],
    ) -> Result<(), GridIoError> {
        let path = self.path.display().to_string();
        let fill = self.fill.int_fill;
        let file = self
            .file
            .as_mut()
            .ok_or(GridIoError::NotOpen { file: path.clone() })?;

        let mut var = file
            .variable_mut(name)
            .ok_or_else(|| GridIoError::VariableNotFound {
                file: path.clone(),
                name: name.to_string(),
            })?;
        check_window(&path, name, &var, start, count, true)?;

        let expected: usize = count.iter().product();
        if values.len() != expected {
            return Err(GridIoError::Length {
                file: path,
                var: name.to_string(),
                expected,
                got: values.len(),
            });
        }

        let buf: Vec<i32> = values
            .iter()
            .map(|&v| if is_missing_i32(v) { fill } else { v })
            .collect();
        var.put_values(&buf, block_extents(start, count).as_slice())?;
        Ok(())
    }
}

impl std::fmt::Debug for GridFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridFile")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("fill", &self.fill)
            .finish()
    }
}
