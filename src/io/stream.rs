//! Block transfer between gridded model files and memory.
//!
//! Read access is path-addressed: each call opens the file, pulls one
//! hyperslab of one variable, and closes again. Writes go through the
//! long-lived handle in [`crate::io::GridFile`] instead.

use std::ops::Range;
use std::path::Path;

use thiserror::Error;

/// Error type for gridded file I/O.
#[derive(Debug, Error)]
pub enum GridIoError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Variable missing from the file
    #[error("variable '{name}' not found in {file}")]
    VariableNotFound { file: String, name: String },

    /// Dimension missing from the file
    #[error("dimension '{name}' not found in {file}")]
    DimensionNotFound { file: String, name: String },

    /// start/count rank does not match the variable rank
    #[error("variable '{var}' in {file} has {expected} dimensions, window has {got}")]
    Rank {
        file: String,
        var: String,
        expected: usize,
        got: usize,
    },

    /// Window runs past the end of a dimension
    #[error(
        "window [{start}, {start}+{count}) exceeds dimension '{dim}' (size {size}) \
         of variable '{var}' in {file}"
    )]
    Shape {
        file: String,
        var: String,
        dim: String,
        start: usize,
        count: usize,
        size: usize,
    },

    /// Value buffer does not match the window size
    #[error("variable '{var}' in {file}: window holds {expected} values, buffer has {got}")]
    Length {
        file: String,
        var: String,
        expected: usize,
        got: usize,
    },

    /// Write on a handle that is not open
    #[error("file {file} is not open")]
    NotOpen { file: String },

    /// Open on a handle that is already open
    #[error("file {file} is already open")]
    DoubleOpen { file: String },
}

/// Build hyperslab extents from start/count pairs.
pub(crate) fn block_extents(start: &[usize], count: &[usize]) -> Vec<Range<usize>> {
    start
        .iter()
        .zip(count.iter())
        .map(|(&s, &c)| s..s + c)
        .collect()
}

/// Check a start/count window against a variable's dimensions.
///
/// The record dimension is exempt when `allow_record_growth` is set (writes
/// extend it); reads check against its current length like any other axis.
pub(crate) fn check_window(
    file: &str,
    name: &str,
    var: &netcdf::Variable,
    start: &[usize],
    count: &[usize],
    allow_record_growth: bool,
) -> Result<(), GridIoError> {
    let dims = var.dimensions();
    if start.len() != dims.len() || count.len() != dims.len() {
        return Err(GridIoError::Rank {
            file: file.to_string(),
            var: name.to_string(),
            expected: dims.len(),
            got: start.len().max(count.len()),
        });
    }
    for (i, dim) in dims.iter().enumerate() {
        if allow_record_growth && dim.is_unlimited() {
            continue;
        }
        if start[i] + count[i] > dim.len() {
            return Err(GridIoError::Shape {
                file: file.to_string(),
                var: name.to_string(),
                dim: dim.name(),
                start: start[i],
                count: count[i],
                size: dim.len(),
            });
        }
    }
    Ok(())
}

/// Length of a named dimension.
pub fn dimension_len(path: impl AsRef<Path>, name: &str) -> Result<usize, GridIoError> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;
    let dim = file
        .dimension(name)
        .ok_or_else(|| GridIoError::DimensionNotFound {
            file: path.display().to_string(),
            name: name.to_string(),
        })?;
    Ok(dim.len())
}

/// Whether the file contains a variable with this name.
pub fn has_variable(path: impl AsRef<Path>, name: &str) -> Result<bool, GridIoError> {
    let file = netcdf::open(path.as_ref())?;
    Ok(file.variable(name).is_some())
}

/// Shape of a named variable, outermost dimension first.
pub fn variable_shape(path: impl AsRef<Path>, name: &str) -> Result<Vec<usize>, GridIoError> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;
    let var = file
        .variable(name)
        .ok_or_else(|| GridIoError::VariableNotFound {
            file: path.display().to_string(),
            name: name.to_string(),
        })?;
    Ok(var.dimensions().iter().map(|d| d.len()).collect())
}

/// Read one block of a double-precision variable.
pub fn read_block_f64(
    path: impl AsRef<Path>,
    name: &str,
    start: &[usize],
    count: &[usize],
) -> Result<Vec<f64>, GridIoError> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;
    let var = file
        .variable(name)
        .ok_or_else(|| GridIoError::VariableNotFound {
            file: path.display().to_string(),
            name: name.to_string(),
        })?;
    check_window(&path.display().to_string(), name, &var, start, count, false)?;
    let data = var.get_values::<f64, _>(block_extents(start, count).as_slice())?;
    Ok(data)
}

/// Read one block of a single-precision variable.
pub fn read_block_f32(
    path: impl AsRef<Path>,
    name: &str,
    start: &[usize],
    count: &[usize],
) -> Result<Vec<f32>, GridIoError> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;
    let var = file
        .variable(name)
        .ok_or_else(|| GridIoError::VariableNotFound {
            file: path.display().to_string(),
            name: name.to_string(),
        })?;
    check_window(&path.display().to_string(), name, &var, start, count, false)?;
    let data = var.get_values::<f32, _>(block_extents(start, count).as_slice())?;
    Ok(data)
}

/// Read one block of an integer variable.
pub fn read_block_i32(
    path: impl AsRef<Path>,
    name: &str,
    start: &[usize],
    count: &[usize],
) -> Result<Vec<i32>, GridIoError> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;
    let var = file
        .variable(name)
        .ok_or_else(|| GridIoError::VariableNotFound {
            file: path.display().to_string(),
            name: name.to_string(),
        })?;
    check_window(&path.display().to_string(), name, &var, start, count, false)?;
    let data = var.get_values::<i32, _>(block_extents(start, count).as_slice())?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_fixture(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("nj", 2).unwrap();
        file.add_dimension("ni", 3).unwrap();
        let mut var = file.add_variable::<f64>("field", &["nj", "ni"]).unwrap();
        var.put_values(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], ..).unwrap();
        let mut ivar = file.add_variable::<i32>("codes", &["ni"]).unwrap();
        ivar.put_values(&[7, 8, 9], ..).unwrap();
    }

    #[test]
    fn test_read_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.nc");
        write_fixture(&path);

        let full = read_block_f64(&path, "field", &[0, 0], &[2, 3]).unwrap();
        assert_eq!(full, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let row = read_block_f64(&path, "field", &[1, 0], &[1, 3]).unwrap();
        assert_eq!(row, vec![3.0, 4.0, 5.0]);

        let codes = read_block_i32(&path, "codes", &[1], &[2]).unwrap();
        assert_eq!(codes, vec![8, 9]);
    }

    #[test]
    fn test_read_past_end_is_shape_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.nc");
        write_fixture(&path);

        let err = read_block_f64(&path, "field", &[0, 1], &[2, 3]).unwrap_err();
        match err {
            GridIoError::Shape { dim, start, count, size, .. } => {
                assert_eq!(dim, "ni");
                assert_eq!((start, count, size), (1, 3, 3));
            }
            other => panic!("expected Shape error, got {other}"),
        }
    }

    #[test]
    fn test_missing_variable_and_dimension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.nc");
        write_fixture(&path);

        assert!(matches!(
            read_block_f64(&path, "nope", &[0], &[1]),
            Err(GridIoError::VariableNotFound { .. })
        ));
        assert!(matches!(
            dimension_len(&path, "nope"),
            Err(GridIoError::DimensionNotFound { .. })
        ));
        assert_eq!(dimension_len(&path, "ni").unwrap(), 3);
        assert!(has_variable(&path, "field").unwrap());
        assert!(!has_variable(&path, "nope").unwrap());
        assert_eq!(variable_shape(&path, "field").unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_rank_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.nc");
        write_fixture(&path);

        assert!(matches!(
            read_block_f64(&path, "field", &[0], &[2]),
            Err(GridIoError::Rank { expected: 2, got: 1, .. })
        ));
    }
}
