//! Integration tests for the domain and gridded output workflow.
//!
//! Tests the full path from a domain file on disk through variable
//! registration to written records read back for verification.

#![cfg(feature = "netcdf")]

use hydrogrid::{
    dimension_len, read_block_f32, read_block_f64, read_block_i32, variable_shape,
    write_cell_field, write_cell_field_i32, DimKind, Domain, FileDimensions, GridFile,
    GridIoError, MaskVariables, ModelConfig, OutputCatalog, OutputRequest, PartitionPolicy,
    SchemaError, StorageKind, VarSpec, WriteError, FILL_VALUE_F32, FILL_VALUE_I32,
    MISSING_VALUE_I32,
};
use tempfile::TempDir;

/// Grid offsets of the active cells in the fixture mask, row-major.
const ACTIVE_OFFSETS: [usize; 8] = [0, 1, 3, 7, 8, 9, 10, 11];

/// Write a 3 x 4 domain fixture with mask, coordinates, fraction, and area.
fn write_domain_file(path: &std::path::Path) {
    #[rustfmt::skip]
    let mask = [
        1.0, 1.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 1.0, 1.0,
        1.0, 1.0, 1.0,
    ];
    #[rustfmt::skip]
    let frac = [
        0.5, 1.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 1.0, 1.0,
        1.0, 1.0, 1.0,
    ];

    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("nj", 4).unwrap();
    file.add_dimension("ni", 3).unwrap();

    let mut var = file.add_variable::<f64>("mask", &["nj", "ni"]).unwrap();
    var.put_values(&mask, ..).unwrap();
    let mut var = file.add_variable::<f64>("frac", &["nj", "ni"]).unwrap();
    var.put_values(&frac, ..).unwrap();
    let mut var = file.add_variable::<f64>("area", &["nj", "ni"]).unwrap();
    var.put_values(&[2.5e7; 12], ..).unwrap();
    let mut var = file.add_variable::<f64>("lon", &["ni"]).unwrap();
    var.put_values(&[10.0, 10.5, 11.0], ..).unwrap();
    let mut var = file.add_variable::<f64>("lat", &["nj"]).unwrap();
    var.put_values(&[60.0, 60.5, 61.0, 61.5], ..).unwrap();
}

fn fixture_domain(dir: &TempDir) -> Domain {
    let path = dir.path().join("domain.nc");
    write_domain_file(&path);
    Domain::from_mask_file(&path, &MaskVariables::default()).unwrap()
}

#[test]
fn test_domain_from_file() {
    let dir = TempDir::new().unwrap();
    let domain = fixture_domain(&dir);

    assert_eq!(domain.ncells_global, 8);
    assert_eq!((domain.n_nx, domain.n_ny), (3, 4));
    for (i, &offset) in ACTIVE_OFFSETS.iter().enumerate() {
        assert_eq!(domain.global_grid_offset(i), offset);
    }

    // The fourth active cell sits at (x 1, y 2) and picks up the 1-D axes.
    let cell = domain.find_global(3).unwrap();
    assert_eq!((cell.global_x_idx, cell.global_y_idx), (1, 2));
    assert_eq!(cell.longitude, 10.5);
    assert_eq!(cell.latitude, 61.0);
    assert_eq!(cell.area, 2.5e7);

    // The fraction variable overrides the mask value for cell 0.
    assert_eq!(domain.locations[0].frac, 0.5);
    assert_eq!(domain.summary().partial_cells, 1);
}

#[test]
fn test_history_workflow() {
    let dir = TempDir::new().unwrap();
    let domain = fixture_domain(&dir);
    let config = ModelConfig::default().with_layers(2);

    // Select two variables, one with a scale override.
    let catalog = OutputCatalog::defaults();
    let selected = catalog
        .select(&[
            OutputRequest::new("OUT_SOIL_MOIST"),
            OutputRequest::new("OUT_PREC").with_mult(0.5),
        ])
        .unwrap();
    assert_eq!(selected[0].name, "OUT_PREC");
    assert_eq!(selected[1].name, "OUT_SOIL_MOIST");

    let path = dir.path().join("history.nc");
    let mut file = GridFile::new(&path);
    let dims = FileDimensions::history(&config, domain.n_nx, domain.n_ny);
    file.open_for_write(&dims).unwrap();

    // Opening an already-open handle is an error; the handle stays usable.
    assert!(matches!(
        file.open_for_write(&dims),
        Err(GridIoError::DoubleOpen { .. })
    ));

    let prec = selected[0].register(&mut file).unwrap();
    let moist = selected[1].register(&mut file).unwrap();
    assert_eq!(moist.sub_count(), 2);

    // Two records for precipitation, one layered record for soil moisture.
    let record0: Vec<f64> = (0..8).map(f64::from).collect();
    let record1: Vec<f64> = (10..18).map(f64::from).collect();
    write_cell_field(&mut file, &prec, &domain, Some(0), &record0).unwrap();
    write_cell_field(&mut file, &prec, &domain, Some(1), &record1).unwrap();

    let mut layered: Vec<f64> = (0..8).map(f64::from).collect();
    layered.extend((0..8).map(|i| f64::from(i) + 100.0));
    write_cell_field(&mut file, &moist, &domain, Some(0), &layered).unwrap();

    file.close();
    file.close();
    assert!(!file.is_open());

    // The record dimension grew to two entries.
    assert_eq!(dimension_len(&path, "time").unwrap(), 2);
    assert_eq!(variable_shape(&path, "OUT_SOIL_MOIST").unwrap(), vec![2, 2, 4, 3]);

    // Record 1: scaled values at active offsets, fill elsewhere.
    let grid = read_block_f32(&path, "OUT_PREC", &[1, 0, 0], &[1, 4, 3]).unwrap();
    for (i, &offset) in ACTIVE_OFFSETS.iter().enumerate() {
        assert_eq!(grid[offset], (10 + i) as f32 * 0.5);
    }
    assert_eq!(grid[2], FILL_VALUE_F32);
    assert_eq!(grid[5], FILL_VALUE_F32);

    // Layer 1 of the layered variable holds the second slab.
    let layer1 = read_block_f32(&path, "OUT_SOIL_MOIST", &[0, 1, 0, 0], &[1, 1, 4, 3]).unwrap();
    assert_eq!(layer1[0], 100.0);
    assert_eq!(layer1[7], 103.0);
    assert_eq!(layer1[4], FILL_VALUE_F32);

    // Declared metadata survives the round trip.
    let check = netcdf::open(&path).unwrap();
    assert!(check.attribute("Conventions").is_some());
    assert!(check.attribute("history").is_some());
    let var = check.variable("OUT_PREC").unwrap();
    assert!(var.attribute("units").is_some());
    assert!(var.attribute("_FillValue").is_some());
}

#[test]
fn test_state_workflow() {
    let dir = TempDir::new().unwrap();
    let domain = fixture_domain(&dir);
    let config = ModelConfig::default().with_veg_types(3);

    let path = dir.path().join("state.nc");
    let mut file = GridFile::new(&path);
    let dims = FileDimensions::state(&config, domain.n_nx, domain.n_ny);
    file.open_for_write(&dims).unwrap();

    // State files declare no record dimension, so a record variable is
    // a schema mismatch.
    let catalog = OutputCatalog::defaults();
    let prec = catalog.find("OUT_PREC").unwrap();
    match prec.register(&mut file) {
        Err(SchemaError::UndeclaredDimension { dim, .. }) => assert_eq!(dim, "time"),
        other => panic!("expected undeclared dimension, got {other:?}"),
    }

    let moisture = VarSpec::new(
        "STATE_SOIL_MOISTURE",
        "mm",
        &[DimKind::Veg, DimKind::Band, DimKind::Layer, DimKind::Nj, DimKind::Ni],
        StorageKind::Double,
    )
    .register(&mut file)
    .unwrap();
    assert_eq!(moisture.sub_count(), 9);

    let snow_age = VarSpec::new(
        "STATE_SNOW_AGE",
        "time steps",
        &[DimKind::Veg, DimKind::Band, DimKind::Nj, DimKind::Ni],
        StorageKind::Int,
    )
    .register(&mut file)
    .unwrap();

    // Slab-major values tagged by slab and cell for readback checks.
    let values: Vec<f64> = (0..9)
        .flat_map(|s| (0..8).map(move |c| (s * 100 + c) as f64))
        .collect();
    write_cell_field(&mut file, &moisture, &domain, None, &values).unwrap();
    assert!(matches!(
        write_cell_field(&mut file, &moisture, &domain, Some(0), &values),
        Err(WriteError::UnexpectedTimeIndex { .. })
    ));

    let mut ages: Vec<i32> = (0..24).collect();
    ages[10] = MISSING_VALUE_I32;
    write_cell_field_i32(&mut file, &snow_age, &domain, None, &ages).unwrap();
    file.close();

    // Veg 1, layer 2 is slab 5 of the moisture variable.
    let slab = read_block_f64(&path, "STATE_SOIL_MOISTURE", &[1, 0, 2, 0, 0], &[1, 1, 1, 4, 3])
        .unwrap();
    assert_eq!(slab[0], 500.0);
    assert_eq!(slab[7], 503.0);

    // Missing integer input and inactive positions both become the int fill.
    let ages = read_block_i32(&path, "STATE_SNOW_AGE", &[1, 0, 0, 0], &[1, 1, 4, 3]).unwrap();
    assert_eq!(ages[0], 8);
    // Slab 1, cell 2 carried the missing sentinel; it sits at offset 3.
    assert_eq!(ages[3], FILL_VALUE_I32);
    assert_eq!(ages[2], FILL_VALUE_I32);
}

#[test]
fn test_partition_covers_domain() {
    let dir = TempDir::new().unwrap();
    let domain = fixture_domain(&dir);

    for policy in [
        PartitionPolicy::Contiguous { n_ranks: 3 },
        PartitionPolicy::RoundRobin { n_ranks: 3 },
    ] {
        let mut seen = vec![0usize; domain.ncells_global];
        for rank in 0..3 {
            let local = domain.local_subset(&policy, rank).unwrap();
            assert!(local.ncells_active <= local.ncells_global);
            for i in 0..local.ncells_active {
                assert_eq!(local.locations[i].local_cell_idx, i);
                seen[local.global_cell_index(i)] += 1;
            }
        }
        // Every cell is owned by exactly one rank.
        assert!(seen.iter().all(|&n| n == 1), "partition must cover each cell once");
    }
}
