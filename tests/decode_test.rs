//! GRIB2 decoding against a small pgrb2-shaped fixture.
//!
//! `tests/fixtures/gfs.t00z.pgrb2.0p25.f006` holds four simple-packed
//! messages on a 3x3 lat/lon grid (40..30°N, 170..190°E): HGT at 850 hPa,
//! PRMSL, TMP at 850 hPa and HGT at 500 hPa, in that order.

mod common;

use std::io::Cursor;
use std::path::PathBuf;

use common::test_data::anchor;
use pretty_assertions::assert_eq;
use synoptic::source::decode::decode_fields;
use synoptic::source::{LocalGribLoader, SourceLoader};
use synoptic::{Quantity, SynopticError};

const FIXTURE: &str = "gfs.t00z.pgrb2.0p25.f006";

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn fixture_bytes() -> Vec<u8> {
    std::fs::read(fixture_dir().join(FIXTURE)).unwrap()
}

/// Byte length of each GRIB2 message, read from the Section 0 total length.
fn message_lengths(bytes: &[u8]) -> Vec<usize> {
    let mut lengths = Vec::new();
    let mut pos = 0;
    while pos + 16 <= bytes.len() {
        assert_eq!(&bytes[pos..pos + 4], b"GRIB");
        let total = u64::from_be_bytes(bytes[pos + 8..pos + 16].try_into().unwrap()) as usize;
        lengths.push(total);
        pos += total;
    }
    lengths
}

#[test]
fn test_selects_the_three_products() {
    let fields = decode_fields(Cursor::new(fixture_bytes()), 180.0).unwrap();

    let expected_height: Vec<f64> = (0..9).map(|k| 5500.0 + 10.0 * k as f64).collect();
    let expected_temperature: Vec<f64> = (0..9).map(|k| 271.0 + k as f64).collect();
    let expected_mslp: Vec<f64> = (0..9).map(|k| 101000.0 + 100.0 * k as f64).collect();

    // HGT at 850 hPa comes first in the file and must not be taken for 500 hPa
    assert_eq!(fields.height_500.values, expected_height);
    assert_eq!(fields.temperature_850.values, expected_temperature);
    assert_eq!(fields.mslp.values, expected_mslp);

    assert_eq!(fields.height_500.unit, "gpm");
    assert_eq!(fields.temperature_850.unit, "K");
    assert_eq!(fields.mslp.unit, "Pa");
    for (quantity, field) in fields.iter() {
        assert_eq!(field.quantity, quantity);
    }
}

#[test]
fn test_grid_points_in_scan_order() {
    let fields = decode_fields(Cursor::new(fixture_bytes()), 180.0).unwrap();
    let field = &fields.temperature_850;

    assert_eq!(
        field.lats,
        vec![40.0, 40.0, 40.0, 35.0, 35.0, 35.0, 30.0, 30.0, 30.0]
    );
    assert_eq!(
        field.lons,
        vec![170.0, 180.0, 190.0, 170.0, 180.0, 190.0, 170.0, 180.0, 190.0]
    );
}

#[test]
fn test_longitudes_wrap_around_center() {
    let fields = decode_fields(Cursor::new(fixture_bytes()), 0.0).unwrap();
    assert_eq!(&fields.mslp.lons[..3], &[170.0, -180.0, -170.0]);

    let fields = decode_fields(Cursor::new(fixture_bytes()), 120.0).unwrap();
    assert_eq!(&fields.mslp.lons[..3], &[170.0, 180.0, 190.0]);
}

#[test]
fn test_missing_product_is_reported() {
    let bytes = fixture_bytes();
    let lengths = message_lengths(&bytes);
    assert_eq!(lengths.len(), 4);

    // Drop the trailing HGT 500 hPa message
    let truncated = bytes[..lengths[..3].iter().sum::<usize>()].to_vec();
    let err = decode_fields(Cursor::new(truncated), 180.0).unwrap_err();
    assert!(matches!(err, SynopticError::Grib { .. }));
    let message = err.to_string();
    assert!(message.contains("Missing fields"), "{}", message);
    assert!(message.contains(&Quantity::Height500.to_string()), "{}", message);
    assert!(!message.contains(&Quantity::Mslp.to_string()), "{}", message);
}

#[test]
fn test_local_loader_reads_fixture() {
    let loader = LocalGribLoader::new(
        fixture_dir(),
        "https://noaa-gfs-bdp-pds.s3.amazonaws.com/gfs.{date}/{hour}/atmos/gfs.t{hour}z.pgrb2.0p25.f{lead}",
        180.0,
    );
    assert_eq!(loader.path_for(anchor(), 6), fixture_dir().join(FIXTURE));

    let fields = loader.fetch(anchor(), 6).unwrap();
    assert_eq!(fields.height_500.len(), 9);
    assert_eq!(fields.height_500.values[4], 5540.0);

    // No f012 file next to the fixture
    assert!(matches!(
        loader.fetch(anchor(), 12),
        Err(SynopticError::Fetch { .. })
    ));
}
