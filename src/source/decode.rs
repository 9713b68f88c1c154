//! GRIB2 decoding of the three GFS fields.

use std::io::{Read, Seek};

use grib::Grib2SubmessageDecoder;
use tracing::debug;

use crate::error::{Result, SynopticError};
use crate::field::{normalize_longitude, Panels, Quantity, ScatteredField};

/// GRIB2 fixed surface type for isobaric levels (Pa)
pub const SURFACE_ISOBARIC: u8 = 100;
/// GRIB2 fixed surface type for mean sea level
pub const SURFACE_MEAN_SEA_LEVEL: u8 = 101;

/// Identifies one meteorological parameter in a GRIB2 file (discipline 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSelector {
    pub category: u8,
    pub number: u8,
    pub surface_type: u8,
    /// Required surface value, e.g. 50000 Pa; None matches any
    pub level: Option<f64>,
    /// Unit of the raw values
    pub unit: &'static str,
}

impl FieldSelector {
    pub fn matches(&self, category: u8, number: u8, surface_type: u8, level: f64) -> bool {
        self.category == category
            && self.number == number
            && self.surface_type == surface_type
            && self.level.map_or(true, |l| (l - level).abs() < 0.5)
    }
}

/// Parameters of the GFS pgrb2 products used for each panel.
pub fn gfs_selectors() -> Panels<FieldSelector> {
    Panels::new(
        // HGT at 500 hPa
        FieldSelector {
            category: 3,
            number: 5,
            surface_type: SURFACE_ISOBARIC,
            level: Some(50000.0),
            unit: "gpm",
        },
        // TMP at 850 hPa
        FieldSelector {
            category: 0,
            number: 0,
            surface_type: SURFACE_ISOBARIC,
            level: Some(85000.0),
            unit: "K",
        },
        // PRMSL
        FieldSelector {
            category: 3,
            number: 1,
            surface_type: SURFACE_MEAN_SEA_LEVEL,
            level: None,
            unit: "Pa",
        },
    )
}

/// Decode the three fields from a GRIB2 stream.
///
/// Longitudes are wrapped into `[center_lon - 180, center_lon + 180)`.
pub fn decode_fields<R: Read + Seek>(reader: R, center_lon: f64) -> Result<Panels<ScatteredField>> {
    let grib2 = grib::from_reader(reader).map_err(grib_error)?;
    let selectors = gfs_selectors();
    let mut found: Panels<Option<ScatteredField>> = Panels::default();

    for (index, submessage) in grib2.iter() {
        if submessage.indicator().discipline != 0 {
            continue;
        }
        let prod_def = submessage.prod_def();
        let (Some(category), Some(number)) =
            (prod_def.parameter_category(), prod_def.parameter_number())
        else {
            continue;
        };
        let Some((surface, _)) = prod_def.fixed_surfaces() else {
            continue;
        };
        let level = surface.value();
        let Some(quantity) = Quantity::ALL.into_iter().find(|q| {
            found.get(*q).is_none()
                && selectors
                    .get(*q)
                    .matches(category, number, surface.surface_type, level)
        }) else {
            continue;
        };

        debug!(
            quantity = %quantity,
            message = ?index,
            category = category,
            number = number,
            level = level,
            "Decoding GRIB2 submessage"
        );

        let latlons: Vec<(f32, f32)> = submessage.latlons().map_err(grib_error)?.collect();
        let decoder = Grib2SubmessageDecoder::from(submessage).map_err(grib_error)?;
        let raw: Vec<f32> = decoder.dispatch().map_err(grib_error)?.collect();

        if latlons.len() != raw.len() {
            return Err(SynopticError::Grib {
                message: format!(
                    "{}: {} grid points but {} values",
                    quantity,
                    latlons.len(),
                    raw.len()
                ),
            });
        }

        let lons = latlons
            .iter()
            .map(|&(_, lon)| normalize_longitude(lon as f64, center_lon))
            .collect();
        let lats = latlons.iter().map(|&(lat, _)| lat as f64).collect();
        let values = raw.into_iter().map(f64::from).collect();

        let field = ScatteredField::new(quantity, selectors.get(quantity).unit, lons, lats, values)?;
        *found.get_mut(quantity) = Some(field);

        if found.iter().all(|(_, f)| f.is_some()) {
            break;
        }
    }

    found.transpose().map_err(|missing| SynopticError::Grib {
        message: format!(
            "Missing fields: {}",
            missing
                .iter()
                .map(|q| q.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}

fn grib_error(e: impl std::fmt::Display) -> SynopticError {
    SynopticError::Grib {
        message: e.to_string(),
    }
}
