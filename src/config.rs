//! Configuration management for synoptic.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SynopticError};
use crate::field::{Panels, UnitConversion};
use crate::grid::BoundingBox;

/// Command-line arguments for synoptic
#[derive(Parser, Debug)]
#[command(name = "synoptic")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to JSON configuration file
    #[arg(short, long, env = "SYNOPTIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Anchor model run (RFC 3339); defaults to the latest published run
    #[arg(long, env = "SYNOPTIC_ANCHOR")]
    pub anchor: Option<DateTime<Utc>>,

    /// Comma-separated hour offsets relative to the anchor run
    #[arg(long, env = "SYNOPTIC_OFFSETS", value_delimiter = ',', allow_hyphen_values = true)]
    pub offsets: Option<Vec<i32>>,

    /// Minimum number of frames required to produce output
    #[arg(long, env = "SYNOPTIC_MIN_FRAMES")]
    pub min_frames: Option<usize>,

    /// Read GRIB2 files from this directory instead of downloading
    #[arg(long, env = "SYNOPTIC_LOCAL_DIR")]
    pub local_dir: Option<PathBuf>,

    /// Output path (JSON file, or directory for PNG frames)
    #[arg(short, long, env = "SYNOPTIC_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format (json or png)
    #[arg(short, long, env = "SYNOPTIC_FORMAT")]
    pub format: Option<String>,

    /// Number of offsets processed concurrently (1 = sequential)
    #[arg(short, long, env = "SYNOPTIC_WORKERS")]
    pub workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SYNOPTIC_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Target grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_bbox")]
    pub bbox: BoundingBox,

    /// Number of longitude points, edges included
    #[serde(default = "default_nx")]
    pub nx: usize,

    /// Number of latitude points, edges included
    #[serde(default = "default_ny")]
    pub ny: usize,
}

/// Anchor run selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Model cycle length in hours; must divide 24
    #[serde(default = "default_cycle_hours")]
    pub cycle_hours: u32,

    /// Assumed publication delay after a run's nominal time
    #[serde(default = "default_latency_hours")]
    pub latency_hours: u32,

    /// Explicit anchor run, overriding the latency heuristic
    #[serde(default)]
    pub fixed: Option<DateTime<Utc>>,
}

/// Display label configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default = "default_zone_name")]
    pub zone_name: String,

    /// Monday first
    #[serde(default = "default_weekday_names")]
    pub weekday_names: Vec<String>,
}

/// Source data retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL template with `{date}`, `{hour}` and `{lead}` placeholders
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Read files from a local directory instead; the file name is the
    /// last path segment of the expanded URL template
    #[serde(default)]
    pub local_dir: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra degrees around the grid kept when cropping source samples
    #[serde(default = "default_sample_margin")]
    pub sample_margin_deg: f64,
}

/// Interpolation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegridConfig {
    /// "cubic" or "linear"
    #[serde(default = "default_interpolation")]
    pub method: String,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// Fixed color scale for one quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
    /// Contour interval
    pub step: f64,
    pub colormap: String,
    /// Value mapped to the colormap's center, if not the midpoint of min..max
    #[serde(default)]
    pub midpoint: Option<f64>,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// "json" or "png"
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Pixels per grid cell for PNG output
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: u32,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,

    /// Hour offsets relative to the anchor run, strictly increasing
    #[serde(default = "default_offsets")]
    pub offsets: Vec<i32>,

    /// Minimum number of successful frames
    #[serde(default = "default_min_frames")]
    pub min_frames: usize,

    #[serde(default)]
    pub anchor: AnchorConfig,

    #[serde(default)]
    pub labels: LabelConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub regrid: RegridConfig,

    /// Conversions from raw source units, applied before regridding
    #[serde(default = "default_conversions")]
    pub conversions: Panels<UnitConversion>,

    #[serde(default = "default_color_domains")]
    pub color_domains: Panels<ColorDomain>,

    #[serde(default)]
    pub output: OutputConfig,

    /// Number of offsets processed concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        let args = Args::parse();
        Self::from_args(args)
    }

    /// Build configuration from already-parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults, or a JSON file whose missing keys fall back to them
        let mut config = match &args.config {
            Some(config_path) => Self::load_from_file(config_path)?,
            None => Config::default(),
        };

        // Override with command-line arguments
        config.apply_args(args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn apply_args(&mut self, args: Args) {
        if let Some(anchor) = args.anchor {
            self.anchor.fixed = Some(anchor);
        }
        if let Some(offsets) = args.offsets {
            self.offsets = offsets;
        }
        if let Some(min_frames) = args.min_frames {
            self.min_frames = min_frames;
        }
        if args.local_dir.is_some() {
            self.source.local_dir = args.local_dir;
        }
        if let Some(output) = args.output {
            self.output.path = output;
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
        if let Some(workers) = args.workers {
            self.workers = workers;
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let bbox = &self.grid.bbox;
        if !(bbox.min_lon < bbox.max_lon) || !(bbox.min_lat < bbox.max_lat) {
            return Err(config_error(format!("Invalid grid bounding box: {:?}", bbox)));
        }
        if bbox.min_lat < -90.0 || bbox.max_lat > 90.0 || bbox.max_lon - bbox.min_lon > 360.0 {
            return Err(config_error(format!(
                "Grid bounding box exceeds the globe: {:?}",
                bbox
            )));
        }
        if self.grid.nx < 2 || self.grid.ny < 2 {
            return Err(config_error(format!(
                "Grid needs at least 2 points per axis, got {}x{}",
                self.grid.nx, self.grid.ny
            )));
        }

        if self.offsets.is_empty() {
            return Err(config_error("At least one offset is required".to_string()));
        }
        if !self.offsets.windows(2).all(|w| w[0] < w[1]) {
            return Err(config_error(format!(
                "Offsets must be strictly increasing: {:?}",
                self.offsets
            )));
        }

        if self.min_frames == 0 {
            return Err(config_error("min_frames must be at least 1".to_string()));
        }
        if self.min_frames > self.offsets.len() {
            return Err(config_error(format!(
                "min_frames ({}) exceeds the number of offsets ({})",
                self.min_frames,
                self.offsets.len()
            )));
        }

        if self.anchor.cycle_hours == 0 || 24 % self.anchor.cycle_hours != 0 {
            return Err(config_error(format!(
                "cycle_hours must divide 24, got {}",
                self.anchor.cycle_hours
            )));
        }
        if let Some(fixed) = self.anchor.fixed {
            if !crate::time_index::is_cycle_aligned(fixed, self.anchor.cycle_hours) {
                return Err(config_error(format!(
                    "Anchor {} is not on a {}-hour cycle boundary",
                    fixed, self.anchor.cycle_hours
                )));
            }
        }

        if !(-12..=14).contains(&self.labels.utc_offset_hours) {
            return Err(config_error(format!(
                "utc_offset_hours out of range: {}",
                self.labels.utc_offset_hours
            )));
        }
        if self.labels.weekday_names.len() != 7 {
            return Err(config_error(format!(
                "Expected 7 weekday names, got {}",
                self.labels.weekday_names.len()
            )));
        }

        if !self.source.sample_margin_deg.is_finite() || self.source.sample_margin_deg < 0.0 {
            return Err(config_error(format!(
                "sample_margin_deg must be non-negative, got {}",
                self.source.sample_margin_deg
            )));
        }
        if self.source.timeout_secs == 0 {
            return Err(config_error("timeout_secs cannot be 0".to_string()));
        }

        match self.regrid.method.as_str() {
            "cubic" | "linear" => {}
            _ => {
                return Err(config_error(format!(
                    "Invalid interpolation method: {}. Must be one of: cubic, linear",
                    self.regrid.method
                )));
            }
        }
        if self.regrid.max_iterations == 0 || !(self.regrid.tolerance > 0.0) {
            return Err(config_error(
                "Gradient iteration needs max_iterations > 0 and tolerance > 0".to_string(),
            ));
        }

        for (quantity, conversion) in self.conversions.iter() {
            if !conversion.scale.is_finite() || conversion.scale == 0.0 || !conversion.offset.is_finite() {
                return Err(config_error(format!(
                    "Invalid unit conversion for {}: {:?}",
                    quantity, conversion
                )));
            }
        }

        for (quantity, domain) in self.color_domains.iter() {
            if !(domain.min < domain.max) || !(domain.step > 0.0) {
                return Err(config_error(format!(
                    "Invalid color domain for {}: min {}, max {}, step {}",
                    quantity, domain.min, domain.max, domain.step
                )));
            }
            if let Some(mid) = domain.midpoint {
                if !(mid > domain.min && mid < domain.max) {
                    return Err(config_error(format!(
                        "Color midpoint {} for {} lies outside {}..{}",
                        mid, quantity, domain.min, domain.max
                    )));
                }
            }
            crate::colormaps::get_colormap(domain)?;
        }

        match self.output.format.as_str() {
            "json" | "png" => {}
            _ => {
                return Err(config_error(format!(
                    "Invalid output format: {}. Must be one of: json, png",
                    self.output.format
                )));
            }
        }
        if self.output.pixel_scale == 0 {
            return Err(config_error("pixel_scale cannot be 0".to_string()));
        }

        if self.workers == 0 {
            return Err(config_error("workers must be at least 1".to_string()));
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(config_error(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        Ok(())
    }
}

fn config_error(message: String) -> SynopticError {
    SynopticError::Config { message }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            offsets: default_offsets(),
            min_frames: default_min_frames(),
            anchor: AnchorConfig::default(),
            labels: LabelConfig::default(),
            source: SourceConfig::default(),
            regrid: RegridConfig::default(),
            conversions: default_conversions(),
            color_domains: default_color_domains(),
            output: OutputConfig::default(),
            workers: default_workers(),
            log_level: default_log_level(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            bbox: default_bbox(),
            nx: default_nx(),
            ny: default_ny(),
        }
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            cycle_hours: default_cycle_hours(),
            latency_hours: default_latency_hours(),
            fixed: None,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            zone_name: default_zone_name(),
            weekday_names: default_weekday_names(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            local_dir: None,
            timeout_secs: default_timeout_secs(),
            sample_margin_deg: default_sample_margin(),
        }
    }
}

impl Default for RegridConfig {
    fn default() -> Self {
        Self {
            method: default_interpolation(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: default_output_format(),
            pixel_scale: default_pixel_scale(),
        }
    }
}

// Default value functions for serde
fn default_bbox() -> BoundingBox {
    BoundingBox::new(60.0, 0.0, 180.0, 70.0)
}

fn default_nx() -> usize {
    121
}

fn default_ny() -> usize {
    71
}

fn default_offsets() -> Vec<i32> {
    vec![-48, -36, -24, -12, 0, 12, 24, 36, 48]
}

fn default_min_frames() -> usize {
    2
}

fn default_cycle_hours() -> u32 {
    6
}

fn default_latency_hours() -> u32 {
    7
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_zone_name() -> String {
    "JST".to_string()
}

fn default_weekday_names() -> Vec<String> {
    ["月", "火", "水", "木", "金", "土", "日"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_url_template() -> String {
    "https://noaa-gfs-bdp-pds.s3.amazonaws.com/gfs.{date}/{hour}/atmos/gfs.t{hour}z.pgrb2.0p25.f{lead}"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_sample_margin() -> f64 {
    2.0
}

fn default_interpolation() -> String {
    "cubic".to_string()
}

fn default_max_iterations() -> usize {
    400
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_conversions() -> Panels<UnitConversion> {
    Panels::new(
        UnitConversion::identity("m"),
        UnitConversion {
            scale: 1.0,
            offset: -273.15,
            unit: "degC".to_string(),
        },
        UnitConversion {
            scale: 0.01,
            offset: 0.0,
            unit: "hPa".to_string(),
        },
    )
}

fn default_color_domains() -> Panels<ColorDomain> {
    Panels::new(
        ColorDomain {
            min: 5300.0,
            max: 5900.0,
            step: 60.0,
            colormap: "plasma".to_string(),
            midpoint: None,
        },
        ColorDomain {
            min: -21.0,
            max: 30.0,
            step: 3.0,
            colormap: "rdbu_r".to_string(),
            midpoint: None,
        },
        ColorDomain {
            min: 980.0,
            max: 1030.0,
            step: 4.0,
            colormap: "pressure".to_string(),
            midpoint: Some(1012.0),
        },
    )
}

fn default_output_path() -> PathBuf {
    PathBuf::from("gfs_frames.json")
}

fn default_output_format() -> String {
    "json".to_string()
}

fn default_pixel_scale() -> u32 {
    4
}

fn default_workers() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}
