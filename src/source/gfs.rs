//! GFS GRIB2 loaders: NOAA's public bucket over HTTP, or a local mirror.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use tracing::{debug, info};

use super::decode::decode_fields;
use super::{expand_template, SourceLoader};
use crate::config::SourceConfig;
use crate::error::{Result, SynopticError};
use crate::field::{Panels, ScatteredField};

/// Downloads one pgrb2 file per snapshot into a scratch file and decodes it.
///
/// The scratch file is anonymous and is released when the fetch returns,
/// on success and failure alike.
pub struct GfsHttpLoader {
    client: Client,
    url_template: String,
    center_lon: f64,
}

impl GfsHttpLoader {
    pub fn new(config: &SourceConfig, center_lon: f64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            center_lon,
        })
    }

    fn download(&self, url: &str) -> Result<File> {
        let mut response = self.client.get(url).send()?.error_for_status()?;
        let mut file = tempfile::tempfile()?;
        let bytes = response.copy_to(&mut file)?;
        file.rewind()?;
        debug!(url = %url, bytes = bytes, "Downloaded GRIB2 file");
        Ok(file)
    }
}

impl SourceLoader for GfsHttpLoader {
    fn fetch(&self, issue_time: DateTime<Utc>, lead_hours: u32) -> Result<Panels<ScatteredField>> {
        let url = expand_template(&self.url_template, issue_time, lead_hours);
        let start = Instant::now();

        let file = self.download(&url).map_err(|e| SynopticError::Fetch {
            message: format!("{}: {}", url, e),
        })?;
        let fields = decode_fields(BufReader::new(file), self.center_lon)?;

        info!(
            url = %url,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched GFS snapshot"
        );
        Ok(fields)
    }

    fn name(&self) -> &str {
        "gfs-http"
    }
}

/// Reads pgrb2 files from a directory, named like the last path segment
/// of the URL template (e.g. `gfs.t06z.pgrb2.0p25.f024`).
pub struct LocalGribLoader {
    dir: PathBuf,
    name_template: String,
    center_lon: f64,
}

impl LocalGribLoader {
    pub fn new(dir: impl Into<PathBuf>, url_template: &str, center_lon: f64) -> Self {
        let name_template = url_template
            .rsplit('/')
            .next()
            .unwrap_or(url_template)
            .to_string();
        Self {
            dir: dir.into(),
            name_template,
            center_lon,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding one snapshot.
    pub fn path_for(&self, issue_time: DateTime<Utc>, lead_hours: u32) -> PathBuf {
        self.dir
            .join(expand_template(&self.name_template, issue_time, lead_hours))
    }
}

impl SourceLoader for LocalGribLoader {
    fn fetch(&self, issue_time: DateTime<Utc>, lead_hours: u32) -> Result<Panels<ScatteredField>> {
        let path = self.path_for(issue_time, lead_hours);
        let file = File::open(&path).map_err(|e| SynopticError::Fetch {
            message: format!("{}: {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "Reading local GRIB2 file");
        decode_fields(BufReader::new(file), self.center_lon)
    }

    fn name(&self) -> &str {
        "local-grib"
    }
}
