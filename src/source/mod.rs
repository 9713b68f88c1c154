//! Source data retrieval.
//!
//! A [`SourceLoader`] turns one (issue-time, lead-hour) pair into the three
//! raw scalar fields. Retrieval mechanics live entirely behind this trait; the
//! pipeline treats every loader failure the same way.

pub mod gfs;
pub mod decode;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::field::{Panels, ScatteredField};

pub use gfs::{GfsHttpLoader, LocalGribLoader};

/// Trait for fetching the raw fields of one forecast snapshot
pub trait SourceLoader: Send + Sync {
    /// Fetch the three raw fields for `issue_time` + `lead_hours`.
    fn fetch(&self, issue_time: DateTime<Utc>, lead_hours: u32) -> Result<Panels<ScatteredField>>;

    /// Get the name of this loader
    fn name(&self) -> &str;
}

/// Expand `{date}` (YYYYMMDD), `{hour}` (HH) and `{lead}` (FFF) in a
/// location template.
pub fn expand_template(template: &str, issue_time: DateTime<Utc>, lead_hours: u32) -> String {
    template
        .replace("{date}", &issue_time.format("%Y%m%d").to_string())
        .replace("{hour}", &issue_time.format("%H").to_string())
        .replace("{lead}", &format!("{:03}", lead_hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expand_template() {
        let issue = Utc.with_ymd_and_hms(2025, 1, 9, 6, 0, 0).unwrap();
        let url = expand_template(
            "https://host/gfs.{date}/{hour}/atmos/gfs.t{hour}z.pgrb2.0p25.f{lead}",
            issue,
            24,
        );
        assert_eq!(url, "https://host/gfs.20250109/06/atmos/gfs.t06z.pgrb2.0p25.f024");
    }
}
