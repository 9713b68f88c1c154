//! Frame assembly and display labels.

use chrono::{DateTime, Datelike, FixedOffset, Utc};

use crate::config::LabelConfig;
use crate::error::{Result, SynopticError};
use crate::field::Panels;
use crate::grid::RegriddedField;
use crate::time_index::ForecastRequest;

/// One animation step: three regridded panels and their time label.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub offset: i32,
    pub issue_time: DateTime<Utc>,
    pub lead_hours: u32,
    pub valid_time: DateTime<Utc>,
    /// Display label, unique within a sequence
    pub label: String,
    pub fields: Panels<RegriddedField>,
}

/// Formats valid times in the display timezone.
#[derive(Debug, Clone)]
pub struct LabelFormatter {
    zone: FixedOffset,
    zone_name: String,
    weekday_names: [String; 7],
}

impl LabelFormatter {
    pub fn new(config: &LabelConfig) -> Result<Self> {
        let zone = FixedOffset::east_opt(config.utc_offset_hours * 3600).ok_or_else(|| {
            SynopticError::Config {
                message: format!("Invalid UTC offset: {} hours", config.utc_offset_hours),
            }
        })?;
        let weekday_names: [String; 7] =
            config
                .weekday_names
                .clone()
                .try_into()
                .map_err(|names: Vec<String>| SynopticError::Config {
                    message: format!("Expected 7 weekday names, got {}", names.len()),
                })?;

        Ok(Self {
            zone,
            zone_name: config.zone_name.clone(),
            weekday_names,
        })
    }

    /// `MM/DD(<weekday>) HH:MM <zone>`
    pub fn format(&self, time: DateTime<Utc>) -> String {
        let local = time.with_timezone(&self.zone);
        let weekday = &self.weekday_names[local.weekday().num_days_from_monday() as usize];
        format!(
            "{}({}) {} {}",
            local.format("%m/%d"),
            weekday,
            local.format("%H:%M"),
            self.zone_name
        )
    }
}

/// Combines the three regridded panels of one offset into a [`Frame`].
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    labels: LabelFormatter,
}

impl FrameAssembler {
    pub fn new(labels: LabelFormatter) -> Self {
        Self { labels }
    }

    pub fn label_for(&self, request: &ForecastRequest) -> String {
        self.labels.format(request.valid_time())
    }

    /// Build a frame, or fail with `IncompleteFrame` if any panel is absent.
    pub fn assemble(
        &self,
        request: &ForecastRequest,
        fields: Panels<Option<RegriddedField>>,
    ) -> Result<Frame> {
        let label = self.label_for(request);
        let fields = fields
            .transpose()
            .map_err(|missing| SynopticError::IncompleteFrame {
                label: label.clone(),
                missing,
            })?;

        Ok(Frame {
            offset: request.offset,
            issue_time: request.issue_time,
            lead_hours: request.lead_hours,
            valid_time: request.valid_time(),
            label,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Quantity;
    use crate::time_index::forecast_request;
    use chrono::TimeZone;
    use ndarray::Array2;
    use pretty_assertions::assert_eq;

    fn assembler() -> FrameAssembler {
        FrameAssembler::new(LabelFormatter::new(&LabelConfig::default()).unwrap())
    }

    fn field(quantity: Quantity) -> RegriddedField {
        RegriddedField {
            quantity,
            unit: "u".to_string(),
            values: Array2::zeros((2, 2)),
        }
    }

    #[test]
    fn test_label_in_display_timezone() {
        let formatter = LabelFormatter::new(&LabelConfig::default()).unwrap();
        // 2025-01-10 18:00 UTC is Saturday 03:00 JST
        let time = Utc.with_ymd_and_hms(2025, 1, 10, 18, 0, 0).unwrap();
        assert_eq!(formatter.format(time), "01/11(土) 03:00 JST");
    }

    #[test]
    fn test_custom_label_config() {
        let config = LabelConfig {
            utc_offset_hours: -5,
            zone_name: "EST".to_string(),
            weekday_names: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
        let formatter = LabelFormatter::new(&config).unwrap();
        let time = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
        assert_eq!(formatter.format(time), "01/09(Thu) 22:00 EST");
    }

    #[test]
    fn test_wrong_weekday_count() {
        let config = LabelConfig {
            weekday_names: vec!["Mon".to_string()],
            ..LabelConfig::default()
        };
        assert!(LabelFormatter::new(&config).is_err());
    }

    #[test]
    fn test_assemble_complete_frame() {
        let anchor = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let request = forecast_request(anchor, 12);
        let frame = assembler()
            .assemble(&request, Panels::from_fn(|q| Some(field(q))))
            .unwrap();
        assert_eq!(frame.offset, 12);
        assert_eq!(frame.lead_hours, 12);
        assert_eq!(frame.label, "01/10(金) 21:00 JST");
        assert_eq!(frame.fields.mslp.quantity, Quantity::Mslp);
    }

    #[test]
    fn test_partial_frame_is_rejected() {
        let anchor = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let request = forecast_request(anchor, -12);
        let fields = Panels::new(None, None, Some(field(Quantity::Mslp)));
        match assembler().assemble(&request, fields) {
            Err(SynopticError::IncompleteFrame { missing, .. }) => {
                assert_eq!(missing, vec![Quantity::Height500, Quantity::Temperature850]);
            }
            other => panic!("Expected IncompleteFrame, got {:?}", other),
        }
    }
}
