//! One PNG per frame with the three panels stacked vertically.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tracing::{debug, info};

use super::FrameSink;
use crate::colormaps::{contour_band, get_colormap, Colormap};
use crate::config::ColorDomain;
use crate::error::{Result, SynopticError};
use crate::field::Panels;
use crate::frame::Frame;
use crate::grid::RegriddedField;
use crate::sequence::FrameSequence;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Writes `frame_000.png`, `frame_001.png`, ... into a directory.
pub struct PngSink {
    dir: PathBuf,
    pixel_scale: u32,
}

impl PngSink {
    pub fn new(dir: impl AsRef<Path>, pixel_scale: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            pixel_scale: pixel_scale.max(1),
        }
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{:03}.png", index))
    }
}

/// Render one frame. Panels follow the fixed quantity order top to bottom;
/// north is up within each panel.
pub fn render_frame(
    frame: &Frame,
    colormaps: &Panels<Box<dyn Colormap>>,
    domains: &Panels<ColorDomain>,
    pixel_scale: u32,
) -> Result<RgbaImage> {
    let (ny, nx) = frame.fields.height_500.values.dim();
    let panel_width = nx as u32 * pixel_scale;
    let panel_height = ny as u32 * pixel_scale;
    let mut img = RgbaImage::from_pixel(panel_width, panel_height * 3, TRANSPARENT);

    for (panel, (quantity, field)) in frame.fields.iter().enumerate() {
        if field.values.dim() != (ny, nx) {
            return Err(SynopticError::Render {
                message: format!(
                    "{} panel of {} has shape {:?}, expected {:?}",
                    quantity,
                    frame.label,
                    field.values.dim(),
                    (ny, nx)
                ),
            });
        }
        let top = panel as u32 * panel_height;
        draw_panel(
            &mut img,
            field,
            colormaps.get(quantity).as_ref(),
            domains.get(quantity),
            top,
            pixel_scale,
        );
    }

    Ok(img)
}

fn draw_panel(
    img: &mut RgbaImage,
    field: &RegriddedField,
    colormap: &dyn Colormap,
    domain: &ColorDomain,
    top: u32,
    pixel_scale: u32,
) {
    let (ny, _) = field.values.dim();
    for ((row, col), &value) in field.values.indexed_iter() {
        let color = if value.is_finite() {
            let banded = contour_band(value, domain.min, domain.step);
            Rgba(colormap.map(banded, domain.min, domain.max))
        } else {
            TRANSPARENT
        };

        // Row 0 is the southernmost latitude
        let y0 = top + (ny - 1 - row) as u32 * pixel_scale;
        let x0 = col as u32 * pixel_scale;
        for dy in 0..pixel_scale {
            for dx in 0..pixel_scale {
                img.put_pixel(x0 + dx, y0 + dy, color);
            }
        }
    }
}

impl FrameSink for PngSink {
    fn write(&mut self, sequence: &FrameSequence) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let colormaps = Panels::from_fn(|q| get_colormap(sequence.color_domains.get(q)))
            .transpose_result()?;

        for (index, frame) in sequence.frames.iter().enumerate() {
            let img = render_frame(frame, &colormaps, &sequence.color_domains, self.pixel_scale)?;
            let path = self.frame_path(index);
            img.save(&path)?;
            debug!(path = %path.display(), label = %frame.label, "Wrote frame image");
        }

        info!(
            dir = %self.dir.display(),
            frames = sequence.frames.len(),
            "Wrote PNG frames"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "png"
    }
}
