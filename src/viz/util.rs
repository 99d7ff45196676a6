//! Utility functions for rendering: output formats, colors, unit conversion
//! and the pixel geometry of the whole figure.

use plotters::prelude::*;
use std::path::Path;

use super::legend::legend_size_px;
use super::text::{estimate_text_width_px, line_height_px, text_block_size};
use crate::error::RenderError;
use crate::models::{Layout, LegendEntry};
use crate::style::Rgb8;

/// Backend selected from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    /// PNG, JPEG or BMP through the `image` crate.
    Raster,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" | "jpg" | "jpeg" | "bmp" => Ok(OutputFormat::Raster),
            _ => Err(RenderError::UnsupportedFormat(ext)),
        }
    }
}

#[inline]
pub fn rgb_color(c: Rgb8) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Legend frame gray.
pub const FRAME_GRAY: RGBColor = RGBColor(204, 204, 204);

// Figure constants in typographic points / inches.
pub const TITLE_PT: f64 = 12.0;
pub const AXIS_LABEL_PT: f64 = 10.0;
pub const GROUP_LABEL_PT: f64 = 10.0;
pub const SEGMENT_PT: f64 = 9.0;
pub const LEGEND_PT: f64 = 10.0;
pub const BORDER_PT: f64 = 1.5;
pub const FRAME_PT: f64 = 0.8;
const TITLE_GAP_PT: f64 = 6.0;
const LABEL_GAP_PT: f64 = 4.0;
const PLOT_W_IN: f64 = 7.75;
const PLOT_H_IN: f64 = 4.62;
const PAD_IN: f64 = 0.1;
/// Group labels hang this fraction of the plot height below the x axis.
const GROUP_LABEL_OFFSET: f64 = 0.05;
/// Legend starts this fraction of the plot width right of the plot.
const LEGEND_OFFSET: f64 = 0.05;

/// Point/inch to pixel conversion at a fixed resolution.
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub dpi: u32,
}

impl Metrics {
    pub fn px(&self, pt: f64) -> u32 {
        (pt * self.dpi as f64 / 72.0).round().max(1.0) as u32
    }

    pub fn inch(&self, inches: f64) -> i32 {
        (inches * self.dpi as f64).round() as i32
    }
}

/// Axis-aligned pixel box, `x1`/`y1` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Extent {
    pub fn new(x0: i32, y0: i32, w: u32, h: u32) -> Self {
        Self {
            x0,
            y0,
            x1: x0 + w as i32,
            y1: y0 + h as i32,
        }
    }

    /// Empty boxes (nothing drawn) leave `self` unchanged.
    pub fn union(self, o: Extent) -> Extent {
        if o.width() == 0 || o.height() == 0 {
            return self;
        }
        Extent {
            x0: self.x0.min(o.x0),
            y0: self.y0.min(o.y0),
            x1: self.x1.max(o.x1),
            y1: self.y1.max(o.y1),
        }
    }

    pub fn width(&self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }
}

/// A text block: horizontal center and top edge, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub center_x: i32,
    pub top: i32,
    pub font_px: u32,
}

/// Where everything goes on the canvas.
///
/// Elements are first placed relative to the plot's top-left corner; the
/// canvas is then cropped to their union plus a small pad, which is the
/// tight bounding box of the drawn figure.
#[derive(Debug, Clone)]
pub struct ChartGeometry {
    pub width: u32,
    pub height: u32,
    pub plot: Extent,
    pub title: Option<TextBox>,
    pub group_labels: Vec<TextBox>,
    pub xlabel: Option<TextBox>,
    /// Center of the rotated y label.
    pub ylabel: Option<(String, (i32, i32), u32)>,
    pub legend: Option<Extent>,
}

impl ChartGeometry {
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        layout: &Layout,
        group_label: &dyn Fn(&str) -> String,
        title: &str,
        xlabel: &str,
        ylabel: &str,
        legend_title: &str,
        legend: &[LegendEntry],
        m: Metrics,
    ) -> Self {
        let pw = m.inch(PLOT_W_IN);
        let ph = m.inch(PLOT_H_IN);
        let plot = Extent::new(0, 0, pw as u32, ph as u32);
        let mut bbox = plot;

        let title = (!title.trim().is_empty()).then(|| {
            let font_px = m.px(TITLE_PT);
            let (w, h) = text_block_size(title, font_px);
            let top = -(m.px(TITLE_GAP_PT) as i32) - h as i32;
            bbox = bbox.union(Extent::new(pw / 2 - w as i32 / 2, top, w, h));
            TextBox {
                text: title.to_string(),
                center_x: pw / 2,
                top,
                font_px,
            }
        });

        let strip_top = ph + (GROUP_LABEL_OFFSET * ph as f64).round() as i32;
        let mut strip_bottom = strip_top;
        let group_px = m.px(GROUP_LABEL_PT);
        let group_labels: Vec<TextBox> = layout
            .partition
            .spans()
            .iter()
            .map(|span| {
                let text = group_label(&span.group);
                let (w, h) = text_block_size(&text, group_px);
                let cx = (span.center() * pw as f64).round() as i32;
                bbox = bbox.union(Extent::new(cx - w as i32 / 2, strip_top, w, h));
                strip_bottom = strip_bottom.max(strip_top + h as i32);
                TextBox {
                    text,
                    center_x: cx,
                    top: strip_top,
                    font_px: group_px,
                }
            })
            .collect();

        let label_px = m.px(AXIS_LABEL_PT);
        let label_gap = m.px(LABEL_GAP_PT) as i32;
        let xlabel = (!xlabel.trim().is_empty()).then(|| {
            let (w, h) = text_block_size(xlabel, label_px);
            let top = strip_bottom + label_gap;
            bbox = bbox.union(Extent::new(pw / 2 - w as i32 / 2, top, w, h));
            TextBox {
                text: xlabel.to_string(),
                center_x: pw / 2,
                top,
                font_px: label_px,
            }
        });

        let ylabel = (!ylabel.trim().is_empty()).then(|| {
            let text = ylabel.lines().collect::<Vec<_>>().join(" ");
            // rotated: the text runs vertically
            let along = estimate_text_width_px(&text, label_px);
            let across = line_height_px(label_px);
            let right = -label_gap;
            let left = right - across as i32;
            bbox = bbox.union(Extent::new(left, ph / 2 - along as i32 / 2, across, along));
            (text, (left + across as i32 / 2, ph / 2), label_px)
        });

        let legend = (!legend.is_empty()).then(|| {
            let (w, h) = legend_size_px(legend, legend_title, m.px(LEGEND_PT), m.px(LEGEND_PT));
            let left = pw + (LEGEND_OFFSET * pw as f64).round() as i32;
            let e = Extent::new(left, 0, w, h);
            bbox = bbox.union(e);
            e
        });

        // Shift so the union starts at (pad, pad).
        let pad = m.inch(PAD_IN);
        let dx = pad - bbox.x0;
        let dy = pad - bbox.y0;
        let shift = |e: Extent| Extent {
            x0: e.x0 + dx,
            y0: e.y0 + dy,
            x1: e.x1 + dx,
            y1: e.y1 + dy,
        };
        let shift_box = |mut t: TextBox| {
            t.center_x += dx;
            t.top += dy;
            t
        };

        Self {
            width: bbox.width() + 2 * pad as u32,
            height: bbox.height() + 2 * pad as u32,
            plot: shift(plot),
            title: title.map(shift_box),
            group_labels: group_labels.into_iter().map(shift_box).collect(),
            xlabel: xlabel.map(shift_box),
            ylabel: ylabel.map(|(t, (x, y), px)| (t, (x + dx, y + dy), px)),
            legend: legend.map(shift),
        }
    }

    /// Pixel position of a unit-square point (origin bottom-left).
    pub fn to_px(&self, x: f64, y: f64) -> (i32, i32) {
        let w = self.plot.width() as f64;
        let h = self.plot.height() as f64;
        (
            self.plot.x0 + (x * w).round() as i32,
            self.plot.y1 - (y * h).round() as i32,
        )
    }
}
