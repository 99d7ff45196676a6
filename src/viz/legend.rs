//! Legend panel drawn to the right of the plot: optional title, then one
//! color patch + label per category.

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io;

use super::text::{ChartFont, estimate_text_width_px, line_height_px};
use super::util::{FRAME_GRAY, rgb_color};
use crate::models::LegendEntry;

/// Spacing derived from the label font size (must match `draw_legend_panel`).
struct LegendLayout {
    pad: i32,
    patch_w: i32,
    patch_h: i32,
    patch_gap: i32,
    row_h: i32,
    row_gap: i32,
    title_gap: i32,
}

impl LegendLayout {
    fn for_font(font_px: u32) -> Self {
        let em = font_px as f32;
        Self {
            pad: (0.4 * em).ceil() as i32,
            patch_w: (2.0 * em).ceil() as i32,
            patch_h: (0.7 * em).ceil() as i32,
            patch_gap: (0.8 * em).ceil() as i32,
            row_h: line_height_px(font_px) as i32,
            row_gap: (0.5 * em).ceil() as i32,
            title_gap: (0.5 * em).ceil() as i32,
        }
    }
}

/// Size of the legend panel in pixels.
pub fn legend_size_px(items: &[LegendEntry], title: &str, font_px: u32, title_px: u32) -> (u32, u32) {
    let l = LegendLayout::for_font(font_px);
    let has_title = !title.trim().is_empty();

    let label_w = items
        .iter()
        .map(|e| estimate_text_width_px(&e.label, font_px) as i32)
        .max()
        .unwrap_or(0);
    let row_w = l.patch_w + l.patch_gap + label_w;
    let title_w = if has_title {
        estimate_text_width_px(title, title_px) as i32
    } else {
        0
    };

    let n = items.len() as i32;
    let mut h = 2 * l.pad + n * l.row_h + (n - 1).max(0) * l.row_gap;
    if has_title {
        h += line_height_px(title_px) as i32 + l.title_gap;
    }
    let w = 2 * l.pad + row_w.max(title_w);
    (w.max(0) as u32, h.max(0) as u32)
}

fn draw_err<E: std::fmt::Debug>(e: E) -> io::Error {
    io::Error::other(format!("{e:?}"))
}

/// Draw the legend into `legend_area`, which must be at least
/// [`legend_size_px`] large.
pub fn draw_legend_panel<DB: DrawingBackend>(
    legend_area: &DrawingArea<DB, Shift>,
    items: &[LegendEntry],
    title: &str,
    font: &ChartFont,
    font_px: u32,
    title_px: u32,
) -> io::Result<()> {
    let l = LegendLayout::for_font(font_px);
    let (w, h) = legend_area.dim_in_pixel();

    legend_area.fill(&WHITE).map_err(draw_err)?;
    legend_area
        .draw(&Rectangle::new(
            [(0, 0), (w as i32 - 1, h as i32 - 1)],
            FRAME_GRAY.stroke_width(1),
        ))
        .map_err(draw_err)?;

    let mut y = l.pad;
    if !title.trim().is_empty() {
        if font.enabled {
            let style = font.style(title_px, Pos::new(HPos::Center, VPos::Top));
            legend_area
                .draw(&Text::new(title, (w as i32 / 2, y), style))
                .map_err(draw_err)?;
        }
        y += line_height_px(title_px) as i32 + l.title_gap;
    }

    let label_style = font.style(font_px, Pos::new(HPos::Left, VPos::Center));
    for item in items {
        let center_y = y + l.row_h / 2;
        let top = center_y - l.patch_h / 2;
        legend_area
            .draw(&Rectangle::new(
                [(l.pad, top), (l.pad + l.patch_w, top + l.patch_h)],
                rgb_color(item.color).filled(),
            ))
            .map_err(draw_err)?;
        if font.enabled {
            let text_x = l.pad + l.patch_w + l.patch_gap;
            legend_area
                .draw(&Text::new(
                    item.label.as_str(),
                    (text_x, center_y),
                    label_style.clone(),
                ))
                .map_err(draw_err)?;
        }
        y += l.row_h + l.row_gap;
    }
    Ok(())
}
