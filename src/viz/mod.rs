//! Chart rendering: draw a computed [`Layout`] to **SVG** or **PNG/JPEG/BMP**.
//!
//! - Filled segments with a white border, category and share printed inside
//! - Group names under each column, legend panel on the right
//! - Plot area fixed to the unit square, never any tick marks; the frame
//!   only shows when `axis_visible` is set
//! - Canvas cropped to the drawn elements at a fixed DPI
//! - Output goes through a temp file in the target directory and is moved
//!   into place only after drawing succeeded

pub mod legend;
pub mod text;
pub mod util;

pub use util::OutputFormat;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{ChartConfig, DEFAULT_DPI, MAX_DPI};
use crate::error::RenderError;
use crate::font::{
    FontPreference, FontResolutionWarning, FontResolver, SystemFontResolver, resolve_font,
};
use crate::layout::legend_entries;
use crate::models::{Layout, LegendEntry};
use crate::style::CategoryColorMap;

use legend::draw_legend_panel;
use text::{ChartFont, line_height_px};
use util::{
    BORDER_PT, ChartGeometry, FRAME_PT, LEGEND_PT, Metrics, SEGMENT_PT, TextBox, rgb_color,
};

/// Text and decoration settings of one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Cosmetics {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub legend_title: String,
    pub legend: Vec<LegendEntry>,
    /// Frame around the plot area. Ticks are never drawn.
    pub axis_visible: bool,
    pub font: FontPreference,
    pub dpi: u32,
}

impl Default for Cosmetics {
    fn default() -> Self {
        Self {
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            legend_title: String::new(),
            legend: Vec::new(),
            axis_visible: false,
            font: FontPreference::Auto,
            dpi: DEFAULT_DPI,
        }
    }
}

impl Cosmetics {
    /// Cosmetics from a config; the legend lists every category in `colors`.
    pub fn from_config(cfg: &ChartConfig, colors: &CategoryColorMap) -> Self {
        Self {
            title: cfg.title.clone(),
            xlabel: cfg.xlabel.clone(),
            ylabel: cfg.ylabel.clone(),
            legend_title: cfg.legend_title.clone(),
            legend: legend_entries(colors),
            axis_visible: cfg.axis_visible,
            font: cfg.font_preference(),
            dpi: cfg.dpi.clamp(1, MAX_DPI),
        }
    }
}

/// What [`render`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Family used for text; `None` for the default sans-serif.
    pub font_family: Option<String>,
    pub warnings: Vec<FontResolutionWarning>,
}

/// Render with the fonts installed on this machine.
pub fn render<P: AsRef<Path>>(
    layout: &Layout,
    group_labels: &BTreeMap<String, String>,
    cosmetics: &Cosmetics,
    output_path: P,
) -> Result<RenderReport, RenderError> {
    let resolver = SystemFontResolver::new();
    render_with_resolver(layout, group_labels, cosmetics, output_path, &resolver)
}

/// Render `layout` to `output_path`; the extension picks the format.
///
/// `group_labels` maps group names to the text shown under each column;
/// groups without an entry show their own name.
///
/// ### Errors
/// - [`RenderError::UnsupportedFormat`] for an unknown extension
/// - [`RenderError::PathNotFound`] if the output directory does not exist
/// - [`RenderError::WriteFailure`] for any drawing or I/O failure
///
/// Nothing is written to `output_path` unless the call succeeds.
pub fn render_with_resolver<P: AsRef<Path>>(
    layout: &Layout,
    group_labels: &BTreeMap<String, String>,
    cosmetics: &Cosmetics,
    output_path: P,
    resolver: &dyn FontResolver,
) -> Result<RenderReport, RenderError> {
    let out = output_path.as_ref();
    let format = OutputFormat::from_path(out)?;
    let dir = output_dir(out)?;

    let choice = resolve_font(&cosmetics.font, resolver);
    let mut warnings: Vec<FontResolutionWarning> = choice.warning.iter().cloned().collect();
    let font = match format {
        OutputFormat::Svg => {
            let (font, warning) = ChartFont::for_svg(&choice, resolver);
            warnings.extend(warning);
            font
        }
        OutputFormat::Raster => {
            let (font, w) = ChartFont::for_raster(&choice, resolver);
            warnings.extend(w);
            font
        }
    };
    for w in &warnings {
        log::warn!("{w}");
    }

    let dpi = cosmetics.dpi.clamp(1, MAX_DPI);
    if dpi != cosmetics.dpi {
        log::warn!("dpi {} out of range, using {dpi}", cosmetics.dpi);
    }
    let metrics = Metrics { dpi };
    let label_for = |g: &str| group_labels.get(g).cloned().unwrap_or_else(|| g.to_string());
    let geometry = ChartGeometry::compute(
        layout,
        &label_for,
        &cosmetics.title,
        &cosmetics.xlabel,
        &cosmetics.ylabel,
        &cosmetics.legend_title,
        &cosmetics.legend,
        metrics,
    );
    let size = (geometry.width, geometry.height);
    log::debug!(
        "rendering {} rectangles to {} ({}x{} px, {:?})",
        layout.rectangles.len(),
        out.display(),
        size.0,
        size.1,
        format
    );

    let write_failure = |source: io::Error| RenderError::WriteFailure {
        path: out.to_path_buf(),
        source,
    };
    let ext = out.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let tmp = tempfile::Builder::new()
        .prefix(".mekko-")
        .suffix(&format!(".{ext}"))
        .tempfile_in(&dir)
        .map_err(write_failure)?
        .into_temp_path();

    {
        let chart = Chart {
            layout,
            cosmetics,
            geometry: &geometry,
            font: &font,
            metrics,
        };
        match format {
            OutputFormat::Svg => {
                let root = SVGBackend::new(&tmp, size).into_drawing_area();
                chart.draw(&root).map_err(write_failure)?;
                root.present().map_err(|e| write_failure(draw_err(e)))?;
            }
            OutputFormat::Raster => {
                let root = BitMapBackend::new(&tmp, size).into_drawing_area();
                chart.draw(&root).map_err(write_failure)?;
                root.present().map_err(|e| write_failure(draw_err(e)))?;
            }
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // temp files are created 0600
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o644)).map_err(write_failure)?;
    }
    tmp.persist(out).map_err(|e| write_failure(e.error))?;

    Ok(RenderReport {
        path: out.to_path_buf(),
        format,
        width: size.0,
        height: size.1,
        font_family: font.family_name().map(str::to_string),
        warnings,
    })
}

/// Directory the output goes to; it must already exist.
fn output_dir(out: &Path) -> Result<PathBuf, RenderError> {
    let dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    match fs::metadata(&dir) {
        Ok(m) if m.is_dir() => Ok(dir),
        Ok(_) => Err(RenderError::PathNotFound {
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            path: dir,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(RenderError::PathNotFound { path: dir, source: e })
        }
        Err(e) => Err(RenderError::WriteFailure { path: dir, source: e }),
    }
}

fn draw_err<E: std::fmt::Debug>(e: E) -> io::Error {
    io::Error::other(format!("{e:?}"))
}

/// Everything needed to draw one figure onto any backend.
struct Chart<'a> {
    layout: &'a Layout,
    cosmetics: &'a Cosmetics,
    geometry: &'a ChartGeometry,
    font: &'a ChartFont,
    metrics: Metrics,
}

impl Chart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> io::Result<()> {
        root.fill(&WHITE).map_err(draw_err)?;
        self.draw_segments(root)?;
        if self.cosmetics.axis_visible {
            self.draw_frame(root)?;
        }
        self.draw_labels(root)?;
        if let Some(e) = self.geometry.legend {
            let area = root.clone().shrink((e.x0, e.y0), (e.width(), e.height()));
            let px = self.metrics.px(LEGEND_PT);
            draw_legend_panel(
                &area,
                &self.cosmetics.legend,
                &self.cosmetics.legend_title,
                self.font,
                px,
                px,
            )?;
        }
        Ok(())
    }

    fn draw_segments<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> io::Result<()> {
        let g = self.geometry;
        let border = WHITE.stroke_width(self.metrics.px(BORDER_PT));
        let text_px = self.metrics.px(SEGMENT_PT);
        let text_style = self.font.centered(text_px).color(&WHITE);

        for r in &self.layout.rectangles {
            let top_left = g.to_px(r.x, r.y_top());
            let bottom_right = g.to_px(r.x + r.width, r.y_bottom);
            let corners = [top_left, bottom_right];
            root.draw(&Rectangle::new(corners, rgb_color(r.color).filled()))
                .map_err(draw_err)?;
            root.draw(&Rectangle::new(corners, border)).map_err(draw_err)?;
        }

        if !self.font.enabled {
            return Ok(());
        }
        // Labels after all fills so a neighbour's border never covers text.
        for r in &self.layout.rectangles {
            let (cx, cy) = r.center();
            let (px, py) = g.to_px(cx, cy);
            let lines: Vec<&str> = r.display_text.lines().collect();
            let lh = line_height_px(text_px) as i32;
            let first = py - lh * (lines.len() as i32 - 1) / 2;
            for (i, line) in lines.iter().enumerate() {
                root.draw(&Text::new(*line, (px, first + i as i32 * lh), text_style.clone()))
                    .map_err(draw_err)?;
            }
        }
        Ok(())
    }

    fn draw_frame<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> io::Result<()> {
        let p = self.geometry.plot;
        root.draw(&Rectangle::new(
            [(p.x0, p.y0), (p.x1, p.y1)],
            BLACK.stroke_width(self.metrics.px(FRAME_PT)),
        ))
        .map_err(draw_err)
    }

    fn draw_labels<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> io::Result<()> {
        if !self.font.enabled {
            return Ok(());
        }
        let g = self.geometry;
        let blocks = g
            .title
            .iter()
            .chain(g.group_labels.iter())
            .chain(g.xlabel.iter());
        for b in blocks {
            self.draw_block(root, b)?;
        }
        if let Some((text, pos, px)) = &g.ylabel {
            root.draw(&Text::new(text.as_str(), *pos, self.font.rotated(*px).color(&BLACK)))
                .map_err(draw_err)?;
        }
        Ok(())
    }

    /// Multi-line text, each line centered on `center_x`, from `top` down.
    fn draw_block<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, b: &TextBox) -> io::Result<()> {
        let style = self
            .font
            .style(b.font_px, Pos::new(HPos::Center, VPos::Top))
            .color(&BLACK);
        let lh = line_height_px(b.font_px) as i32;
        for (i, line) in b.text.lines().enumerate() {
            root.draw(&Text::new(line, (b.center_x, b.top + i as i32 * lh), style.clone()))
                .map_err(draw_err)?;
        }
        Ok(())
    }
}
