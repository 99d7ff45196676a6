//! mekko_rs
//!
//! Lay out and render Mekko (Marimekko) charts: every group gets a column
//! whose width is its share of the grand total, and every category a segment
//! whose height is its share of the group. Pairs with the `mekko` CLI.
//!
//! ### Features
//! - Read headerless `group,category,value` CSV files
//! - Pure, deterministic layout (groups and categories in name order)
//! - Stable category colors with user overrides
//! - Render to SVG or PNG/JPEG/BMP with title, axis labels and legend
//! - Japanese-capable font auto-detection
//!
//! ### Example
//! ```no_run
//! use mekko_rs::{CategoryColorMap, input, layout, viz};
//! use std::collections::BTreeMap;
//!
//! let records = input::read_records("sales.csv")?;
//! let colors = CategoryColorMap::default_for(input::distinct_categories(&records));
//! let chart = layout::layout(&records, &colors)?;
//! let cosmetics = viz::Cosmetics {
//!     title: "Sales".into(),
//!     legend: layout::legend_entries(&colors),
//!     ..Default::default()
//! };
//! viz::render(&chart, &BTreeMap::new(), &cosmetics, "sales.png")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod input;
pub mod layout;
pub mod models;
pub mod style;
pub mod viz;

pub use config::ChartConfig;
pub use error::{ConfigError, InputError, LayoutError, MekkoError, RenderError};
pub use models::{AxisPartition, GroupSpan, Layout, PlacedRectangle, Record};
pub use style::{CategoryColorMap, Rgb8};

use std::collections::BTreeMap;
use std::path::Path;

/// Read `input`, lay it out with the default palette plus the configured
/// color overrides, and render to `cfg.output_path()`.
///
/// The output directory must already exist.
pub fn draw_chart<P: AsRef<Path>>(
    input: P,
    cfg: &ChartConfig,
) -> Result<viz::RenderReport, MekkoError> {
    let records = input::read_records(input)?;
    let colors = cfg.color_map_for(&input::distinct_categories(&records))?;
    let chart = layout::layout(&records, &colors)?;
    let cosmetics = viz::Cosmetics::from_config(cfg, &colors);
    Ok(viz::render(
        &chart,
        &BTreeMap::new(),
        &cosmetics,
        cfg.output_path(),
    )?)
}
