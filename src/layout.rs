//! Mekko layout: turn `(group, category, value)` records into stacked,
//! area-proportional rectangles on the unit square.
//!
//! - Column width = group total / grand total
//! - Segment height = category value / group total
//! - Groups run left to right and categories bottom to top, both in ascending
//!   name order, so the result does not depend on input row order.
//! - Duplicate `(group, category)` rows are summed into one segment.
//!
//! Ratios come straight from the division. They are never clamped or
//! renormalized, so the last edge may miss 1.0 by a few ulps.

use crate::error::{LayoutError, TotalScope};
use crate::models::{
    AxisPartition, GroupSpan, GroupTotal, Layout, LegendEntry, PlacedRectangle, Record,
};
use crate::style::CategoryColorMap;
use std::collections::BTreeMap;

/// Compute the chart layout. `colors` is only read.
///
/// # Errors
/// - [`LayoutError::EmptyInput`] for no records
/// - [`LayoutError::InvalidValue`] for a negative or non-finite value
/// - [`LayoutError::DegenerateTotals`] when the grand total or a group total
///   is zero or overflows to infinity
pub fn layout(records: &[Record], colors: &CategoryColorMap) -> Result<Layout, LayoutError> {
    if records.is_empty() {
        return Err(LayoutError::EmptyInput);
    }

    // group -> category -> summed value
    let mut cells: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for r in records {
        if !r.value.is_finite() || r.value < 0.0 {
            return Err(LayoutError::InvalidValue {
                group: r.group.clone(),
                category: r.category.clone(),
                value: r.value,
            });
        }
        *cells
            .entry(r.group.as_str())
            .or_default()
            .entry(r.category.as_str())
            .or_default() += r.value;
    }

    let sums: Vec<f64> = cells.values().map(|c| c.values().sum::<f64>()).collect();
    let grand_total: f64 = sums.iter().sum();
    if !grand_total.is_finite() || grand_total <= 0.0 {
        return Err(LayoutError::DegenerateTotals {
            scope: TotalScope::Grand,
            total: grand_total,
        });
    }

    let mut groups = Vec::with_capacity(cells.len());
    let mut spans = Vec::with_capacity(cells.len());
    let mut rectangles = Vec::with_capacity(records.len());
    let mut x = 0.0;

    for ((group, categories), &sum_value) in cells.iter().zip(&sums) {
        if !sum_value.is_finite() || sum_value <= 0.0 {
            return Err(LayoutError::DegenerateTotals {
                scope: TotalScope::Group(group.to_string()),
                total: sum_value,
            });
        }
        let global_ratio = sum_value / grand_total;

        let mut y = 0.0;
        for (category, value) in categories {
            let local_ratio = value / sum_value;
            rectangles.push(PlacedRectangle {
                group: group.to_string(),
                x,
                width: global_ratio,
                y_bottom: y,
                height: local_ratio,
                color: colors.resolve(category),
                label: category.to_string(),
                display_text: format!("{category}\n({})", format_percent(local_ratio)),
            });
            y += local_ratio;
        }

        groups.push(GroupTotal {
            group: group.to_string(),
            sum_value,
            global_ratio,
        });
        spans.push(GroupSpan {
            group: group.to_string(),
            x_start: x,
            width: global_ratio,
        });
        x += global_ratio;
    }

    log::debug!(
        "layout: {} records -> {} groups, {} rectangles (grand total {grand_total})",
        records.len(),
        groups.len(),
        rectangles.len()
    );

    Ok(Layout {
        grand_total,
        groups,
        partition: AxisPartition::from_spans(spans),
        rectangles,
    })
}

/// Legend rows: every category of the color map in ascending order, whether
/// or not it occurs in the current data.
pub fn legend_entries(colors: &CategoryColorMap) -> Vec<LegendEntry> {
    colors
        .iter()
        .map(|(label, color)| LegendEntry {
            label: label.to_string(),
            color,
        })
        .collect()
}

/// Ratio as a percentage with one decimal, e.g. `0.123 -> "12.3%"`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
