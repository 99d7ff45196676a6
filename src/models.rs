use crate::style::Rgb8;
use serde::{Deserialize, Serialize};

/// One input row: `group,category,value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub group: String,
    pub category: String,
    pub value: f64,
}

impl Record {
    pub fn new(group: impl Into<String>, category: impl Into<String>, value: f64) -> Self {
        Self {
            group: group.into(),
            category: category.into(),
            value,
        }
    }
}

/// Aggregate of one group (one column of the chart).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupTotal {
    pub group: String,
    pub sum_value: f64,
    /// `sum_value / grand_total`; also the column width.
    pub global_ratio: f64,
}

/// Horizontal placement of one group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupSpan {
    pub group: String,
    pub x_start: f64,
    pub width: f64,
}

impl GroupSpan {
    pub fn x_end(&self) -> f64 {
        self.x_start + self.width
    }

    pub fn center(&self) -> f64 {
        self.x_start + self.width / 2.0
    }
}

/// Left-to-right partition of the unit interval into group spans.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AxisPartition {
    spans: Vec<GroupSpan>,
}

impl AxisPartition {
    pub(crate) fn from_spans(spans: Vec<GroupSpan>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[GroupSpan] {
        &self.spans
    }

    pub fn get(&self, group: &str) -> Option<&GroupSpan> {
        self.spans.iter().find(|s| s.group == group)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// One stacked segment in unit-square coordinates (origin bottom-left).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedRectangle {
    pub group: String,
    pub x: f64,
    pub width: f64,
    pub y_bottom: f64,
    /// Share of the category within its group (`local_ratio`).
    pub height: f64,
    pub color: Rgb8,
    pub label: String,
    /// Category name and percentage on two lines, e.g. `"A\n(30.0%)"`.
    pub display_text: String,
}

impl PlacedRectangle {
    pub fn y_top(&self) -> f64 {
        self.y_bottom + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y_bottom + self.height / 2.0)
    }
}

/// Complete output of the layout engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    pub grand_total: f64,
    pub groups: Vec<GroupTotal>,
    pub partition: AxisPartition,
    pub rectangles: Vec<PlacedRectangle>,
}

impl Layout {
    /// Rectangles of one group, bottom to top.
    pub fn rectangles_in<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a PlacedRectangle> {
        self.rectangles.iter().filter(move |r| r.group == group)
    }
}

/// One legend row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb8,
}
