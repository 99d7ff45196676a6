//! Error types returned by the library. The `mekko` binary wraps these in
//! `anyhow` for reporting.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::style::StyleError;

/// Reading the input CSV.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("input contains no rows")]
    Empty,
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Which total turned out to be zero or negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalScope {
    Grand,
    Group(String),
}

impl fmt::Display for TotalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalScope::Grand => f.write_str("grand total"),
            TotalScope::Group(g) => write!(f, "total of group {g:?}"),
        }
    }
}

/// Computing the chart layout.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("no records to lay out")]
    EmptyInput,
    #[error("invalid value {value} for ({group:?}, {category:?}): values must be finite and non-negative")]
    InvalidValue {
        group: String,
        category: String,
        value: f64,
    },
    #[error("{scope} is {total}; ratios are undefined")]
    DegenerateTotals { scope: TotalScope, total: f64 },
}

/// Writing the chart image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("output directory does not exist: {}", path.display())]
    PathNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported output format {0:?} (use svg, png, jpg, jpeg or bmp)")]
    UnsupportedFormat(String),
}

/// Loading a [`crate::ChartConfig`] file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything [`crate::draw_chart`] can fail with.
#[derive(Debug, Error)]
pub enum MekkoError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
