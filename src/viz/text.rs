//! Text measurement and font registration for the `ab_glyph` text path.

use plotters::style::{FontFamily, FontStyle, FontTransform, TextStyle};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeSet;
use std::sync::Mutex;
use unicode_width::UnicodeWidthStr;

use crate::font::{FontChoice, FontResolutionWarning, FontResolver};

/// Heuristic: estimate pixel width of one line of text (Plotters has no
/// built-in text measuring). East Asian wide characters count double.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.width() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

pub fn line_height_px(font_px: u32) -> u32 {
    ((font_px as f32) * 1.2).ceil() as u32
}

/// Width and height of a possibly multi-line text block.
pub fn text_block_size(text: &str, font_px: u32) -> (u32, u32) {
    let lines: Vec<&str> = text.lines().collect();
    let w = lines
        .iter()
        .map(|l| estimate_text_width_px(l, font_px))
        .max()
        .unwrap_or(0);
    (w, lines.len() as u32 * line_height_px(font_px))
}

/// Families already handed to plotters. `register_font` wants `'static`
/// bytes, so each family is leaked exactly once per process.
static REGISTERED: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

/// Name plotters resolves `FontFamily::SansSerif` to.
const DEFAULT_KEY: &str = "sans-serif";

fn register(key: &str, resolver: &dyn FontResolver, family: Option<&str>) -> bool {
    let mut registered = match REGISTERED.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    if registered.contains(key) {
        return true;
    }
    let Some(data) = resolver.font_data(family) else {
        return false;
    };
    let bytes: &'static [u8] = Box::leak(data.into_boxed_slice());
    if plotters::style::register_font(key, FontStyle::Normal, bytes).is_err() {
        log::warn!("font data for {key:?} could not be parsed");
        return false;
    }
    registered.insert(key.to_string());
    true
}

/// Font used for every text element of one render.
#[derive(Debug, Clone)]
pub struct ChartFont {
    /// `None` means `FontFamily::SansSerif`.
    family: Option<String>,
    /// Whether text is drawn at all.
    pub enabled: bool,
}

impl ChartFont {
    /// SVG output only names the family; the viewer does the lookup.
    pub fn for_svg(choice: &FontChoice, resolver: &dyn FontResolver) -> (Self, Option<FontResolutionWarning>) {
        let Some(family) = choice.family.as_deref() else {
            return (Self::sans_serif(), None);
        };
        if resolver.installed_families().iter().any(|f| f == family) {
            (Self { family: Some(family.to_string()), enabled: true }, None)
        } else {
            (
                Self::sans_serif(),
                Some(FontResolutionWarning::FamilyNotInstalled(family.to_string())),
            )
        }
    }

    /// Raster output needs the font bytes registered with plotters.
    pub fn for_raster(choice: &FontChoice, resolver: &dyn FontResolver) -> (Self, Vec<FontResolutionWarning>) {
        let mut warnings = Vec::new();
        if let Some(family) = choice.family.as_deref() {
            if register(family, resolver, Some(family)) {
                return (Self { family: Some(family.to_string()), enabled: true }, warnings);
            }
            warnings.push(FontResolutionWarning::FamilyNotInstalled(family.to_string()));
        }
        if register(DEFAULT_KEY, resolver, None) {
            return (Self::sans_serif(), warnings);
        }
        warnings.push(FontResolutionWarning::NoFontData);
        (Self { family: None, enabled: false }, warnings)
    }

    fn sans_serif() -> Self {
        Self { family: None, enabled: true }
    }

    pub fn family_name(&self) -> Option<&str> {
        self.family.as_deref()
    }

    fn family(&self) -> FontFamily<'_> {
        match &self.family {
            Some(f) => FontFamily::Name(f),
            None => FontFamily::SansSerif,
        }
    }

    /// Text style of `font_px` pixels anchored at `pos`.
    pub fn style(&self, font_px: u32, pos: Pos) -> TextStyle<'_> {
        TextStyle::from((self.family(), font_px)).pos(pos)
    }

    pub fn centered(&self, font_px: u32) -> TextStyle<'_> {
        self.style(font_px, Pos::new(HPos::Center, VPos::Center))
    }

    pub fn rotated(&self, font_px: u32) -> TextStyle<'_> {
        self.centered(font_px).transform(FontTransform::Rotate270)
    }
}
