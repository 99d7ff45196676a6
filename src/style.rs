//! Category colors: an RGB type with hex (de)serialization, the default
//! palette, and the category → color map consulted by the layout engine.
//!
//! The map is an explicit value. The layout engine and the renderer only read
//! it; whoever owns it (the CLI, a GUI shell, …) builds it with
//! [`CategoryColorMap::default_for`] and applies user overrides with
//! [`CategoryColorMap::merge`] between calls.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` representation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("invalid color {0:?}: expected #rrggbb, #rgb or a basic color name")]
    InvalidColor(String),
}

impl FromStr for Rgb8 {
    type Err = StyleError;

    /// Accepts `#rrggbb`, `#rgb` (leading `#` optional) and a handful of
    /// basic names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Some(c) = named_color(t) {
            return Ok(c);
        }
        let hex = t.strip_prefix('#').unwrap_or(t);
        let bad = || StyleError::InvalidColor(s.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        match hex.len() {
            6 => {
                let v = u32::from_str_radix(hex, 16).map_err(|_| bad())?;
                Ok(Rgb8::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
            }
            3 => {
                let v = u16::from_str_radix(hex, 16).map_err(|_| bad())?;
                let expand = |n: u16| ((n & 0xF) as u8) * 17;
                Ok(Rgb8::new(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            _ => Err(bad()),
        }
    }
}

fn named_color(name: &str) -> Option<Rgb8> {
    let c = match name.to_ascii_lowercase().as_str() {
        "black" => Rgb8::new(0, 0, 0),
        "white" => Rgb8::new(255, 255, 255),
        "gray" | "grey" => NEUTRAL,
        "red" => Rgb8::new(255, 0, 0),
        "green" => Rgb8::new(0, 128, 0),
        "blue" => Rgb8::new(0, 0, 255),
        "orange" => Rgb8::new(255, 165, 0),
        "purple" => Rgb8::new(128, 0, 128),
        _ => return None,
    };
    Some(c)
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Color used for categories that have no entry in the map.
pub const NEUTRAL: Rgb8 = Rgb8::new(128, 128, 128);

/// Tableau 10 palette.
/// Order: blue, orange, green, red, purple, brown, pink, gray, olive, cyan.
const TAB10: [Rgb8; 10] = [
    Rgb8::new(31, 119, 180),  // #1f77b4
    Rgb8::new(255, 127, 14),  // #ff7f0e
    Rgb8::new(44, 160, 44),   // #2ca02c
    Rgb8::new(214, 39, 40),   // #d62728
    Rgb8::new(148, 103, 189), // #9467bd
    Rgb8::new(140, 86, 75),   // #8c564b
    Rgb8::new(227, 119, 194), // #e377c2
    Rgb8::new(127, 127, 127), // #7f7f7f
    Rgb8::new(188, 189, 34),  // #bcbd22
    Rgb8::new(23, 190, 207),  // #17becf
];

/// Pick color `idx` of `n` by sampling the palette evenly from its first to
/// its last entry. Fewer than ten categories therefore spread over the whole
/// palette instead of taking its first `n` entries.
pub fn sampled_color(idx: usize, n: usize) -> Rgb8 {
    if n <= 1 {
        return TAB10[0];
    }
    let t = idx as f64 / (n - 1) as f64;
    let slot = ((t * TAB10.len() as f64) as usize).min(TAB10.len() - 1);
    TAB10[slot]
}

/// Mapping from category name to fill color.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryColorMap(BTreeMap<String, Rgb8>);

impl CategoryColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default palette for a set of categories, assigned in sorted order.
    pub fn default_for<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = categories.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        let n = names.len();
        Self(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| (name, sampled_color(i, n)))
                .collect(),
        )
    }

    /// Parse a `{ "category": "#rrggbb", … }` table of hex strings.
    pub fn from_hex_table(table: &BTreeMap<String, String>) -> Result<Self, StyleError> {
        table
            .iter()
            .map(|(k, v)| Ok((k.clone(), v.parse::<Rgb8>()?)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }

    pub fn insert(&mut self, category: impl Into<String>, color: Rgb8) -> Option<Rgb8> {
        self.0.insert(category.into(), color)
    }

    /// Entries of `other` replace entries of `self`.
    pub fn merge(&mut self, other: &CategoryColorMap) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), *v);
        }
    }

    pub fn get(&self, category: &str) -> Option<Rgb8> {
        self.0.get(category).copied()
    }

    /// Lookup with the neutral fallback.
    pub fn resolve(&self, category: &str) -> Rgb8 {
        self.get(category).unwrap_or(NEUTRAL)
    }

    /// Entries in ascending category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb8)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Rgb8)> for CategoryColorMap {
    fn from_iter<T: IntoIterator<Item = (String, Rgb8)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!("#1f77b4".parse::<Rgb8>().unwrap(), Rgb8::new(31, 119, 180));
        assert_eq!("FF7F0E".parse::<Rgb8>().unwrap(), Rgb8::new(255, 127, 14));
        assert_eq!("#fff".parse::<Rgb8>().unwrap(), Rgb8::new(255, 255, 255));
        assert_eq!("gray".parse::<Rgb8>().unwrap(), NEUTRAL);
    }

    #[test]
    fn rejects_malformed_colors() {
        for bad in ["", "#12", "#12345g", "#1234567", "chartreuse-ish"] {
            assert!(bad.parse::<Rgb8>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn hex_roundtrip_is_lowercase() {
        let c = Rgb8::new(0xAB, 0x01, 0xFF);
        assert_eq!(c.to_hex(), "#ab01ff");
        assert_eq!(c.to_hex().parse::<Rgb8>().unwrap(), c);
    }

    #[test]
    fn palette_spreads_over_tab10() {
        assert_eq!(sampled_color(0, 1), TAB10[0]);
        // two categories take the first and the last palette entry
        assert_eq!(sampled_color(0, 2), TAB10[0]);
        assert_eq!(sampled_color(1, 2), TAB10[9]);
        // ten categories map one-to-one
        for i in 0..10 {
            assert_eq!(sampled_color(i, 10), TAB10[i]);
        }
    }

    #[test]
    fn default_map_is_sorted_and_deterministic() {
        let a = CategoryColorMap::default_for(["b", "a", "c", "a"]);
        let b = CategoryColorMap::default_for(["c", "b", "a"]);
        assert_eq!(a, b);
        let keys: Vec<&str> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(a.get("a"), Some(TAB10[0]));
    }

    #[test]
    fn merge_overrides_and_resolve_falls_back() {
        let mut base = CategoryColorMap::default_for(["A", "B"]);
        let mut user = CategoryColorMap::new();
        user.insert("B", Rgb8::new(1, 2, 3));
        base.merge(&user);
        assert_eq!(base.get("B"), Some(Rgb8::new(1, 2, 3)));
        assert_eq!(base.resolve("Z"), NEUTRAL);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let mut m = CategoryColorMap::new();
        m.insert("A", Rgb8::new(255, 0, 0));
        let s = serde_json::to_string(&m).unwrap();
        assert_eq!(s, r##"{"A":"#ff0000"}"##);
        let back: CategoryColorMap = serde_json::from_str(&s).unwrap();
        assert_eq!(back, m);
    }
}
