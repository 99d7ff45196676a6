//! Font selection for chart text.
//!
//! Scanning installed fonts is I/O, so it sits behind [`FontResolver`]. The
//! renderer takes any resolver; tests pass a fake one.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lower-case name fragments of families that can render Japanese text.
const CJK_MARKERS: [&str; 7] = [
    "japanese",
    "gothic",
    "meiryo",
    "yu gothic",
    "hiragino",
    "noto sans cjk",
    "mincho",
];

/// Tried in this order before falling back to the first detected match.
const PREFERRED_FAMILIES: [&str; 2] = ["Yu Gothic", "Meiryo"];

/// Requested font setting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontPreference {
    /// Pick an installed CJK-capable family.
    #[default]
    Auto,
    /// Platform default sans-serif.
    Default,
    /// Use this family name as given.
    Named(String),
}

impl FromStr for FontPreference {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Ok(if t.eq_ignore_ascii_case("auto") {
            FontPreference::Auto
        } else if t.is_empty() || t.eq_ignore_ascii_case("default") {
            FontPreference::Default
        } else {
            FontPreference::Named(t.to_string())
        })
    }
}

impl fmt::Display for FontPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontPreference::Auto => f.write_str("auto"),
            FontPreference::Default => f.write_str("default"),
            FontPreference::Named(n) => f.write_str(n),
        }
    }
}

/// Non-fatal font problems; rendering continues with a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontResolutionWarning {
    #[error("no Japanese-capable font detected; using the default font")]
    NoCjkFont,
    #[error("font family {0:?} is not installed; using the default font")]
    FamilyNotInstalled(String),
    #[error("no usable font file found; text is omitted from raster output")]
    NoFontData,
}

/// Source of installed font families and their data.
pub trait FontResolver {
    /// Family names of all installed faces (may contain duplicates).
    fn installed_families(&self) -> Vec<String>;

    /// Font file bytes for `family`, or for the platform's default sans-serif
    /// face when `family` is `None`.
    fn font_data(&self, family: Option<&str>) -> Option<Vec<u8>>;
}

/// Outcome of [`resolve_font`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontChoice {
    pub family: Option<String>,
    pub warning: Option<FontResolutionWarning>,
}

/// Installed families whose name looks CJK-capable, sorted and distinct.
pub fn find_cjk_fonts(resolver: &dyn FontResolver) -> Vec<String> {
    let mut found: Vec<String> = resolver
        .installed_families()
        .into_iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            CJK_MARKERS.iter().any(|m| lower.contains(m))
        })
        .collect();
    found.sort();
    found.dedup();
    found
}

/// Turn a preference into a concrete family (or none for the default font).
pub fn resolve_font(preference: &FontPreference, resolver: &dyn FontResolver) -> FontChoice {
    match preference {
        FontPreference::Default => FontChoice::default(),
        FontPreference::Named(name) => FontChoice {
            family: Some(name.clone()),
            warning: None,
        },
        FontPreference::Auto => {
            let available = find_cjk_fonts(resolver);
            let family = PREFERRED_FAMILIES
                .iter()
                .find(|p| available.iter().any(|a| a == *p))
                .map(|p| p.to_string())
                .or_else(|| available.first().cloned());
            match family {
                Some(f) => {
                    log::debug!("auto font: {f} ({} candidates)", available.len());
                    FontChoice {
                        family: Some(f),
                        warning: None,
                    }
                }
                None => FontChoice {
                    family: None,
                    warning: Some(FontResolutionWarning::NoCjkFont),
                },
            }
        }
    }
}

/// Resolver backed by the fonts installed on this machine.
pub struct SystemFontResolver {
    db: fontdb::Database,
}

impl SystemFontResolver {
    /// Scans the system font directories.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("loaded {} system font faces", db.len());
        Self { db }
    }

    fn default_face(&self) -> Option<fontdb::ID> {
        use fontdb::{Family, Query};
        let candidates = [
            Family::SansSerif,
            Family::Name("DejaVu Sans"),
            Family::Name("Liberation Sans"),
            Family::Name("Noto Sans"),
            Family::Name("Arial"),
        ];
        candidates
            .iter()
            .find_map(|f| {
                self.db.query(&Query {
                    families: std::slice::from_ref(f),
                    ..Query::default()
                })
            })
            .or_else(|| self.db.faces().next().map(|f| f.id))
    }

    fn face_for_family(&self, family: &str) -> Option<fontdb::ID> {
        self.db.query(&fontdb::Query {
            families: &[fontdb::Family::Name(family)],
            ..fontdb::Query::default()
        })
    }
}

impl Default for SystemFontResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FontResolver for SystemFontResolver {
    fn installed_families(&self) -> Vec<String> {
        self.db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    fn font_data(&self, family: Option<&str>) -> Option<Vec<u8>> {
        let id = match family {
            Some(f) => self.face_for_family(f)?,
            None => self.default_face()?,
        };
        self.db.with_face_data(id, |data, _index| data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeResolver(Vec<&'static str>);

    impl FontResolver for FakeResolver {
        fn installed_families(&self) -> Vec<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
        fn font_data(&self, _family: Option<&str>) -> Option<Vec<u8>> {
            None
        }
    }

    #[test]
    fn preference_parsing() {
        assert_eq!("Auto".parse::<FontPreference>().unwrap(), FontPreference::Auto);
        assert_eq!("".parse::<FontPreference>().unwrap(), FontPreference::Default);
        assert_eq!(
            " Meiryo ".parse::<FontPreference>().unwrap(),
            FontPreference::Named("Meiryo".into())
        );
    }

    #[test]
    fn cjk_matches_are_case_insensitive_sorted_distinct() {
        let r = FakeResolver(vec![
            "DejaVu Sans",
            "Noto Sans CJK JP",
            "IPAGothic",
            "Noto Sans CJK JP",
            "MS Mincho",
            "TakaoPGothic",
        ]);
        assert_eq!(
            find_cjk_fonts(&r),
            vec!["IPAGothic", "MS Mincho", "Noto Sans CJK JP", "TakaoPGothic"]
        );
    }

    #[test]
    fn auto_prefers_yu_gothic_then_meiryo() {
        let r = FakeResolver(vec!["Meiryo", "Yu Gothic", "IPAGothic"]);
        let c = resolve_font(&FontPreference::Auto, &r);
        assert_eq!(c.family.as_deref(), Some("Yu Gothic"));

        let r = FakeResolver(vec!["Meiryo", "IPAGothic"]);
        let c = resolve_font(&FontPreference::Auto, &r);
        assert_eq!(c.family.as_deref(), Some("Meiryo"));

        let r = FakeResolver(vec!["TakaoPGothic", "IPAGothic"]);
        let c = resolve_font(&FontPreference::Auto, &r);
        assert_eq!(c.family.as_deref(), Some("IPAGothic"));
        assert!(c.warning.is_none());
    }

    #[test]
    fn auto_without_match_warns() {
        let r = FakeResolver(vec!["DejaVu Sans"]);
        let c = resolve_font(&FontPreference::Auto, &r);
        assert_eq!(c.family, None);
        assert_eq!(c.warning, Some(FontResolutionWarning::NoCjkFont));
    }

    #[test]
    fn named_and_default_pass_through() {
        let r = FakeResolver(vec![]);
        let c = resolve_font(&FontPreference::Named("Comic Neue".into()), &r);
        assert_eq!(c.family.as_deref(), Some("Comic Neue"));
        assert_eq!(resolve_font(&FontPreference::Default, &r), FontChoice::default());
    }
}
