use std::fmt;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Basic color vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    White,
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
    /// No rule matched (grays, oranges, pastels, ...)
    Unknown,
}

impl ColorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorName::White => "white",
            ColorName::Black => "black",
            ColorName::Red => "red",
            ColorName::Green => "green",
            ColorName::Blue => "blue",
            ColorName::Yellow => "yellow",
            ColorName::Purple => "purple",
            ColorName::Cyan => "cyan",
            ColorName::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold rule in the naming table
#[derive(Clone, Copy)]
pub struct NamingRule {
    pub name: ColorName,
    pub matches: fn(u8, u8, u8) -> bool,
}

impl fmt::Debug for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingRule").field("name", &self.name).finish()
    }
}

/// Evaluated top to bottom, first match wins. The rules overlap, so order matters.
const RULES: &[NamingRule] = &[
    NamingRule {
        name: ColorName::White,
        matches: |r, g, b| r > 200 && g > 200 && b > 200,
    },
    NamingRule {
        name: ColorName::Black,
        matches: |r, g, b| r < 50 && g < 50 && b < 50,
    },
    NamingRule {
        name: ColorName::Red,
        matches: |r, g, b| r > 150 && g < 100 && b < 100,
    },
    NamingRule {
        name: ColorName::Green,
        matches: |r, g, b| r < 100 && g > 150 && b < 100,
    },
    NamingRule {
        name: ColorName::Blue,
        matches: |r, g, b| r < 100 && g < 100 && b > 150,
    },
    NamingRule {
        name: ColorName::Yellow,
        matches: |r, g, b| r > 150 && g > 150 && b < 100,
    },
    NamingRule {
        name: ColorName::Purple,
        matches: |r, g, b| r > 150 && g < 100 && b > 150,
    },
    NamingRule {
        name: ColorName::Cyan,
        matches: |r, g, b| r < 100 && g > 150 && b > 150,
    },
];

/// Maps RGB triples onto the basic color vocabulary
pub struct ColorNamer;

impl ColorNamer {
    /// The ordered rule table
    pub fn rules() -> &'static [NamingRule] {
        RULES
    }

    pub fn name(rgb: Srgb<u8>) -> ColorName {
        RULES
            .iter()
            .find(|rule| (rule.matches)(rgb.red, rgb.green, rgb.blue))
            .map(|rule| rule.name)
            .unwrap_or(ColorName::Unknown)
    }

    /// Checked variant for channel values that are not yet known to be in 0..=255
    pub fn name_channels(r: i64, g: i64, b: i64) -> Result<ColorName> {
        Ok(Self::name(checked_rgb(r, g, b)?))
    }
}

/// Validates raw channel values into an RGB triple
pub fn checked_rgb(r: i64, g: i64, b: i64) -> Result<Srgb<u8>> {
    let channel = |label: &str, v: i64| {
        u8::try_from(v).map_err(|_| {
            AnalysisError::invalid_input(format!(
                "{} channel {} is outside 0..=255",
                label, v
            ))
        })
    };
    Ok(Srgb::new(
        channel("red", r)?,
        channel("green", g)?,
        channel("blue", b)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_colors() {
        assert_eq!(ColorNamer::name(Srgb::new(255, 255, 255)), ColorName::White);
        assert_eq!(ColorNamer::name(Srgb::new(0, 0, 0)), ColorName::Black);
        assert_eq!(ColorNamer::name(Srgb::new(200, 0, 0)), ColorName::Red);
        assert_eq!(ColorNamer::name(Srgb::new(0, 200, 0)), ColorName::Green);
        assert_eq!(ColorNamer::name(Srgb::new(0, 0, 200)), ColorName::Blue);
        assert_eq!(ColorNamer::name(Srgb::new(200, 200, 0)), ColorName::Yellow);
        assert_eq!(ColorNamer::name(Srgb::new(200, 0, 200)), ColorName::Purple);
        assert_eq!(ColorNamer::name(Srgb::new(0, 200, 200)), ColorName::Cyan);
        assert_eq!(ColorNamer::name(Srgb::new(128, 128, 128)), ColorName::Unknown);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(ColorNamer::name(Srgb::new(201, 201, 201)), ColorName::White);
        assert_eq!(ColorNamer::name(Srgb::new(200, 200, 200)), ColorName::Unknown);
        assert_eq!(ColorNamer::name(Srgb::new(49, 49, 49)), ColorName::Black);
        assert_eq!(ColorNamer::name(Srgb::new(50, 49, 49)), ColorName::Unknown);
        assert_eq!(ColorNamer::name(Srgb::new(150, 0, 0)), ColorName::Unknown);
    }

    #[test]
    fn test_out_of_vocabulary_colors() {
        // light orange passes the yellow rule, deeper orange does not
        assert_eq!(ColorNamer::name(Srgb::new(255, 165, 0)), ColorName::Yellow);
        assert_eq!(ColorNamer::name(Srgb::new(255, 128, 0)), ColorName::Unknown);
        assert_eq!(ColorNamer::name(Srgb::new(100, 100, 100)), ColorName::Unknown);
        assert_eq!(ColorNamer::name(Srgb::new(255, 182, 193)), ColorName::Unknown);
    }

    #[test]
    fn test_rule_order() {
        let order: Vec<ColorName> = ColorNamer::rules().iter().map(|r| r.name).collect();
        assert_eq!(
            order,
            vec![
                ColorName::White,
                ColorName::Black,
                ColorName::Red,
                ColorName::Green,
                ColorName::Blue,
                ColorName::Yellow,
                ColorName::Purple,
                ColorName::Cyan,
            ]
        );
    }

    #[test]
    fn test_naming_is_pure() {
        let rgb = Srgb::new(30, 180, 170);
        let first = ColorNamer::name(rgb);
        for _ in 0..10 {
            assert_eq!(ColorNamer::name(rgb), first);
        }
        assert_eq!(first, ColorName::Cyan);
    }

    #[test]
    fn test_checked_channels() {
        assert_eq!(ColorNamer::name_channels(0, 200, 0).unwrap(), ColorName::Green);
        assert!(matches!(
            ColorNamer::name_channels(256, 0, 0),
            Err(AnalysisError::InvalidInput { .. })
        ));
        assert!(matches!(
            ColorNamer::name_channels(0, -1, 0),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(ColorName::Purple.to_string(), "purple");
        assert_eq!(serde_json::to_string(&ColorName::Unknown).unwrap(), "\"unknown\"");
    }
}
