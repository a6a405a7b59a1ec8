//! Shield badge classification and url/markdown construction

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker suffix appended to the subject in the badge alt-text.
pub const BADGE_MARKER: &str = "-shield-badge-1";

const SHIELDS_BASE_URL: &str = "https://img.shields.io/badge";

/// Characters left untouched by URI component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Coverage tier of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for ColorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorTier::Low => "low",
            ColorTier::Medium => "medium",
            ColorTier::High => "high",
        };
        f.write_str(name)
    }
}

/// Color names used by shields.io for each tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub low: &'static str,
    pub medium: &'static str,
    pub high: &'static str,
}

/// Default red / yellow / brightgreen mapping.
pub const DEFAULT_PALETTE: Palette = Palette {
    low: "red",
    medium: "yellow",
    high: "brightgreen",
};

impl Palette {
    pub fn color(&self, tier: ColorTier) -> &'static str {
        match tier {
            ColorTier::Low => self.low,
            ColorTier::Medium => self.medium,
            ColorTier::High => self.high,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        DEFAULT_PALETTE
    }
}

/// Low/high threshold pair, `low <= high`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Thresholds {
    pub const DEFAULT: Thresholds = Thresholds { low: 50.0, high: 80.0 };

    /// Build a threshold pair, rejecting non-finite or descending values.
    pub fn new(low: f64, high: f64) -> Option<Self> {
        if low.is_finite() && high.is_finite() && low <= high {
            Some(Self { low, high })
        } else {
            None
        }
    }

    /// Both comparisons are inclusive: `high` itself is high, `low` itself is medium.
    pub fn classify(&self, percentage: f64) -> ColorTier {
        if percentage >= self.high {
            ColorTier::High
        } else if percentage >= self.low {
            ColorTier::Medium
        } else {
            ColorTier::Low
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Percent-encode a subject the way `encodeURIComponent` does.
pub fn encode_subject(subject: &str) -> String {
    utf8_percent_encode(subject, URI_COMPONENT).to_string()
}

/// `https://img.shields.io/badge/<subject>-<pct>%25-<color>.svg`
pub fn badge_url(percentage: f64, subject: &str, color: &str) -> String {
    format!(
        "{}/{}-{}%25-{}.svg",
        SHIELDS_BASE_URL,
        encode_subject(subject),
        percentage,
        color
    )
}

/// `![<subject>-shield-badge-1](<url>)`, subject left raw.
pub fn badge_markdown(subject: &str, url: &str) -> String {
    format!("![{}{}]({})", subject, BADGE_MARKER, url)
}

/// A fully built badge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub percentage: f64,
    pub tier: ColorTier,
    pub url: String,
    pub markdown: String,
}

impl Badge {
    pub fn build(percentage: f64, subject: &str, thresholds: &Thresholds, palette: &Palette) -> Self {
        let tier = thresholds.classify(percentage);
        let url = badge_url(percentage, subject, palette.color(tier));
        let markdown = badge_markdown(subject, &url);

        Self {
            percentage,
            tier,
            url,
            markdown,
        }
    }

    /// Contents of the badge artifact: url, then markdown.
    pub fn artifact_contents(&self) -> String {
        format!("{}\n{}", self.url, self.markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    fn url_for(percentage: f64, subject: &str, thresholds: Thresholds) -> String {
        Badge::build(percentage, subject, &thresholds, &DEFAULT_PALETTE).url
    }

    #[test]
    fn test_classify_boundaries() {
        let t = Thresholds::DEFAULT;
        assert_eq!(t.classify(0.0), ColorTier::Low);
        assert_eq!(t.classify(49.99), ColorTier::Low);
        assert_eq!(t.classify(50.0), ColorTier::Medium);
        assert_eq!(t.classify(60.0), ColorTier::Medium);
        assert_eq!(t.classify(79.99), ColorTier::Medium);
        assert_eq!(t.classify(80.0), ColorTier::High);
        assert_eq!(t.classify(100.0), ColorTier::High);
    }

    #[test]
    fn test_classify_equal_thresholds() {
        let t = Thresholds::new(70.0, 70.0).unwrap();
        assert_eq!(t.classify(69.9), ColorTier::Low);
        assert_eq!(t.classify(70.0), ColorTier::High);
    }

    #[test]
    fn test_thresholds_rejects_invalid_pairs() {
        assert!(Thresholds::new(80.0, 50.0).is_none());
        assert!(Thresholds::new(f64::NAN, 50.0).is_none());
        assert!(Thresholds::new(10.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_red_badge() {
        assert_eq!(
            url_for(0.0, "coverage", Thresholds::DEFAULT),
            "https://img.shields.io/badge/coverage-0%25-red.svg"
        );
    }

    #[test]
    fn test_yellow_badge() {
        assert_eq!(
            url_for(60.0, "coverage", Thresholds::DEFAULT),
            "https://img.shields.io/badge/coverage-60%25-yellow.svg"
        );
    }

    #[test]
    fn test_brightgreen_badge() {
        assert_eq!(
            url_for(80.0, "coverage", Thresholds::DEFAULT),
            "https://img.shields.io/badge/coverage-80%25-brightgreen.svg"
        );
    }

    #[test]
    fn test_custom_range() {
        let t = Thresholds::new(75.0, 90.0).unwrap();
        assert_eq!(
            url_for(80.0, "coverage", t),
            "https://img.shields.io/badge/coverage-80%25-yellow.svg"
        );
    }

    #[test]
    fn test_percentage_kept_verbatim() {
        assert_eq!(
            url_for(33.33, "coverage", Thresholds::DEFAULT),
            "https://img.shields.io/badge/coverage-33.33%25-red.svg"
        );
    }

    #[test]
    fn test_subject_is_uri_encoded() {
        assert_eq!(encode_subject("Test %-_/"), "Test%20%25-_%2F");
        assert_eq!(
            url_for(0.0, "Test %-_/", Thresholds::DEFAULT),
            "https://img.shields.io/badge/Test%20%25-_%2F-0%25-red.svg"
        );
        assert_eq!(encode_subject("a!~*'()b"), "a!~*'()b");
        assert_eq!(encode_subject("é?#&"), "%C3%A9%3F%23%26");
    }

    #[test]
    fn test_encoded_subject_decodes_back() {
        for subject in ["coverage", "Test %-_/", "Local Coverage", "ünïcode/?&=#"] {
            let encoded = encode_subject(subject);
            let decoded = percent_decode_str(&encoded).decode_utf8().unwrap();
            assert_eq!(decoded, subject);
        }
    }

    #[test]
    fn test_badge_markdown() {
        let t = Thresholds::new(75.0, 90.0).unwrap();
        let badge = Badge::build(80.0, "test", &t, &DEFAULT_PALETTE);
        assert_eq!(
            badge.markdown,
            "![test-shield-badge-1](https://img.shields.io/badge/test-80%25-yellow.svg)"
        );
        assert_eq!(badge.tier, ColorTier::Medium);
        assert_eq!(
            badge.artifact_contents(),
            format!("{}\n{}", badge.url, badge.markdown)
        );
    }

    #[test]
    fn test_markdown_keeps_raw_subject() {
        assert_eq!(badge_markdown("a b/%", "u"), "![a b/%-shield-badge-1](u)");
    }
}
