//! Ordered fallback matching over free-text command output.
//!
//! Platform tools reword their output between OS releases, so each metric is
//! described by a list of patterns tried in priority order. The first pattern
//! that matches wins; later patterns are never consulted. Adding a new
//! wording variant means appending a pattern, not touching control flow.

use regex::{Regex, RegexBuilder};

/// Unsigned decimal number, captured as group 1 when spliced into a pattern
pub const NUMBER: &str = r"([0-9]+(?:\.[0-9]+)?)";

/// Signed decimal number, for temperatures
pub const SIGNED_NUMBER: &str = r"(-?[0-9]+(?:\.[0-9]+)?)";

pub fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("invalid probe output pattern")
}

/// A regex whose first capture group is a number, plus the unit conversion
/// applied to it
pub struct NumericPattern {
    regex: Regex,
    normalize: fn(f64) -> f64,
}

impl NumericPattern {
    pub fn new(pattern: &str, normalize: fn(f64) -> f64) -> Self {
        Self {
            regex: case_insensitive(pattern),
            normalize,
        }
    }

    /// Pattern whose value is already in the target unit
    pub fn verbatim(pattern: &str) -> Self {
        Self::new(pattern, identity)
    }

    pub fn extract(&self, text: &str) -> Option<f64> {
        let caps = self.regex.captures(text)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        Some((self.normalize)(value))
    }
}

fn identity(value: f64) -> f64 {
    value
}

pub fn watts_to_milliwatts(value: f64) -> f64 {
    value * 1000.0
}

/// Value of the first pattern in `patterns` that matches `text`
pub fn first_number(patterns: &[NumericPattern], text: &str) -> Option<f64> {
    patterns.iter().find_map(|p| p.extract(text))
}

/// Capture group 1 of the first regex in `patterns` that matches `text`
pub fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str())
}
