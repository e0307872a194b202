use std::collections::HashMap;
use std::sync::LazyLock;

use crate::patterns::{first_number, NumericPattern, SIGNED_NUMBER};

/// Die temperatures in Celsius
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DieTemperatures {
    pub cpu_c: Option<f64>,
    pub gpu_c: Option<f64>,
    pub soc_c: Option<f64>,
}

impl DieTemperatures {
    pub fn is_empty(&self) -> bool {
        self.cpu_c.is_none() && self.gpu_c.is_none() && self.soc_c.is_none()
    }

    /// Fill every die from the sensor helper when the primary source had
    /// nothing at all.
    ///
    /// The helper's sensor set does not map onto die regions, so the hottest
    /// reading stands in for all three.
    pub fn or_sensor_helper(self, helper_ok: bool, helper_stdout: &str) -> Self {
        if !self.is_empty() || !helper_ok {
            return self;
        }
        match parse_sensor_helper(helper_stdout) {
            Some(hottest) => Self {
                cpu_c: Some(hottest),
                gpu_c: Some(hottest),
                soc_c: Some(hottest),
            },
            None => self,
        }
    }
}

struct TemperaturePatterns {
    cpu: Vec<NumericPattern>,
    gpu: Vec<NumericPattern>,
    soc: Vec<NumericPattern>,
}

fn labelled(labels: &[&str]) -> Vec<NumericPattern> {
    labels
        .iter()
        .map(|label| NumericPattern::verbatim(&format!(r"{label}\s*[:=]\s*{SIGNED_NUMBER}\s*°?\s*C\b")))
        .collect()
}

static PATTERNS: LazyLock<TemperaturePatterns> = LazyLock::new(|| TemperaturePatterns {
    cpu: labelled(&["CPU die temperature", "CPU temperature", "CPU die temp"]),
    gpu: labelled(&["GPU die temperature", "GPU temperature", "GPU die temp"]),
    soc: labelled(&[
        "SOC die temperature",
        "SOC temperature",
        "System[- ]on[- ]chip temperature",
    ]),
});

pub fn parse_die_temperatures(text: &str) -> DieTemperatures {
    let patterns = &*PATTERNS;
    DieTemperatures {
        cpu_c: first_number(&patterns.cpu, text),
        gpu_c: first_number(&patterns.gpu, text),
        soc_c: first_number(&patterns.soc, text),
    }
}

/// Hottest reading from the helper's `{"label": celsius, ...}` output.
/// Anything that is not a flat object of numbers yields `None`.
pub fn parse_sensor_helper(stdout: &str) -> Option<f64> {
    let readings: HashMap<String, f64> = serde_json::from_str(stdout.trim()).ok()?;
    readings.into_values().reduce(f64::max)
}
