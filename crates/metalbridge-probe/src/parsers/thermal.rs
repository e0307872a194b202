use std::sync::LazyLock;

use metalbridge_core::ThermalPressure;
use regex::Regex;

use crate::patterns::{case_insensitive, first_capture, first_number, NumericPattern, NUMBER};

const NO_THERMAL_EVENT: &str = "no thermal warning level has been recorded";
const NO_POWER_STATUS: &str = "no cpu power status has been recorded";
const UNTHROTTLED_PCT: f64 = 100.0;

/// Speed limits and pressure level, before temperatures are merged in
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermalLimits {
    pub cpu_speed_limit_pct: Option<f64>,
    pub gpu_speed_limit_pct: Option<f64>,
    pub thermal_pressure: ThermalPressure,
}

struct LimitPatterns {
    cpu: Vec<NumericPattern>,
    gpu: Vec<NumericPattern>,
    pressure: Vec<Regex>,
}

static PATTERNS: LazyLock<LimitPatterns> = LazyLock::new(|| LimitPatterns {
    cpu: vec![
        NumericPattern::verbatim(&format!(r"CPU_Speed_Limit\s*=\s*{NUMBER}")),
        NumericPattern::verbatim(&format!(r"CPU speed limit:?\s*{NUMBER}")),
    ],
    gpu: vec![
        NumericPattern::verbatim(&format!(r"GPU_Speed_Limit\s*=\s*{NUMBER}")),
        NumericPattern::verbatim(&format!(r"GPU speed limit:?\s*{NUMBER}")),
    ],
    // powermetrics thermal sampler, pmset summaries, and the older
    // "thermal level" wording
    pressure: vec![
        case_insensitive(r"current pressure level:\s*([a-z]+)"),
        case_insensitive(r"thermal pressure(?: level)?\s*[:=]\s*([a-z]+)"),
        case_insensitive(r"thermal (?:warning )?level\s*(?:set to|[:=])\s*([a-z]+)"),
    ],
});

fn classify(word: &str) -> ThermalPressure {
    let lower = word.to_lowercase();
    [
        ("critical", ThermalPressure::Critical),
        ("heavy", ThermalPressure::Heavy),
        ("moderate", ThermalPressure::Moderate),
        ("nominal", ThermalPressure::Nominal),
    ]
    .into_iter()
    .find(|(needle, _)| lower.contains(needle))
    .map(|(_, level)| level)
    .unwrap_or(ThermalPressure::Unknown)
}

/// Parse `pmset -g therm` and `powermetrics --samplers smc,thermal` output.
///
/// Missing values fall back to what the absence itself implies: pmset says
/// "no thermal warning level has been recorded" when the machine has never
/// throttled, and a GPU limit is only ever reported while throttled.
pub fn parse_thermal_limits(text: &str) -> ThermalLimits {
    let patterns = &*PATTERNS;
    let lower = text.to_lowercase();

    let cpu_speed_limit_pct = first_number(&patterns.cpu, text)
        .or_else(|| lower.contains(NO_POWER_STATUS).then_some(UNTHROTTLED_PCT));

    let gpu_speed_limit_pct = first_number(&patterns.gpu, text).or(Some(UNTHROTTLED_PCT));

    let thermal_pressure = match first_capture(&patterns.pressure, text) {
        Some(word) => classify(word),
        None if lower.contains(NO_THERMAL_EVENT) => ThermalPressure::Nominal,
        None => ThermalPressure::Unknown,
    };

    ThermalLimits {
        cpu_speed_limit_pct,
        gpu_speed_limit_pct,
        thermal_pressure,
    }
}
