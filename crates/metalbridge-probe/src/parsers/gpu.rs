use std::sync::LazyLock;

use metalbridge_core::GpuStats;

use crate::patterns::{first_number, watts_to_milliwatts, NumericPattern, NUMBER};

struct GpuPatterns {
    freq_mhz: Vec<NumericPattern>,
    active_pct: Vec<NumericPattern>,
    idle_pct: Vec<NumericPattern>,
    power_mw: Vec<NumericPattern>,
}

// Apple silicon prints "GPU HW active ...", Intel Macs drop the "HW"
static PATTERNS: LazyLock<GpuPatterns> = LazyLock::new(|| GpuPatterns {
    freq_mhz: vec![NumericPattern::verbatim(&format!(
        r"GPU (?:HW )?active frequency:\s*{NUMBER}\s*MHz"
    ))],
    active_pct: vec![NumericPattern::verbatim(&format!(
        r"GPU (?:HW )?active residency:\s*{NUMBER}\s*%"
    ))],
    idle_pct: vec![NumericPattern::verbatim(&format!(
        r"GPU idle residency:\s*{NUMBER}\s*%"
    ))],
    power_mw: vec![
        NumericPattern::verbatim(&format!(r"GPU Power:\s*{NUMBER}\s*mW")),
        NumericPattern::new(&format!(r"GPU Power:\s*{NUMBER}\s*W\b"), watts_to_milliwatts),
    ],
});

pub fn parse_gpu(text: &str) -> GpuStats {
    let patterns = &*PATTERNS;
    GpuStats {
        freq_mhz: first_number(&patterns.freq_mhz, text),
        active_pct: first_number(&patterns.active_pct, text),
        idle_pct: first_number(&patterns.idle_pct, text),
        power_mw: first_number(&patterns.power_mw, text),
    }
}
