use std::sync::LazyLock;

use metalbridge_core::MemoryPressure;
use regex::Regex;

use crate::patterns::{case_insensitive, NUMBER};

/// `kern.memorystatus_vm_pressure_level: 1` is the kernel's "normal" level
const NOMINAL_MARKER: &str = "level: 1";

/// Header printed by `memory_pressure -Q` when it reports nothing else
const FREE_PERCENTAGE_HEADER: &str = "memory free percentage";

/// Substring rules in priority order, evaluated against lower-cased output.
/// The first rule with any matching needle decides the level.
const PRESSURE_RULES: &[(&[&str], MemoryPressure)] = &[
    (&["critical", "red"], MemoryPressure::Red),
    (&["warn", "yellow"], MemoryPressure::Yellow),
    (&["normal", "green", NOMINAL_MARKER], MemoryPressure::Green),
    (&[FREE_PERCENTAGE_HEADER], MemoryPressure::Green),
];

static SWAP_USED: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive(&format!(r"used\s*=\s*{NUMBER}\s*([MG])")));

pub fn classify_pressure(text: &str) -> MemoryPressure {
    let lower = text.to_lowercase();
    PRESSURE_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, level)| *level)
        .unwrap_or(MemoryPressure::Unknown)
}

/// Swap in use from `sysctl vm.swapusage`, in gigabytes
pub fn parse_swap_gb(text: &str) -> Option<f64> {
    let caps = SWAP_USED.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2)?.as_str() {
        "M" | "m" => Some(value / 1024.0),
        _ => Some(value),
    }
}
