use serde::{Deserialize, Serialize};

use crate::system::{GpuStats, MemoryStats, PerfStats, ThermalStats};

/// Outcome of one probe: parsed stats, the raw text they came from, and
/// whether the underlying command(s) exited cleanly.
///
/// `ok` tracks exit status only. A command can succeed and still print
/// nothing the parsers recognise, which yields all-null stats with `ok=true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult<T> {
    pub ok: bool,
    pub raw: String,
    pub stats: T,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSignals {
    pub gpu_pinned: bool,
}

/// Per-probe `ok` flags carried alongside the stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeAvailability {
    pub gpu: bool,
    pub memory: bool,
    pub thermal: bool,
    pub perf: bool,
}

/// The document served at `/metrics`. Built once per request and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub gpu: GpuStats,
    pub memory: MemoryStats,
    pub thermal: ThermalStats,
    pub perf: PerfStats,
    pub derived: DerivedSignals,
    pub available: ProbeAvailability,
    pub warnings: Vec<String>,
}
