use std::time::{SystemTime, UNIX_EPOCH};

use metalbridge_core::{
    DerivedSignals, GpuStats, MetricsSnapshot, ProbeAvailability, ProbeCommand, ThermalStats,
};

use crate::probes::ProbeCollection;

const PINNED_MIN_ACTIVE_PCT: f64 = 95.0;
const PINNED_MAX_IDLE_PCT: f64 = 2.0;

/// GPU is saturated: at least 95% active and at most 2% idle. Unknown
/// residency never counts as pinned.
pub fn is_gpu_pinned(gpu: &GpuStats) -> bool {
    match (gpu.active_pct, gpu.idle_pct) {
        (Some(active), Some(idle)) => active >= PINNED_MIN_ACTIVE_PCT && idle <= PINNED_MAX_IDLE_PCT,
        _ => false,
    }
}

/// Advisories in a fixed order. Each condition is checked independently.
pub fn build_warnings(
    gpu: &GpuStats,
    thermal: &ThermalStats,
    power_state: &ProbeCommand,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if gpu.is_unreadable() {
        warnings.push(
            "GPU frequency and power unavailable: powermetrics likely requires elevated privileges (run with sudo)"
                .to_string(),
        );
    }

    if !thermal.source.pmset_ok {
        warnings.push(format!(
            "`{}` failed: CPU speed limit and thermal warning level unavailable",
            power_state
        ));
    }

    if thermal.source.temperatures_unavailable() {
        warnings.push(
            "Die temperature sensors unavailable on this platform/OS combination (SMC sampler and sensor helper both failed)"
                .to_string(),
        );
    }

    warnings
}

pub fn build_snapshot(collection: &ProbeCollection, power_state: &ProbeCommand) -> MetricsSnapshot {
    build_snapshot_at(collection, power_state, now_ms())
}

pub fn build_snapshot_at(
    collection: &ProbeCollection,
    power_state: &ProbeCommand,
    timestamp: u64,
) -> MetricsSnapshot {
    let gpu = collection.gpu.stats;
    let thermal = collection.thermal.stats;

    MetricsSnapshot {
        timestamp,
        gpu,
        memory: collection.memory.stats,
        thermal,
        perf: collection.perf.stats,
        derived: DerivedSignals {
            gpu_pinned: is_gpu_pinned(&gpu),
        },
        available: ProbeAvailability {
            gpu: collection.gpu.ok,
            memory: collection.memory.ok,
            thermal: collection.thermal.ok,
            perf: collection.perf.ok,
        },
        warnings: build_warnings(&gpu, &thermal, power_state),
    }
}

/// Debug text for `/raw`: GPU, memory and thermal sections in that order
pub fn raw_report(collection: &ProbeCollection) -> String {
    [
        collection.gpu.raw.as_str(),
        collection.memory.raw.as_str(),
        collection.thermal.raw.as_str(),
    ]
    .join("\n\n")
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
