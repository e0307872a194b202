use std::sync::Arc;

use metalbridge_core::{
    GpuStats, MemoryStats, MetricsSnapshot, PerfStats, ProbeCommand, ProbeConfig, ProbeResult,
    ThermalSources, ThermalStats,
};
use tracing::{debug, instrument};

use crate::aggregate;
use crate::parsers::{
    classify_pressure, parse_die_temperatures, parse_gpu, parse_swap_gb, parse_thermal_limits,
};
use crate::runner::{CommandOutput, CommandRunner};

/// One request's worth of probe results, captured concurrently
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeCollection {
    pub gpu: ProbeResult<GpuStats>,
    pub memory: ProbeResult<MemoryStats>,
    pub thermal: ProbeResult<ThermalStats>,
    pub perf: ProbeResult<PerfStats>,
}

/// Fans out to every metric family's commands and parses what comes back.
///
/// Holds no state between calls: each `collect` spawns its own processes.
/// Concurrent callers therefore multiply subprocess spawns; nothing here
/// debounces or caches.
pub struct Prober {
    runner: Arc<dyn CommandRunner>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new(runner: Arc<dyn CommandRunner>, config: ProbeConfig) -> Self {
        Self { runner, config }
    }

    #[instrument(skip(self))]
    pub async fn probe_gpu(&self) -> ProbeResult<GpuStats> {
        let command = &self.config.gpu_sampler;
        let out = self.runner.run(command).await;
        let stats = parse_gpu(&out.combined());
        debug!(ok = out.ok, unreadable = stats.is_unreadable(), "GPU probe done");

        ProbeResult {
            ok: out.ok,
            raw: section(command, &out),
            stats,
        }
    }

    /// Pressure and swap are queried concurrently. Either failing marks the
    /// probe degraded, though whatever was parsed is still returned.
    #[instrument(skip(self))]
    pub async fn probe_memory(&self) -> ProbeResult<MemoryStats> {
        let (pressure, swap) = tokio::join!(
            self.runner.run(&self.config.memory_pressure),
            self.runner.run(&self.config.swap_usage),
        );

        let text = format!("{}\n{}", pressure.combined(), swap.combined());
        let stats = MemoryStats {
            pressure: classify_pressure(&text),
            swap_gb: parse_swap_gb(&text),
        };
        debug!(
            pressure = stats.pressure.label(),
            swap_gb = ?stats.swap_gb,
            "Memory probe done"
        );

        ProbeResult {
            ok: pressure.ok && swap.ok,
            raw: [
                section(&self.config.memory_pressure, &pressure),
                section(&self.config.swap_usage, &swap),
            ]
            .join("\n\n"),
            stats,
        }
    }

    /// pmset, the SMC sampler and the sensor helper are redundant views of
    /// the same hardware, so any one succeeding makes the probe usable.
    #[instrument(skip(self))]
    pub async fn probe_thermal(&self) -> ProbeResult<ThermalStats> {
        let (power, smc, helper) = tokio::join!(
            self.runner.run(&self.config.power_state),
            self.runner.run(&self.config.smc_sampler),
            self.runner.run(&self.config.sensor_helper),
        );

        let text = format!("{}\n{}", power.combined(), smc.combined());
        let limits = parse_thermal_limits(&text);
        let temps = parse_die_temperatures(&text).or_sensor_helper(helper.ok, &helper.stdout);
        let source = ThermalSources {
            pmset_ok: power.ok,
            smc_ok: smc.ok,
            sensor_helper_ok: helper.ok,
        };
        debug!(
            pressure = limits.thermal_pressure.label(),
            pmset_ok = source.pmset_ok,
            smc_ok = source.smc_ok,
            sensor_helper_ok = source.sensor_helper_ok,
            "Thermal probe done"
        );

        ProbeResult {
            ok: source.any_ok(),
            raw: [
                section(&self.config.power_state, &power),
                section(&self.config.smc_sampler, &smc),
                section(&self.config.sensor_helper, &helper),
            ]
            .join("\n\n"),
            stats: ThermalStats {
                cpu_speed_limit_pct: limits.cpu_speed_limit_pct,
                gpu_speed_limit_pct: limits.gpu_speed_limit_pct,
                thermal_pressure: limits.thermal_pressure,
                cpu_temp_c: temps.cpu_c,
                gpu_temp_c: temps.gpu_c,
                soc_temp_c: temps.soc_c,
                source,
            },
        }
    }

    /// No workload instrumentation exists yet; nothing is spawned
    pub async fn probe_perf(&self) -> ProbeResult<PerfStats> {
        ProbeResult {
            ok: true,
            raw: String::new(),
            stats: PerfStats::default(),
        }
    }

    pub async fn collect(&self) -> ProbeCollection {
        let (gpu, memory, thermal, perf) = tokio::join!(
            self.probe_gpu(),
            self.probe_memory(),
            self.probe_thermal(),
            self.probe_perf(),
        );
        ProbeCollection {
            gpu,
            memory,
            thermal,
            perf,
        }
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let collection = self.collect().await;
        aggregate::build_snapshot(&collection, &self.config.power_state)
    }

    pub async fn raw_report(&self) -> String {
        aggregate::raw_report(&self.collect().await)
    }
}

fn section(command: &ProbeCommand, out: &CommandOutput) -> String {
    format!("=== {} ===\n{}", command, out.combined())
}
