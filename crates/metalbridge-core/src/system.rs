//! Hardware metric types reported by the probes.
//!
//! Every field is always serialized. Values the host did not report are
//! `null` (or the `unknown` variant for classified levels), never omitted.

use serde::{Deserialize, Serialize};

/// GPU residency and power, as sampled by `powermetrics --samplers gpu_power`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuStats {
    pub freq_mhz: Option<f64>,
    pub active_pct: Option<f64>,
    pub idle_pct: Option<f64>,
    pub power_mw: Option<f64>,
}

impl GpuStats {
    /// True when neither frequency nor power could be read, which on macOS
    /// almost always means `powermetrics` ran without root.
    pub fn is_unreadable(&self) -> bool {
        self.freq_mhz.is_none() && self.power_mw.is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPressure {
    Green,
    Yellow,
    Red,
    #[default]
    Unknown,
}

impl MemoryPressure {
    pub fn label(&self) -> &'static str {
        match self {
            MemoryPressure::Green => "green",
            MemoryPressure::Yellow => "yellow",
            MemoryPressure::Red => "red",
            MemoryPressure::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub pressure: MemoryPressure,
    pub swap_gb: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermalPressure {
    Nominal,
    Moderate,
    Heavy,
    Critical,
    #[default]
    Unknown,
}

impl ThermalPressure {
    pub fn label(&self) -> &'static str {
        match self {
            ThermalPressure::Nominal => "nominal",
            ThermalPressure::Moderate => "moderate",
            ThermalPressure::Heavy => "heavy",
            ThermalPressure::Critical => "critical",
            ThermalPressure::Unknown => "unknown",
        }
    }
}

/// Which of the redundant thermal sources produced a successful exit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalSources {
    pub pmset_ok: bool,
    pub smc_ok: bool,
    pub sensor_helper_ok: bool,
}

impl ThermalSources {
    pub fn any_ok(&self) -> bool {
        self.pmset_ok || self.smc_ok || self.sensor_helper_ok
    }

    /// True when neither temperature source (SMC sampler, sensor helper) worked
    pub fn temperatures_unavailable(&self) -> bool {
        !self.smc_ok && !self.sensor_helper_ok
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalStats {
    pub cpu_speed_limit_pct: Option<f64>,
    pub gpu_speed_limit_pct: Option<f64>,
    pub thermal_pressure: ThermalPressure,
    pub cpu_temp_c: Option<f64>,
    pub gpu_temp_c: Option<f64>,
    pub soc_temp_c: Option<f64>,
    pub source: ThermalSources,
}

/// Workload-side timings. Nothing fills these in yet; the fields exist so
/// dashboards can bind to them ahead of per-workload instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerfStats {
    pub ms_per_step: Option<f64>,
    pub tokens_per_s: Option<f64>,
}
