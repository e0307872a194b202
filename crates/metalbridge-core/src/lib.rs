pub mod config;
pub mod error;
pub mod snapshot;
pub mod system;

pub use config::{ProbeCommand, ProbeConfig, DEFAULT_SENSOR_HELPER};
pub use error::{MetalBridgeError, Result};
pub use snapshot::{DerivedSignals, MetricsSnapshot, ProbeAvailability, ProbeResult};
pub use system::{
    GpuStats, MemoryPressure, MemoryStats, PerfStats, ThermalPressure, ThermalSources,
    ThermalStats,
};
