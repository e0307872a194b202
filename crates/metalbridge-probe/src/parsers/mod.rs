//! Pure parsers from probe output to metric structs.
//!
//! Every function here is total: arbitrary input produces a fully populated
//! struct, with `None`/`Unknown` for anything not found.

mod gpu;
mod memory;
mod temperature;
mod thermal;

pub use gpu::parse_gpu;
pub use memory::{classify_pressure, parse_swap_gb};
pub use temperature::{parse_die_temperatures, parse_sensor_helper, DieTemperatures};
pub use thermal::{parse_thermal_limits, ThermalLimits};
