use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{MetalBridgeError, Result};

pub const DEFAULT_SENSOR_HELPER: &str = "./bin/thermal-helper";

/// One external program invocation with fixed arguments and a wall-clock budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

impl ProbeCommand {
    pub fn new(program: impl Into<String>, args: &[&str], timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Prefix the invocation with `sudo -n` so a missing grant fails instead of prompting
    pub fn via_sudo(self) -> Self {
        let mut args = vec!["-n".to_string(), self.program];
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
            timeout_ms: self.timeout_ms,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(MetalBridgeError::EmptyProgram(name.to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(MetalBridgeError::ZeroTimeout(name.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for ProbeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The external commands behind each probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub gpu_sampler: ProbeCommand,
    pub memory_pressure: ProbeCommand,
    pub swap_usage: ProbeCommand,
    pub power_state: ProbeCommand,
    pub smc_sampler: ProbeCommand,
    pub sensor_helper: ProbeCommand,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            gpu_sampler: ProbeCommand::new(
                "powermetrics",
                &["--samplers", "gpu_power", "-n", "1", "-i", "500"],
                Duration::from_secs(8),
            ),
            memory_pressure: ProbeCommand::new(
                "memory_pressure",
                &["-Q"],
                Duration::from_secs(4),
            ),
            swap_usage: ProbeCommand::new("sysctl", &["vm.swapusage"], Duration::from_secs(3)),
            power_state: ProbeCommand::new("pmset", &["-g", "therm"], Duration::from_secs(3)),
            smc_sampler: ProbeCommand::new(
                "powermetrics",
                &["--samplers", "smc,thermal", "-n", "1", "-i", "500"],
                Duration::from_secs(8),
            ),
            sensor_helper: ProbeCommand::new(DEFAULT_SENSOR_HELPER, &[], Duration::from_secs(4)),
        }
    }
}

impl ProbeConfig {
    /// Run both `powermetrics` samplers through `sudo -n`
    pub fn with_sudo(mut self) -> Self {
        self.gpu_sampler = self.gpu_sampler.via_sudo();
        self.smc_sampler = self.smc_sampler.via_sudo();
        self
    }

    pub fn with_sensor_helper(mut self, program: impl Into<String>) -> Self {
        self.sensor_helper.program = program.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.gpu_sampler.validate("gpu_sampler")?;
        self.memory_pressure.validate("memory_pressure")?;
        self.swap_usage.validate("swap_usage")?;
        self.power_state.validate("power_state")?;
        self.smc_sampler.validate("smc_sampler")?;
        self.sensor_helper.validate("sensor_helper")?;
        Ok(())
    }
}
