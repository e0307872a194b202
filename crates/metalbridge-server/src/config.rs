use std::path::PathBuf;

use clap::Parser;
use metalbridge_core::{MetalBridgeError, ProbeConfig, DEFAULT_SENSOR_HELPER};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_STATIC_DIR: &str = "./public";
pub const DASHBOARD_FILE: &str = "index.html";

#[derive(Parser, Debug, Default)]
#[command(name = "metalbridge")]
#[command(about = "MetalBridge - local GPU, memory and thermal telemetry over HTTP", long_about = None)]
pub struct Cli {
    /// Address to bind (env: HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (env: PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the dashboard's index.html (env: STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Sensor helper executable printing JSON temperatures (env: SENSOR_HELPER)
    #[arg(long)]
    pub sensor_helper: Option<String>,

    /// Run powermetrics through `sudo -n` (env: USE_SUDO=1)
    #[arg(long)]
    pub sudo: bool,
}

/// Everything the HTTP server needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub probes: ProbeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            probes: ProbeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env(cli: Cli) -> Result<Self, MetalBridgeError> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Flags win over environment variables, which win over defaults
    pub fn resolve(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, MetalBridgeError> {
        let host = cli
            .host
            .or_else(|| env("HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match (cli.port, env("PORT")) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .trim()
                .parse()
                .map_err(|_| MetalBridgeError::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            (None, None) => DEFAULT_PORT,
        };

        let static_dir = cli
            .static_dir
            .or_else(|| env("STATIC_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let sensor_helper = cli
            .sensor_helper
            .or_else(|| env("SENSOR_HELPER"))
            .unwrap_or_else(|| DEFAULT_SENSOR_HELPER.to_string());

        let sudo = cli.sudo || env("USE_SUDO").is_some_and(|v| matches!(v.trim(), "1" | "true"));

        let mut probes = ProbeConfig::default().with_sensor_helper(sensor_helper);
        if sudo {
            probes = probes.with_sudo();
        }
        probes.validate()?;

        Ok(Self {
            host,
            port,
            static_dir,
            probes,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.static_dir.join(DASHBOARD_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::resolve(Cli::default(), env_of(&[])).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8787");
        assert_eq!(config.dashboard_path(), PathBuf::from("./public/index.html"));
        assert_eq!(config.probes, ProbeConfig::default());
    }

    #[test]
    fn test_env_fills_unset_flags() {
        let env = env_of(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("SENSOR_HELPER", "/opt/helper"),
            ("USE_SUDO", "1"),
        ]);
        let config = ServerConfig::resolve(Cli::default(), env).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:9000");
        assert_eq!(config.probes.sensor_helper.program, "/opt/helper");
        assert_eq!(config.probes.gpu_sampler.program, "sudo");
    }

    #[test]
    fn test_flags_override_env() {
        let cli = Cli {
            port: Some(1234),
            static_dir: Some(PathBuf::from("/srv/dash")),
            ..Default::default()
        };
        let config = ServerConfig::resolve(cli, env_of(&[("PORT", "9000")])).unwrap();
        assert_eq!(config.port, 1234);
        assert_eq!(config.dashboard_path(), PathBuf::from("/srv/dash/index.html"));
    }

    #[test]
    fn test_invalid_port_env() {
        let err = ServerConfig::resolve(Cli::default(), env_of(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, MetalBridgeError::Config(_)));
    }

    #[test]
    fn test_empty_sensor_helper_rejected() {
        let err = ServerConfig::resolve(Cli::default(), env_of(&[("SENSOR_HELPER", "")])).unwrap_err();
        assert!(matches!(err, MetalBridgeError::EmptyProgram(_)));
    }
}
