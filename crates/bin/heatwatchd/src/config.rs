//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `heatwatch.toml` in the working directory. Every field has a
//! sensible default so the file is optional (the default rig is a pair of
//! simulated sensors and no outlet). Environment variables take precedence
//! over file values.

use std::time::Duration;

use serde::Deserialize;

use heatwatch_app::control_loop::LoopSettings;
use heatwatch_app::outlet_controller::RetryPolicy;
use heatwatch_domain::control::ControlThresholds;
use heatwatch_domain::sensor::{SensorKind, SensorRole};

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Control loop cadence.
    pub control: ControlConfig,
    /// Decision thresholds.
    pub thresholds: ThresholdsConfig,
    /// Pump outlet settings.
    pub outlet: OutletConfig,
    /// Configured sensors.
    pub sensors: Vec<SensorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            control: ControlConfig::default(),
            thresholds: ThresholdsConfig::default(),
            outlet: OutletConfig::default(),
            sensors: vec![
                SensorConfig::simulated("sim_boiler", SensorRole::Boiler, 45.0),
                SensorConfig::simulated("sim_chimney", SensorRole::Chimney, 120.0),
            ],
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Control loop cadence.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Seconds between ticks.
    pub poll_interval_secs: u64,
    /// Seconds between one-line status summaries in the log.
    pub log_interval_secs: u64,
    /// Seconds between retention sweeps.
    pub cleanup_interval_secs: u64,
    /// History retention in days.
    pub retention_days: u64,
}

impl ControlConfig {
    /// Convert into the control loop's settings.
    #[must_use]
    pub fn to_settings(&self) -> LoopSettings {
        LoopSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            log_interval: Duration::from_secs(self.log_interval_secs),
            cleanup_interval: Duration::from_secs(self.cleanup_interval_secs),
            retention: Duration::from_secs(self.retention_days * 24 * 3600),
        }
    }
}

/// Decision thresholds, mirroring [`ControlThresholds`] in TOML-friendly form.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub boiler_critical: f64,
    pub boiler_safe: f64,
    pub accumulator_critical: f64,
    pub accumulator_safe: f64,
    pub chimney_critical: f64,
    pub chimney_low: f64,
    pub hysteresis: f64,
    pub startup_horizon_secs: u64,
    pub startup_delta: f64,
}

impl ThresholdsConfig {
    /// Convert into domain thresholds.
    #[must_use]
    pub fn to_domain(&self) -> ControlThresholds {
        ControlThresholds {
            boiler_critical: self.boiler_critical,
            boiler_safe: self.boiler_safe,
            accumulator_critical: self.accumulator_critical,
            accumulator_safe: self.accumulator_safe,
            chimney_critical: self.chimney_critical,
            chimney_low: self.chimney_low,
            hysteresis: self.hysteresis,
            startup_horizon: Duration::from_secs(self.startup_horizon_secs),
            startup_delta: self.startup_delta,
        }
    }
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        let defaults = ControlThresholds::default();
        Self {
            boiler_critical: defaults.boiler_critical,
            boiler_safe: defaults.boiler_safe,
            accumulator_critical: defaults.accumulator_critical,
            accumulator_safe: defaults.accumulator_safe,
            chimney_critical: defaults.chimney_critical,
            chimney_low: defaults.chimney_low,
            hysteresis: defaults.hysteresis,
            startup_horizon_secs: defaults.startup_horizon.as_secs(),
            startup_delta: defaults.startup_delta,
        }
    }
}

/// Which protocol the pump outlet speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutletKind {
    /// No outlet; advisory-only mode.
    None,
    /// Tasmota firmware on the local network.
    Tasmota,
    /// TP-Link Kasa plug through the vendor cloud.
    Cloud,
}

/// Pump outlet settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutletConfig {
    /// Protocol; `none` runs the daemon in advisory-only mode.
    pub kind: OutletKind,
    /// Base URL of the plug (Tasmota).
    pub endpoint: Option<String>,
    /// Cloud account user name (cloud plugs).
    pub username: Option<String>,
    /// Cloud account password (cloud plugs).
    pub password: Option<String>,
    /// Cloud device id (cloud plugs).
    pub device_id: Option<String>,
    /// Whether an unreachable outlet may be driven in simulation.
    pub allow_simulation: bool,
    /// Attempts per command, clamped to `1..=10`.
    pub retry_attempts: u32,
    /// Pause between attempts in seconds, clamped to `0.5..=10`.
    pub retry_delay_secs: f64,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl OutletConfig {
    /// Convert into the controller's retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_secs_f64(self.retry_delay_secs.max(0.0)))
    }
}

impl Default for OutletConfig {
    fn default() -> Self {
        Self {
            kind: OutletKind::None,
            endpoint: None,
            username: None,
            password: None,
            device_id: None,
            allow_simulation: true,
            retry_attempts: 3,
            retry_delay_secs: 2.0,
            request_timeout_secs: 5,
        }
    }
}

/// Which probe driver backs a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// DS18B20 on the 1-Wire bus.
    Ds18b20,
    /// MAX31855 thermocouple via IIO.
    Max31855,
    /// Simulated probe.
    Simulated,
}

impl ProbeKind {
    /// The sensor kind this driver presents in the status surface.
    #[must_use]
    pub fn sensor_kind(self) -> SensorKind {
        match self {
            Self::Ds18b20 => SensorKind::ContactProbe,
            Self::Max31855 => SensorKind::Thermocouple,
            Self::Simulated => SensorKind::Simulated,
        }
    }
}

/// One configured sensor.
#[derive(Debug, Deserialize)]
pub struct SensorConfig {
    /// Stable identifier; doubles as the 1-Wire address for DS18B20 probes
    /// unless `address` overrides it.
    pub id: String,
    /// Human-readable name; defaults to the id.
    pub name: Option<String>,
    /// Probe driver.
    pub kind: ProbeKind,
    /// Measurement the sensor provides.
    pub role: SensorRole,
    /// Disabled sensors are listed but never read.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 1-Wire address (DS18B20).
    pub address: Option<String>,
    /// IIO device directory (MAX31855).
    pub device: Option<String>,
    /// Base temperature for simulated probes.
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f64,
    /// Jitter amplitude for simulated probes.
    #[serde(default)]
    pub jitter: f64,
}

impl SensorConfig {
    fn simulated(id: &str, role: SensorRole, base: f64) -> Self {
        Self {
            id: id.to_owned(),
            name: None,
            kind: ProbeKind::Simulated,
            role,
            enabled: true,
            address: None,
            device: None,
            base_temperature: base,
            jitter: 0.5,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_temperature() -> f64 {
    21.0
}

impl Config {
    /// Load configuration from `heatwatch.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting configuration is semantically invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("heatwatch.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HEATWATCH_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("HEATWATCH_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("HEATWATCH_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("HEATWATCH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if !self.sensors.iter().any(|s| s.enabled) {
            return Err(ConfigError::Validation(
                "at least one enabled sensor is required".to_string(),
            ));
        }
        for sensor in &self.sensors {
            if sensor.id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "sensor id must not be empty".to_string(),
                ));
            }
            if sensor.kind == ProbeKind::Max31855 && sensor.device.is_none() {
                return Err(ConfigError::Validation(format!(
                    "sensor {} needs a `device` (IIO directory)",
                    sensor.id
                )));
            }
        }
        match self.outlet.kind {
            OutletKind::None => {}
            OutletKind::Tasmota => {
                if self.outlet.endpoint.is_none() {
                    return Err(ConfigError::Validation(
                        "tasmota outlet needs an `endpoint`".to_string(),
                    ));
                }
            }
            OutletKind::Cloud => {
                if self.outlet.username.is_none()
                    || self.outlet.password.is_none()
                    || self.outlet.device_id.is_none()
                {
                    return Err(ConfigError::Validation(
                        "cloud outlet needs `username`, `password` and `device_id`".to_string(),
                    ));
                }
            }
        }
        self.thresholds
            .to_domain()
            .validate()
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:heatwatch.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "heatwatchd=info,heatwatch=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            log_interval_secs: 300,
            cleanup_interval_secs: 3600,
            retention_days: 7,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
