use crate::domain::simulation::SimulationProfile;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationSettings {
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_true")]
    pub autostart: bool,
    pub seed: Option<u64>,
    #[serde(default = "default_obstacle_threshold_m")]
    pub obstacle_threshold_m: f64,
    #[serde(default = "default_battery_drain_min")]
    pub battery_drain_min: f64,
    #[serde(default = "default_battery_drain_max")]
    pub battery_drain_max: f64,
    #[serde(default = "default_area_increment_max")]
    pub area_increment_max: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuerySettings {
    #[serde(default = "default_realtime_window")]
    pub realtime_window: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_tick_interval_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_obstacle_threshold_m() -> f64 {
    0.5
}

fn default_battery_drain_min() -> f64 {
    0.1
}

fn default_battery_drain_max() -> f64 {
    0.6
}

fn default_area_increment_max() -> f64 {
    0.5
}

fn default_storage_path() -> String {
    "data/readings.jsonl".to_string()
}

fn default_realtime_window() -> usize {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            autostart: true,
            seed: None,
            obstacle_threshold_m: default_obstacle_threshold_m(),
            battery_drain_min: default_battery_drain_min(),
            battery_drain_max: default_battery_drain_max(),
            area_increment_max: default_area_increment_max(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            realtime_window: default_realtime_window(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SimulationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn profile(&self) -> SimulationProfile {
        SimulationProfile {
            obstacle_threshold_m: self.obstacle_threshold_m,
            battery_drain: self.battery_drain_min..self.battery_drain_max,
            area_increment_max: self.area_increment_max,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let sim = &self.simulation;
        if sim.tick_interval_secs == 0 {
            anyhow::bail!("simulation.tick_interval_secs must be positive");
        }
        if sim.battery_drain_min < 0.0 || sim.battery_drain_min > sim.battery_drain_max {
            anyhow::bail!("simulation.battery_drain_min must be between 0 and battery_drain_max");
        }
        if sim.battery_drain_max > 100.0 {
            anyhow::bail!("simulation.battery_drain_max must not exceed 100");
        }
        if sim.area_increment_max < 0.0 {
            anyhow::bail!("simulation.area_increment_max must not be negative");
        }
        if self.query.realtime_window == 0 {
            anyhow::bail!("query.realtime_window must be at least 1");
        }
        Ok(())
    }
}

/// Load `config/lawnmower` (any format the config crate understands, optional)
/// with `LAWNMOWER__SECTION__KEY` environment overrides
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/lawnmower")
}

pub fn load_app_config_from(name: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .add_source(
            config::Environment::with_prefix("LAWNMOWER")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = load_app_config_from("does/not/exist").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.simulation.tick_interval(), Duration::from_secs(5));
        assert!(config.simulation.autostart);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.query.realtime_window, 50);
        assert_eq!(config.simulation.profile(), SimulationProfile::default());
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lawnmower.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8081

[simulation]
tick_interval_secs = 2
autostart = false
seed = 42

[storage]
backend = "file"
path = "/tmp/readings.jsonl"
"#
        )
        .unwrap();

        let name = dir.path().join("lawnmower");
        let config = load_app_config_from(name.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.simulation.tick_interval_secs, 2);
        assert!(!config.simulation.autostart);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.simulation.battery_drain_max, 0.6);
    }

    #[test]
    fn test_validate_rejects_bad_drain_range() {
        let mut config = AppConfig::default();
        config.simulation.battery_drain_min = 0.7;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.simulation.tick_interval_secs = 0;
        assert!(config.validate().is_err());

        assert!(AppConfig::default().validate().is_ok());
    }
}
