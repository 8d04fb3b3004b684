/// CLI configuration
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "reverie.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub demo: DemoSettings,
}

/// Simulated engine timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Playback speed multiplier (10.0 plays a minute in six seconds)
    #[serde(default = "default_speed")]
    pub speed: f64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoSettings {
    #[serde(default = "default_track_count")]
    pub track_count: usize,

    #[serde(default = "default_track_seconds")]
    pub track_seconds: f64,

    /// Make every n-th demo track unplayable (0 = none)
    #[serde(default)]
    pub broken_every: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            tick_interval_ms: default_tick_interval_ms(),
            load_delay_ms: default_load_delay_ms(),
        }
    }
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            track_count: default_track_count(),
            track_seconds: default_track_seconds(),
            broken_every: 0,
        }
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` overrides the default `reverie.toml`; a missing default file is
    /// fine, a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (REVERIE_DATABASE_URL, REVERIE_ENGINE__SPEED)
        settings = settings.add_source(
            config::Environment::with_prefix("REVERIE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build().context("Failed to read configuration")?;
        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.engine.speed.is_finite() && self.engine.speed > 0.0) {
            anyhow::bail!("engine.speed must be a positive number");
        }
        if self.engine.tick_interval_ms == 0 {
            anyhow::bail!("engine.tick_interval_ms must be at least 1");
        }
        if !(self.demo.track_seconds.is_finite() && self.demo.track_seconds > 0.0) {
            anyhow::bail!("demo.track_seconds must be a positive number");
        }
        Ok(())
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            log_filter: default_log_filter(),
            engine: EngineSettings::default(),
            demo: DemoSettings::default(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://reverie.db".to_string()
}

fn default_log_filter() -> String {
    "reverie=info,reverie_playback=info,reverie_storage=warn".to_string()
}

fn default_speed() -> f64 {
    10.0
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_load_delay_ms() -> u64 {
    50
}

fn default_track_count() -> usize {
    4
}

fn default_track_seconds() -> f64 {
    30.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database_url, "sqlite://reverie.db");
    }

    #[test]
    fn file_values_override_defaults() {
        let source = config::File::from_str(
            "database_url = \"sqlite::memory:\"\n[engine]\nspeed = 2.5\n",
            config::FileFormat::Toml,
        );
        let config: CliConfig = config::Config::builder()
            .add_source(source)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.engine.speed, 2.5);
        assert_eq!(config.engine.tick_interval_ms, 250);
        assert_eq!(config.demo.track_count, 4);
    }

    #[test]
    fn zero_speed_is_rejected() {
        let mut config = CliConfig::default();
        config.engine.speed = 0.0;
        assert!(config.validate().is_err());
    }
}
