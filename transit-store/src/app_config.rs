use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// Latency of the simulated booking service.
    pub submission_delay_ms: u64,
    /// How long a session waits for the booking service. 0 waits forever.
    pub submission_timeout_ms: u64,
    #[serde(default)]
    pub simulate_failure: bool,
}

impl BookingConfig {
    pub fn submission_delay(&self) -> Duration {
        Duration::from_millis(self.submission_delay_ms)
    }

    pub fn submission_timeout(&self) -> Option<Duration> {
        match self.submission_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::builder()?
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // TRANSIT__SERVER__PORT=8080 sets server.port
            .add_source(config::Environment::with_prefix("TRANSIT").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only; every source added on top overrides them.
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.port", 3000)?
            .set_default("booking.submission_delay_ms", 2000)?
            .set_default("booking.submission_timeout_ms", 10_000)?
            .set_default("booking.simulate_failure", false)
    }

    #[cfg(test)]
    fn from_toml(raw: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
