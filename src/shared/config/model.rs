use std::env;

use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    /// Max concurrent per-time-step index builds inside one shard batch.
    pub build_workers: usize,
    /// Bounding-box expansion applied when the builder derives the bbox itself.
    pub default_bbox_margin: f32,
}

static SETTINGS: Lazy<Settings> =
    Lazy::new(|| load_settings().expect("Failed to load configuration"));

/// Process-wide settings, loaded on first access and immutable afterwards.
pub fn config() -> &'static Settings {
    &SETTINGS
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("TRAJHASH_CONFIG").unwrap_or_else(|_| "config".to_string());

    // Every field carries a default so the crate runs without a config file.
    let settings: Settings = config::Config::builder()
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .set_default("engine.build_workers", 4_i64)?
        .set_default("engine.default_bbox_margin", 1.0_f64)?
        .add_source(config::File::with_name(&config_path).required(false))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
