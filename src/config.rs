use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Windowing and pagination tuning. The Kotlin server hard-coded these;
/// here they are injected so the engine stays testable and tunable.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Per-sensor cluster width: samples closer than this merge into one bin.
    #[serde(default = "default_horizontal_window_ms")]
    pub horizontal_window_ms: i64,
    /// Cross-sensor alignment width; must stay below the horizontal window.
    #[serde(default = "default_vertical_window_ms")]
    pub vertical_window_ms: i64,
    /// Bucket-to-bucket gap beyond which the machinery is considered off.
    #[serde(default = "default_machinery_off_threshold_ms")]
    pub machinery_off_threshold_ms: i64,
    /// Placeholder rows synthesized per detected outage, by widget shape.
    #[serde(default = "default_single_padding_rows")]
    pub single_padding_rows: usize,
    #[serde(default = "default_multi_padding_rows")]
    pub multi_padding_rows: usize,
    /// Fixed page size for cache-backfill requests.
    #[serde(default = "default_cache_page_size")]
    pub cache_page_size: u32,
}

fn default_horizontal_window_ms() -> i64 {
    60_000
}

fn default_vertical_window_ms() -> i64 {
    30_000
}

fn default_machinery_off_threshold_ms() -> i64 {
    600_000
}

fn default_single_padding_rows() -> usize {
    1
}

fn default_multi_padding_rows() -> usize {
    3
}

fn default_cache_page_size() -> u32 {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizontal_window_ms: default_horizontal_window_ms(),
            vertical_window_ms: default_vertical_window_ms(),
            machinery_off_threshold_ms: default_machinery_off_threshold_ms(),
            single_padding_rows: default_single_padding_rows(),
            multi_padding_rows: default_multi_padding_rows(),
            cache_page_size: default_cache_page_size(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.engine.horizontal_window_ms > 0,
            "engine.horizontal_window_ms must be > 0, got {}",
            self.engine.horizontal_window_ms
        );
        anyhow::ensure!(
            self.engine.vertical_window_ms > 0,
            "engine.vertical_window_ms must be > 0, got {}",
            self.engine.vertical_window_ms
        );
        anyhow::ensure!(
            self.engine.vertical_window_ms < self.engine.horizontal_window_ms,
            "engine.vertical_window_ms ({}) must be below engine.horizontal_window_ms ({})",
            self.engine.vertical_window_ms,
            self.engine.horizontal_window_ms
        );
        anyhow::ensure!(
            self.engine.machinery_off_threshold_ms > 0,
            "engine.machinery_off_threshold_ms must be > 0, got {}",
            self.engine.machinery_off_threshold_ms
        );
        anyhow::ensure!(
            self.engine.single_padding_rows > 0,
            "engine.single_padding_rows must be > 0, got {}",
            self.engine.single_padding_rows
        );
        anyhow::ensure!(
            self.engine.multi_padding_rows > 0,
            "engine.multi_padding_rows must be > 0, got {}",
            self.engine.multi_padding_rows
        );
        anyhow::ensure!(
            self.engine.cache_page_size > 0,
            "engine.cache_page_size must be > 0, got {}",
            self.engine.cache_page_size
        );
        Ok(())
    }
}
