use serde::Deserialize;

/// Root application configuration. Loaded from environment variables with
/// the prefix `TRENDLENS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Inject the synthesized "Combined Total" column when combining more
    /// than one series.
    #[serde(default = "default_combined_total")]
    pub combined_total: bool,
    /// Drop the "Unknown" sentinel entry from exported breakdowns.
    #[serde(default = "default_filter_unknown")]
    pub filter_unknown: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

// Default functions
fn default_combined_total() -> bool {
    true
}
fn default_filter_unknown() -> bool {
    true
}
fn default_ttl_secs() -> u64 {
    300
}
fn default_max_entries() -> usize {
    1024
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            combined_total: default_combined_total(),
            filter_unknown: default_filter_unknown(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("TRENDLENS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
