use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Root of the on-disk content layout (canon/, scenarios/, prototypes/, ...).
    pub data_dir: String,
    /// Per-file upload size ceiling in bytes.
    pub max_upload_size: u64,
    /// Maximum number of files accepted in one screenshot batch.
    pub max_upload_files: usize,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Upstream chat-completion endpoint.
    pub api_url: String,
    /// API key for the upstream. Without one, /simulate answers 503.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: None,
            model: "claude-3-5-sonnet-20241022".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100 * 1024 * 1024); // 100MiB

        let max_upload_files = std::env::var("MAX_UPLOAD_FILES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let simulation = SimulationConfig {
            api_url: std::env::var("SIMULATION_API_URL")
                .unwrap_or_else(|_| SimulationConfig::default().api_url),
            api_key: std::env::var("SIMULATION_API_KEY").ok(),
            model: std::env::var("SIMULATION_MODEL")
                .unwrap_or_else(|_| SimulationConfig::default().model),
        };

        let config = Config {
            bind_address,
            data_dir,
            max_upload_size,
            max_upload_files,
            simulation,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.max_upload_files == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_FILES must be greater than 0".to_string(),
            ));
        }

        if self.simulation.api_key.is_none() {
            tracing::warn!("SIMULATION_API_KEY is not set; the /simulate route will answer 503");
        }

        Ok(())
    }
}
