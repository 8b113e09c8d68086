// Configuration module entry point
// Loads layered configuration and holds shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::action::EnvelopeOptions;

// Re-export public types
pub use state::AppState;
pub use types::{
    AgentConfig, Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    RoutesConfig, ServerConfig,
};

/// Config file looked up when no path is given (any extension the config crate supports)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// Layers, lowest priority first: built-in defaults, the file (if present),
    /// then `KOPI_`-prefixed environment variables, e.g. `KOPI_SERVER__PORT=9090`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("KOPI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.backlog", 128)?
            .set_default("http.server_name", "warung-kopi/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("agent.invoke_path", "/invoke")?
            .set_default("agent.message_version", "1.0")?
            .set_default("agent.content_type", "application/json")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn envelope_options(&self) -> EnvelopeOptions {
        EnvelopeOptions {
            message_version: self.agent.message_version.clone(),
            content_type: self.agent.content_type.clone(),
        }
    }
}
