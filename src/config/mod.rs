// Configuration module entry point
// Manages application configuration and the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StorageConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file (optional),
    /// then `WEBDEMO_*` environment variables (`WEBDEMO_SERVER__PORT=8080`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WEBDEMO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "webdemo")?
            .set_default("http.max_body_size", 16_777_216)? // 16MB
            .set_default("http.debug", false)?
            .set_default("storage.downloads_dir", "downloads")?
            .set_default("storage.echo_file", "file.txt")?
            .set_default("storage.static_dir", "static")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Configuration rooted in `root`, used by tests that need isolated storage
#[cfg(test)]
pub fn test_config(root: &std::path::Path) -> Config {
    let path = |name: &str| root.join(name).to_string_lossy().into_owned();
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        logging: LoggingConfig {
            level: "error".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 0,
            read_timeout: 5,
            write_timeout: 5,
            max_connections: None,
        },
        http: HttpConfig {
            server_name: "webdemo-test".to_string(),
            max_body_size: 1_048_576,
            debug: false,
        },
        storage: StorageConfig {
            downloads_dir: path("downloads"),
            echo_file: path("file.txt"),
            static_dir: path("static"),
        },
    }
}
