use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Deserialize)]
pub struct Settings {
    db_name: String,
    db_path: String,
    #[serde(default = "default_http_port")]
    http_port: u16,
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Environment::with_prefix("EXERCISEAPP"))
            .build()?;

        s.try_deserialize()
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }
}
