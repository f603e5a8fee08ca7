//! Server configuration parsed from environment variables.

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8050;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Verbose logging and error detail.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.to_string(), port: DEFAULT_PORT, debug: false }
    }
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `HOST`: default `127.0.0.1`
    /// - `PORT`: default `8050`
    /// - `DEBUG`: `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`, default off
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when `PORT` or `DEBUG` is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let debug = parse_flag("DEBUG", std::env::var("DEBUG").ok().as_deref())?;
        Ok(Self { host, port, debug })
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PORT);
    };
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw.to_string() })
}

fn parse_flag(var: &'static str, raw: Option<&str>) -> Result<bool, ConfigError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(_) => Err(ConfigError::Invalid { var, value: raw.unwrap_or_default().to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
