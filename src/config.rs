//! Script configuration: a small TOML file describing the target API.
//!
//! Automation scripts typically carry a config file next to them naming the
//! protocol, host, and port of the API they talk to, with an `{instance}`
//! placeholder in the host so one config serves several deployments:
//!
//! ```toml
//! [api]
//! protocol = "https"
//! fqdn = "{instance}.example.com"
//! port = 443
//! ```
//!
//! [`ScriptConfig::base_url`] substitutes the placeholder and assembles the
//! effective base URL for a [`WebRequester`](crate::request::WebRequester).

use serde::Deserialize;
use std::path::Path;

/// Errors from loading a script config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or is missing required fields.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level script configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    /// The `[api]` section.
    pub api: ApiSection,
}

/// The `[api]` section: where the target API lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    /// URL scheme, usually `https`.
    pub protocol: String,
    /// Host name, optionally containing an `{instance}` placeholder.
    pub fqdn: String,
    /// TCP port.
    pub port: u16,
}

/// Loads and parses a TOML config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ScriptConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

impl ScriptConfig {
    /// Assembles the base URL, substituting `{instance}` in the configured
    /// FQDN with the given instance name.
    pub fn base_url(&self, instance: &str) -> String {
        let fqdn = self.api.fqdn.replace("{instance}", instance);
        format!("{}://{}:{}", self.api.protocol, fqdn, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(content: &str) -> ScriptConfig {
        toml::from_str(content).expect("config should parse")
    }

    #[test]
    fn base_url_substitutes_the_instance_placeholder() {
        let config = parse(
            r#"
            [api]
            protocol = "https"
            fqdn = "{instance}.example.com"
            port = 443
            "#,
        );
        assert_eq!(config.base_url("prod"), "https://prod.example.com:443");
    }

    #[test]
    fn base_url_without_placeholder_ignores_the_instance() {
        let config = parse(
            r#"
            [api]
            protocol = "http"
            fqdn = "localhost"
            port = 8080
            "#,
        );
        assert_eq!(config.base_url("anything"), "http://localhost:8080");
    }

    #[test]
    fn load_config_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]").unwrap();
        writeln!(file, "protocol = \"https\"").unwrap();
        writeln!(file, "fqdn = \"api.example.com\"").unwrap();
        writeln!(file, "port = 443").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api.fqdn, "api.example.com");
        assert_eq!(config.api.port, 443);
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "protocol = \"https\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config("/nonexistent/webreq.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
