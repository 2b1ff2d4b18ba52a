//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calfetch/config.toml` by default. Command-line flags override
//! file values.
//!
//! The `password` value supports secret references:
//! - `pass::path/in/store`: resolved via `pass show`
//! - `env::VAR_NAME`: resolved from the environment
//! - plain text: used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use calfetch_dav::{CalDavConfig, Credentials};

use crate::cli::Cli;

/// Configuration for the calfetch client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// CalDAV server settings.
    pub server: ServerSettings,
}

/// CalDAV server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Calendar or collection URL.
    pub url: Option<String>,

    /// Username for Basic authentication.
    pub username: Option<String>,

    /// Password (supports `pass::` and `env::` prefixes).
    pub password: Option<String>,

    /// Accept invalid TLS certificates.
    pub insecure_tls: bool,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Override for the `User-Agent` header.
    pub user_agent: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            insecure_tls: false,
            timeout: CalDavConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ServerSettings {
    /// Applies command-line overrides on top of the file settings.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(ref url) = cli.url {
            self.url = Some(url.clone());
        }
        if let Some(ref user) = cli.user {
            self.username = Some(user.clone());
        }
        if let Some(ref password) = cli.password {
            self.password = Some(password.clone());
        }
        if cli.insecure {
            self.insecure_tls = true;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout = timeout;
        }
        self
    }

    /// Returns the configured URL.
    pub fn url(&self) -> Result<&str, String> {
        self.url.as_deref().ok_or_else(|| {
            format!(
                "no CalDAV URL configured; pass --url or add to {}:\n  \
                 [server]\n  \
                 url = \"https://dav.example.com/calendars/me/\"",
                ClientConfig::default_path().display()
            )
        })
    }

    /// Resolves credentials, expanding secret references in the password.
    ///
    /// Returns `None` unless both username and password are set and
    /// non-empty; requests are then sent anonymously.
    pub fn credentials(&self) -> Result<Option<Credentials>, String> {
        let (Some(user), Some(raw_password)) = (&self.username, &self.password) else {
            return Ok(None);
        };
        if user.is_empty() {
            return Ok(None);
        }

        let password = crate::secret::resolve(raw_password)
            .map_err(|e| format!("failed to resolve password: {}", e))?;
        if password.is_empty() {
            return Ok(None);
        }

        Ok(Some(Credentials::new(user.clone(), password)))
    }

    /// Converts to the DAV client configuration.
    pub fn dav_config(&self) -> CalDavConfig {
        let mut config = CalDavConfig::new().with_timeout(Duration::from_secs(self.timeout));
        if self.insecure_tls {
            config = config.with_insecure_tls();
        }
        if let Some(ref user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        config
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calfetch")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["calfetch"];
        argv.extend_from_slice(args);
        argv.push("list");
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert!(!config.debug);
        assert_eq!(config.server, ServerSettings::default());
        assert_eq!(config.server.timeout, 30);
    }

    #[test]
    fn parses_server_section() {
        let config: ClientConfig = toml::from_str(
            r#"
[server]
url = "https://dav.example.com/cal/"
username = "alice"
password = "secret"
insecure_tls = true
timeout = 10
user_agent = "calfetch/test"
"#,
        )
        .unwrap();

        let server = config.server;
        assert_eq!(server.url().unwrap(), "https://dav.example.com/cal/");
        assert!(server.insecure_tls);

        let dav = server.dav_config();
        assert!(!dav.verify_tls);
        assert_eq!(dav.timeout, Duration::from_secs(10));
        assert_eq!(dav.user_agent, "calfetch/test");

        let credentials = server.credentials().unwrap().unwrap();
        assert_eq!(credentials.user, "alice");
        assert_eq!(credentials.pass, "secret");
    }

    #[test]
    fn cli_flags_override_file_values() {
        let file = ServerSettings {
            url: Some("https://file.example.com/".to_string()),
            username: Some("file-user".to_string()),
            timeout: 30,
            ..Default::default()
        };

        let merged = file.with_overrides(&cli(&[
            "--url",
            "https://cli.example.com/cal/",
            "--insecure",
            "--timeout",
            "5",
        ]));

        assert_eq!(merged.url.as_deref(), Some("https://cli.example.com/cal/"));
        assert_eq!(merged.username.as_deref(), Some("file-user"));
        assert!(merged.insecure_tls);
        assert_eq!(merged.timeout, 5);
    }

    #[test]
    fn missing_url_errors() {
        let err = ServerSettings::default().url().unwrap_err();
        assert!(err.contains("--url"));
    }

    #[test]
    fn credentials_need_both_parts() {
        let only_user = ServerSettings {
            username: Some("alice".to_string()),
            ..Default::default()
        };
        assert!(only_user.credentials().unwrap().is_none());

        let empty_password = ServerSettings {
            username: Some("alice".to_string()),
            password: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_password.credentials().unwrap().is_none());
    }

    #[test]
    fn credentials_resolve_env_reference() {
        unsafe {
            std::env::set_var("_CALFETCH_CONFIG_TEST_PASSWORD", "from-env");
        }

        let settings = ServerSettings {
            username: Some("alice".to_string()),
            password: Some("env::_CALFETCH_CONFIG_TEST_PASSWORD".to_string()),
            ..Default::default()
        };
        let credentials = settings.credentials().unwrap().unwrap();
        assert_eq!(credentials.pass, "from-env");

        unsafe {
            std::env::remove_var("_CALFETCH_CONFIG_TEST_PASSWORD");
        }
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "debug = true\n[server]\nurl = \"http://localhost:5232/alice/\"\n",
        )
        .unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert!(config.debug);
        assert_eq!(
            config.server.url.as_deref(),
            Some("http://localhost:5232/alice/")
        );
    }

    #[test]
    fn load_from_reports_errors() {
        let tmp = tempfile::tempdir().unwrap();

        let missing = ClientConfig::load_from(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(missing.contains("failed to read config"));

        let path = tmp.path().join("broken.toml");
        std::fs::write(&path, "[server\nurl = 1").unwrap();
        let broken = ClientConfig::load_from(&path).unwrap_err();
        assert!(broken.contains("failed to parse config"));
    }
}
