//! Configuration commands.

use crate::config::{ClientConfig, ServerSettings};
use crate::error::{ClientError, ClientResult};
use crate::secret::SecretRef;

/// Dump the current configuration to stdout.
///
/// Plain-text passwords are masked; `pass::`/`env::` references are shown.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let mut shown = config.clone();
    shown.server.password = shown
        .server
        .password
        .as_deref()
        .map(|p| SecretRef::parse(p).display_safe());

    let toml_str = toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the effective server settings.
pub fn validate(server: &ServerSettings) -> ClientResult<()> {
    let url = server.url().map_err(ClientError::Config)?;
    calfetch_dav::ConnectionTarget::resolve(url)?;

    if server.credentials().map_err(ClientError::Config)?.is_some() {
        println!("Credentials resolved.");
    }
    if server.insecure_tls {
        println!("Warning: TLS certificate verification is disabled.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
