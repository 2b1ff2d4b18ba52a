//! Password references.
//!
//! The server password may be given inline or point elsewhere:
//!
//! - `pass::dav/home`: first line of `pass show dav/home`
//! - `env::DAV_PASSWORD`: the `DAV_PASSWORD` environment variable
//! - anything else is the password itself

use std::fmt;
use std::process::Command;

const PASS_PREFIX: &str = "pass::";
const ENV_PREFIX: &str = "env::";

/// A parsed password value.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretRef<'a> {
    Pass(&'a str),
    Env(&'a str),
    Plain(&'a str),
}

impl<'a> SecretRef<'a> {
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix(PASS_PREFIX) {
            Self::Pass(path)
        } else if let Some(var) = value.strip_prefix(ENV_PREFIX) {
            Self::Env(var)
        } else {
            Self::Plain(value)
        }
    }

    /// Fetches the secret.
    pub fn resolve(&self) -> Result<String, String> {
        match *self {
            Self::Pass(path) => pass_show(path),
            Self::Env(var) => {
                std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
            }
            Self::Plain(value) => Ok(value.to_string()),
        }
    }

    /// Form safe to print: references as written, plain text masked.
    pub fn display_safe(&self) -> String {
        match *self {
            Self::Pass(path) => format!("{}{}", PASS_PREFIX, path),
            Self::Env(var) => format!("{}{}", ENV_PREFIX, var),
            Self::Plain(_) => "********".to_string(),
        }
    }
}

impl fmt::Debug for SecretRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_safe())
    }
}

/// Resolves a password value that may be a reference.
pub fn resolve(value: &str) -> Result<String, String> {
    SecretRef::parse(value).resolve()
}

fn pass_show(path: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .args(["show", path])
        .output()
        .map_err(|e| format!("cannot run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        return Err(format!(
            "`pass show {}` exited with {}: {}",
            path,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    match String::from_utf8_lossy(&output.stdout).lines().next() {
        Some(line) => Ok(line.to_string()),
        None => Err(format!("`pass show {}` printed nothing", path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixes() {
        assert_eq!(SecretRef::parse("pass::dav/home"), SecretRef::Pass("dav/home"));
        assert_eq!(SecretRef::parse("env::DAV_PW"), SecretRef::Env("DAV_PW"));
        assert_eq!(SecretRef::parse("env:DAV_PW"), SecretRef::Plain("env:DAV_PW"));
        assert_eq!(SecretRef::parse(""), SecretRef::Plain(""));
    }

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("hunter2").unwrap(), "hunter2");
        assert_eq!(resolve("").unwrap(), "");
    }

    #[test]
    fn display_safe_masks_plain_only() {
        assert_eq!(SecretRef::parse("hunter2").display_safe(), "********");
        assert_eq!(SecretRef::parse("env::DAV_PW").display_safe(), "env::DAV_PW");
        assert_eq!(format!("{:?}", SecretRef::parse("hunter2")), "********");
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_CALFETCH_TEST_SECRET", "dav-password");
        }
        assert_eq!(resolve("env::_CALFETCH_TEST_SECRET").unwrap(), "dav-password");
        unsafe {
            std::env::remove_var("_CALFETCH_TEST_SECRET");
        }
    }

    #[test]
    fn env_reference_missing_var_errors() {
        let err = resolve("env::_CALFETCH_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn pass_reference_missing_entry_errors() {
        // Fails whether or not `pass` is installed.
        assert!(resolve("pass::calfetch/nonexistent/entry/12345").is_err());
    }
}
