// Configuration loader: reads the INI-style `~/.s3share` file once at
// startup. The resulting `Config` is never mutated afterwards.

use crate::error::{Result, ShareError};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "S3SHARE_CONFIG";

const SECTION: &str = "S3";
const DEFAULT_HOST: &str = "s3.amazonaws.com";
const DEFAULT_REGION: &str = "us-east-1";

/// Settings from the `[S3]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bucket_name: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// Service endpoint, `host` or `host:port`.
    pub host: String,
    pub region: String,
    /// Use https for API calls. Public links are always plain http.
    pub is_secure: bool,
}

/// Access key pair used to sign requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Location of the config file: `$S3SHARE_CONFIG`, else `~/.s3share`.
pub fn config_path() -> Result<PathBuf> {
    resolve_config_path(std::env::var_os(CONFIG_ENV), dirs::home_dir())
}

fn resolve_config_path(override_path: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(p) = override_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    home.map(|dir| dir.join(".s3share")).ok_or(ShareError::NoHomeDir)
}

impl Config {
    /// Load the config from its default location.
    pub fn load() -> Result<Self> {
        Self::from_path(&config_path()?)
    }

    /// Load and validate the config file at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ShareError::ConfigMissing { path: path.to_path_buf() });
        }
        let text = std::fs::read_to_string(path).map_err(|source| ShareError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Build a config from INI text. Fails with `ConfigIncomplete` when the
    /// `[S3]` section or a non-empty `bucket_name` is absent.
    pub fn parse(text: &str) -> Result<Self> {
        let sections = parse_ini(text);
        let s3 = sections.get(SECTION).ok_or(ShareError::ConfigIncomplete)?;

        let bucket_name = s3
            .get("bucket_name")
            .filter(|b| !b.is_empty())
            .cloned()
            .ok_or(ShareError::ConfigIncomplete)?;

        let is_secure = match s3.get("is_secure").map(|v| v.to_ascii_lowercase()) {
            Some(v) => !matches!(v.as_str(), "false" | "no" | "off" | "0"),
            None => true,
        };

        Ok(Config {
            bucket_name,
            aws_access_key_id: s3.get("aws_access_key_id").cloned(),
            aws_secret_access_key: s3.get("aws_secret_access_key").cloned(),
            host: non_empty(s3.get("host")).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            region: non_empty(s3.get("region")).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            is_secure,
        })
    }

    /// Keys from the config file take precedence over the standard AWS
    /// environment variables. `None` means requests go out unsigned.
    pub fn credentials(&self) -> Option<Credentials> {
        let env = |k: &str| std::env::var(k).ok().filter(|v| !v.is_empty());
        let access_key_id = self.aws_access_key_id.clone().or_else(|| env("AWS_ACCESS_KEY_ID"))?;
        let secret_access_key = self
            .aws_secret_access_key
            .clone()
            .or_else(|| env("AWS_SECRET_ACCESS_KEY"))?;
        Some(Credentials {
            access_key_id,
            secret_access_key,
            session_token: env("AWS_SESSION_TOKEN"),
        })
    }
}

fn non_empty(v: Option<&String>) -> Option<String> {
    v.filter(|s| !s.is_empty()).cloned()
}

/// Minimal INI reader. Section names are case-sensitive, option names are
/// lowercased. Indented lines continue the previous value.
fn parse_ini(text: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;
    let mut last_key: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // continuation line
        if raw.starts_with(char::is_whitespace) {
            if let (Some(section), Some(key)) = (&current, &last_key) {
                if let Some(value) = sections.get_mut(section).and_then(|s| s.get_mut(key)) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    continue;
                }
            }
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            last_key = None;
            continue;
        }

        let Some(section) = &current else { continue };
        let Some(idx) = trimmed.find(['=', ':']) else { continue };
        let key = trimmed[..idx].trim().to_lowercase();
        let value = trimmed[idx + 1..].trim().to_string();
        sections.entry(section.clone()).or_default().insert(key.clone(), value);
        last_key = Some(key);
    }

    sections
}
