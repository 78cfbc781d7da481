//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pgreach_postgres::config::{DEFAULT_IPV6_OPTIONS, DEFAULT_REGIONS};
use pgreach_postgres::schema::DEFAULT_TABLE;
use pgreach_postgres::{PoolerRule, ResolverConfig, VerifyOptions};

use crate::error::{CliError, CliResult};

/// Default config file name (lives in the working directory)
pub const CONFIG_FILE_NAME: &str = "pgreach.toml";

/// Environment variable holding the connection URL by default
pub const DEFAULT_URL_ENV: &str = "SUPABASE_CONNECTION_STRING";

/// Environment file loaded before the URL is read
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// pgreach CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the connection URL comes from
    pub connection: ConnectionConfig,

    /// Resolver timeouts and region list
    pub resolver: ResolverSettings,

    /// Pooled endpoint naming convention
    pub pooler: PoolerSettings,

    /// Table the verification and statistics routines look at
    pub target: TargetConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the explicit config file, or `pgreach.toml` in `dir` when present.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file yields the default configuration.
    pub fn discover(dir: &Path, explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(CliError::Config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::load(path),
            None => {
                let path = dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Pick the connection URL: the flag, then the environment, then the file.
    pub fn connection_url(&self, flag: Option<&str>) -> CliResult<String> {
        let from_env = std::env::var(&self.connection.url_env).ok();
        self.pick_url(flag, from_env.as_deref())
    }

    fn pick_url(&self, flag: Option<&str>, from_env: Option<&str>) -> CliResult<String> {
        [flag, from_env, self.connection.url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                CliError::Config(format!(
                    "No connection URL. Pass --url, set {} or add [connection] url to {}",
                    self.connection.url_env, CONFIG_FILE_NAME
                ))
            })
    }

    /// Build the resolver configuration for `url`.
    pub fn resolver_config(&self, url: &str) -> CliResult<ResolverConfig> {
        let settings = &self.resolver;
        let config = ResolverConfig::builder()
            .uri(url)
            .pooled_timeout(Duration::from_secs(settings.pooled_timeout_secs))
            .direct_timeout(Duration::from_secs(settings.direct_timeout_secs))
            .regions(settings.regions.iter().cloned())
            .pooler(self.pooler.rule())
            .ipv6_options(settings.ipv6_options.clone())
            .message_limit(settings.message_limit)
            .build()?;
        Ok(config)
    }

    /// Target table, with an optional override from the command line.
    pub fn table(&self, table: Option<&str>) -> String {
        table.unwrap_or(&self.target.table).to_string()
    }

    /// Options for the verification routine.
    pub fn verify_options(&self, table: Option<&str>) -> VerifyOptions {
        VerifyOptions {
            table: self.table(table),
            timestamp_column: self.target.timestamp_column.clone(),
            sample_limit: self.target.sample_limit,
        }
    }
}

/// Connection URL sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Connection URL, used when neither the flag nor the env var is set
    pub url: Option<String>,

    /// Environment variable holding the URL
    pub url_env: String,

    /// Environment file to load (relative to the working directory)
    pub env_file: PathBuf,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            url_env: DEFAULT_URL_ENV.to_string(),
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
        }
    }
}

/// Resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Timeout for each pooled attempt
    pub pooled_timeout_secs: u64,

    /// Timeout for the direct and IPv6 attempts
    pub direct_timeout_secs: u64,

    /// Pooler regions in attempt order
    pub regions: Vec<String>,

    /// Failure messages are truncated to this many characters
    pub message_limit: usize,

    /// Startup options appended to the IPv6 variant
    pub ipv6_options: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            pooled_timeout_secs: 5,
            direct_timeout_secs: 10,
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            message_limit: 80,
            ipv6_options: DEFAULT_IPV6_OPTIONS.to_string(),
        }
    }
}

/// Pooled endpoint naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolerSettings {
    /// Host template with `{region}` and `{suffix}` placeholders
    pub host_template: String,

    /// User template with `{user}` and `{project_ref}` placeholders
    pub user_template: String,

    /// Pooler port
    pub port: u16,

    /// Domain suffix override
    pub host_suffix: Option<String>,
}

impl Default for PoolerSettings {
    fn default() -> Self {
        let rule = PoolerRule::default();
        Self {
            host_template: rule.host_template,
            user_template: rule.user_template,
            port: rule.port,
            host_suffix: rule.host_suffix,
        }
    }
}

impl PoolerSettings {
    /// The resolver's pooler rule.
    pub fn rule(&self) -> PoolerRule {
        PoolerRule {
            host_template: self.host_template.clone(),
            user_template: self.user_template.clone(),
            port: self.port,
            host_suffix: self.host_suffix.clone(),
        }
    }
}

/// Target table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Table name
    pub table: String,

    /// Column the sample is ordered by
    pub timestamp_column: String,

    /// Number of sample rows
    pub sample_limit: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        let options = VerifyOptions::default();
        Self {
            table: DEFAULT_TABLE.to_string(),
            timestamp_column: options.timestamp_column,
            sample_limit: options.sample_limit,
        }
    }
}

/// Load `path` (relative to `dir`) into the process environment.
///
/// Variables already set are left alone. A missing file is not an error.
pub fn load_env_file(dir: &Path, path: &Path) -> CliResult<Option<PathBuf>> {
    let path = dir.join(path);
    match dotenvy::from_path(&path) {
        Ok(()) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}
