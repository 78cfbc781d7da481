//! Resolver configuration.

use std::time::Duration;

use crate::descriptor::ConnectionDescriptor;
use crate::error::{PgError, PgResult};

/// Regions probed for a pooled endpoint, in attempt order.
pub const DEFAULT_REGIONS: [&str; 10] = [
    "us-east-2",
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
];

/// Connection option appended to the direct URI for the IPv6 attempt.
pub const DEFAULT_IPV6_OPTIONS: &str = "-c client_encoding=utf8";

/// How pooled endpoints are addressed.
///
/// Templates use `{region}`, `{suffix}`, `{user}` and `{project_ref}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolerRule {
    /// Pooler host name template.
    pub host_template: String,
    /// Pooled user name template.
    pub user_template: String,
    /// Pooler port.
    pub port: u16,
    /// Explicit pooler host suffix. Derived from the direct suffix when unset.
    pub host_suffix: Option<String>,
}

impl Default for PoolerRule {
    fn default() -> Self {
        Self {
            host_template: "aws-1-{region}.pooler.{suffix}".to_string(),
            user_template: "{user}.{project_ref}".to_string(),
            port: 5432,
            host_suffix: None,
        }
    }
}

impl PoolerRule {
    /// Pooler host for `region`, given the direct host suffix.
    pub fn pooled_host(&self, region: &str, direct_suffix: &str) -> String {
        let suffix = self
            .host_suffix
            .clone()
            .unwrap_or_else(|| pooled_suffix(direct_suffix));
        self.host_template
            .replace("{region}", region)
            .replace("{suffix}", &suffix)
    }

    /// Pooled user name for a descriptor.
    pub fn pooled_user(&self, descriptor: &ConnectionDescriptor) -> String {
        self.user_template
            .replace("{user}", &descriptor.user)
            .replace("{project_ref}", &descriptor.project_ref)
    }
}

/// Map a direct host suffix to the pooler's suffix.
///
/// Direct hosts live under a `.co` domain while the poolers live under the
/// matching `.com`; other suffixes are used unchanged.
pub fn pooled_suffix(direct_suffix: &str) -> String {
    if direct_suffix.ends_with(".co") {
        format!("{direct_suffix}m")
    } else {
        direct_suffix.to_string()
    }
}

/// Everything the resolver needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Canonical connection URI.
    pub uri: String,
    /// Timeout for each pooled attempt.
    pub pooled_timeout: Duration,
    /// Timeout for the direct and IPv6 attempts.
    pub direct_timeout: Duration,
    /// Regions to probe, in order.
    pub regions: Vec<String>,
    /// Pooler addressing rule.
    pub pooler: PoolerRule,
    /// Connection options for the IPv6 attempt.
    pub ipv6_options: String,
    /// Maximum characters of driver error text to report.
    pub message_limit: usize,
}

impl ResolverConfig {
    /// Create a configuration with defaults for everything but the URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            pooled_timeout: Duration::from_secs(5),
            direct_timeout: Duration::from_secs(10),
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            pooler: PoolerRule::default(),
            ipv6_options: DEFAULT_IPV6_OPTIONS.to_string(),
            message_limit: 80,
        }
    }

    /// Create a builder for configuration.
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }

    /// Parse the URI into a descriptor, if it has the direct-host shape.
    pub fn descriptor(&self) -> Option<ConnectionDescriptor> {
        ConnectionDescriptor::parse(&self.uri).ok()
    }
}

/// Builder for resolver configuration.
#[derive(Debug, Default)]
pub struct ResolverConfigBuilder {
    uri: Option<String>,
    pooled_timeout: Option<Duration>,
    direct_timeout: Option<Duration>,
    regions: Option<Vec<String>>,
    pooler: Option<PoolerRule>,
    ipv6_options: Option<String>,
    message_limit: Option<usize>,
}

impl ResolverConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the pooled attempt timeout.
    pub fn pooled_timeout(mut self, timeout: Duration) -> Self {
        self.pooled_timeout = Some(timeout);
        self
    }

    /// Set the direct attempt timeout.
    pub fn direct_timeout(mut self, timeout: Duration) -> Self {
        self.direct_timeout = Some(timeout);
        self
    }

    /// Set the regions to probe.
    pub fn regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = Some(regions.into_iter().map(Into::into).collect());
        self
    }

    /// Set the pooler rule.
    pub fn pooler(mut self, rule: PoolerRule) -> Self {
        self.pooler = Some(rule);
        self
    }

    /// Set the IPv6 attempt options.
    pub fn ipv6_options(mut self, options: impl Into<String>) -> Self {
        self.ipv6_options = Some(options.into());
        self
    }

    /// Set the error message limit.
    pub fn message_limit(mut self, limit: usize) -> Self {
        self.message_limit = Some(limit);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PgResult<ResolverConfig> {
        let uri = self
            .uri
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| PgError::config("connection URI is required"))?;

        let mut config = ResolverConfig::new(uri.trim());
        if let Some(timeout) = self.pooled_timeout {
            config.pooled_timeout = timeout;
        }
        if let Some(timeout) = self.direct_timeout {
            config.direct_timeout = timeout;
        }
        if let Some(regions) = self.regions {
            config.regions = regions;
        }
        if let Some(rule) = self.pooler {
            config.pooler = rule;
        }
        if let Some(options) = self.ipv6_options {
            config.ipv6_options = options;
        }
        if let Some(limit) = self.message_limit {
            config.message_limit = limit;
        }

        if config.pooled_timeout.is_zero() || config.direct_timeout.is_zero() {
            return Err(PgError::config("connect timeouts must be non-zero"));
        }

        Ok(config)
    }
}
