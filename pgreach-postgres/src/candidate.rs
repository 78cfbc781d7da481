//! Endpoint candidates and the sources that generate them.
//!
//! The resolver walks an ordered list of [`CandidateSource`]s. Each source
//! turns the resolver configuration into zero or more [`EndpointCandidate`]s;
//! the concatenation of all sources is the attempt plan.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::config::ResolverConfig;
use crate::descriptor::ConnectionDescriptor;

/// Topology of a candidate endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    /// Regional connection pooler.
    Pooled {
        /// Region identifier.
        region: String,
    },
    /// The URI exactly as configured.
    Direct,
    /// The direct URI with connection options that force the IPv6 path.
    DirectIpv6,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pooled { region } => write!(f, "pooler (region: {region})"),
            Self::Direct => f.write_str("direct"),
            Self::DirectIpv6 => f.write_str("IPv6"),
        }
    }
}

/// A single connection target. Owned by one attempt and dropped after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    /// Topology.
    pub kind: CandidateKind,
    /// Full connection URI.
    pub uri: String,
    /// Connect timeout for this attempt.
    pub timeout: Duration,
}

impl EndpointCandidate {
    /// Human-readable label.
    pub fn label(&self) -> String {
        self.kind.to_string()
    }

    /// The URI with its password masked.
    pub fn masked_uri(&self) -> String {
        mask_password(&self.uri)
    }

    /// Host portion of the URI, if it can be read.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.uri)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// Generates candidates from the resolver configuration.
pub trait CandidateSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Candidates contributed by this source, in attempt order.
    ///
    /// `descriptor` is `None` when the URI does not have the direct-host
    /// shape.
    fn candidates(
        &self,
        config: &ResolverConfig,
        descriptor: Option<&ConnectionDescriptor>,
    ) -> Vec<EndpointCandidate>;
}

/// One pooled candidate per configured region.
#[derive(Debug, Default, Clone, Copy)]
pub struct PooledRegions;

impl CandidateSource for PooledRegions {
    fn name(&self) -> &'static str {
        "pooled-regions"
    }

    fn candidates(
        &self,
        config: &ResolverConfig,
        descriptor: Option<&ConnectionDescriptor>,
    ) -> Vec<EndpointCandidate> {
        let Some(descriptor) = descriptor else {
            return Vec::new();
        };

        config
            .regions
            .iter()
            .map(|region| EndpointCandidate {
                kind: CandidateKind::Pooled {
                    region: region.clone(),
                },
                uri: descriptor.pooled_uri(region, &config.pooler),
                timeout: config.pooled_timeout,
            })
            .collect()
    }
}

/// The configured URI, unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectEndpoint;

impl CandidateSource for DirectEndpoint {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn candidates(
        &self,
        config: &ResolverConfig,
        _descriptor: Option<&ConnectionDescriptor>,
    ) -> Vec<EndpointCandidate> {
        vec![EndpointCandidate {
            kind: CandidateKind::Direct,
            uri: config.uri.clone(),
            timeout: config.direct_timeout,
        }]
    }
}

/// The direct URI with the IPv6 connection options appended.
///
/// Only offered when the URI has the direct-host shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ipv6Endpoint;

impl CandidateSource for Ipv6Endpoint {
    fn name(&self) -> &'static str {
        "direct-ipv6"
    }

    fn candidates(
        &self,
        config: &ResolverConfig,
        descriptor: Option<&ConnectionDescriptor>,
    ) -> Vec<EndpointCandidate> {
        if descriptor.is_none() {
            return Vec::new();
        }

        vec![EndpointCandidate {
            kind: CandidateKind::DirectIpv6,
            uri: with_options(&config.uri, &config.ipv6_options),
            timeout: config.direct_timeout,
        }]
    }
}

/// The standard source order: pooled regions, direct, IPv6.
pub fn default_sources() -> Vec<Box<dyn CandidateSource>> {
    vec![
        Box::new(PooledRegions),
        Box::new(DirectEndpoint),
        Box::new(Ipv6Endpoint),
    ]
}

/// Expand `sources` into the full ordered attempt plan.
pub fn plan(config: &ResolverConfig, sources: &[Box<dyn CandidateSource>]) -> Vec<EndpointCandidate> {
    let descriptor = config.descriptor();
    sources
        .iter()
        .flat_map(|source| {
            let candidates = source.candidates(config, descriptor.as_ref());
            debug!(source = source.name(), count = candidates.len(), "Expanded candidate source");
            candidates
        })
        .collect()
}

/// Append an `options` query parameter, percent-encoding spaces.
///
/// The driver does not treat `+` as a space in URI query values, so form
/// encoding cannot be used here.
pub fn with_options(uri: &str, options: &str) -> String {
    if options.is_empty() {
        return uri.to_string();
    }
    let encoded = options
        .replace('%', "%25")
        .replace(' ', "%20")
        .replace('&', "%26");
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}options={encoded}")
}

/// Replace the password in a URI with `****`.
pub fn mask_password(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.password().is_some() && parsed.set_password(Some("****")).is_ok() {
                parsed.to_string()
            } else {
                uri.to_string()
            }
        }
        Err(_) => "<unparseable URI>".to_string(),
    }
}
