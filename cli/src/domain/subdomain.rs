//! Public subdomain URL construction.

use zcp_common::Port;

/// Toggle requested for a service's public subdomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdomainAction {
    Enable,
    Disable,
}

impl SubdomainAction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "enable" => Some(Self::Enable),
            "disable" => Some(Self::Disable),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }
}

fn url_for(hostname: &str, prefix: &str, domain: &str, port: u16) -> String {
    if port == 80 {
        format!("https://{hostname}-{prefix}.{domain}")
    } else {
        format!("https://{hostname}-{prefix}-{port}.{domain}")
    }
}

/// URL of `hostname`'s subdomain on `port`.
///
/// `subdomain_host` is `<prefix>.<domain>`, e.g. `1df2.prg1.zerops.app`.
/// Returns `None` for a bare prefix without a domain.
#[must_use]
pub fn build_subdomain_url(hostname: &str, subdomain_host: &str, port: u16) -> Option<String> {
    let (prefix, domain) = subdomain_host.split_once('.')?;
    if prefix.is_empty() || domain.is_empty() {
        return None;
    }
    Some(url_for(hostname, prefix, domain, port))
}

/// Domain suffix of a subdomain URL: everything after the first dot of the
/// host. `https://app-1df2-3000.prg1.zerops.app` gives `prg1.zerops.app`.
#[must_use]
pub fn parse_subdomain_domain(url: &str) -> Option<&str> {
    let host = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = host.split_once('/').map_or(host, |(h, _)| h);
    match host.split_once('.') {
        Some((_, domain)) if !domain.is_empty() => Some(domain),
        _ => None,
    }
}

/// One URL per port.
///
/// When `subdomain_host` is a bare prefix, `fallback_domain` (taken from
/// the `zeropsSubdomain` env var) supplies the domain; with neither the
/// result is empty.
#[must_use]
pub fn subdomain_urls(
    hostname: &str,
    subdomain_host: &str,
    ports: &[Port],
    fallback_domain: Option<&str>,
) -> Vec<String> {
    if subdomain_host.is_empty() {
        return Vec::new();
    }
    let direct: Vec<String> = ports
        .iter()
        .filter_map(|p| build_subdomain_url(hostname, subdomain_host, p.port))
        .collect();
    if !direct.is_empty() {
        return direct;
    }
    match fallback_domain {
        Some(domain) => ports
            .iter()
            .map(|p| url_for(hostname, subdomain_host, domain, p.port))
            .collect(),
        None => Vec::new(),
    }
}
