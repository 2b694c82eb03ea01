//! URL Guard / Timeout Controller (spec.md §4.C): validates outbound URLs
//! against SSRF and wraps outbound calls with a cancellable deadline.
//!
//! Host-range checks are grounded on
//! `nebula_validator::validators::network::ip_address::IpAddress::is_private`
//! (octet-range checks for 10/8, 172.16/12, 192.168/16, `fc00::/7`), extended
//! here with link-local ranges and — per SPEC_FULL.md §4.C — DNS resolution
//! of the host before the range check, so a hostname that resolves to a
//! private address is rejected too (closes the SSRF-via-DNS-rebinding gap
//! spec.md §4.C implies but doesn't spell out).

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use url::Url;

use crate::error::{EngineError, Result};

/// Default deadline for forwarded HTTP node calls (spec.md §4.C, §5).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hosts allow-listed despite resolving to a private/loopback range.
/// Empty by default; a deployment may extend this for known internal gears.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    hosts: Vec<String>,
}

impl AllowList {
    pub fn new(hosts: Vec<String>) -> Self {
        Self { hosts }
    }

    pub fn allows(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
    }
}

/// Validate an outbound URL per spec.md §4.C: scheme must be http/https, and
/// the resolved host must not be loopback, link-local, or RFC1918/ULA unless
/// allow-listed.
pub fn validate_http_url(raw: &str, allow_list: &AllowList) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| EngineError::InvalidUrl(format!("{raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(EngineError::InvalidUrl(format!("unsupported scheme: {other}"))),
    }

    let host = url.host_str().ok_or_else(|| EngineError::InvalidUrl(format!("{raw}: missing host")))?;

    if allow_list.allows(host) {
        return Ok(url);
    }

    // Literal IP in the URL: check directly, no DNS round trip needed.
    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_disallowed(&ip) {
            return Err(EngineError::DisallowedHost(host.to_string()));
        }
        return Ok(url);
    }

    // Hostname: resolve and check every candidate address, closing the
    // DNS-rebinding gap — a hostname resolving to even one private/loopback
    // address is rejected.
    let port = url.port_or_known_default().unwrap_or(80);
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| EngineError::InvalidUrl(format!("{raw}: DNS resolution failed: {e}")))?;

    let mut resolved_any = false;
    for addr in addrs {
        resolved_any = true;
        if is_disallowed(&ip_of(addr)) {
            return Err(EngineError::DisallowedHost(host.to_string()));
        }
    }
    if !resolved_any {
        return Err(EngineError::InvalidUrl(format!("{raw}: host did not resolve to any address")));
    }

    Ok(url)
}

fn ip_of(addr: SocketAddr) -> IpAddr {
    addr.ip()
}

fn is_disallowed(ip: &IpAddr) -> bool {
    ip.is_loopback() || is_link_local(ip) || is_private(ip)
}

fn is_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

/// RFC1918 (10/8, 172.16/12, 192.168/16) and RFC4193 ULA (`fc00::/7`).
fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    let o = ip.octets();
    o[0] == 10 || (o[0] == 172 && (o[1] & 0xf0) == 16) || (o[0] == 192 && o[1] == 168)
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}
