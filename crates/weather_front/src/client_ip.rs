use hyper::HeaderMap;
use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Picks the address to geolocate for a request.
///
/// Proxy headers are only read when `trust_proxy_headers` is set, since any client can send them.
/// Addresses that cannot be geolocated (loopback, private, unspecified) are swapped for
/// `fallback` when one is configured.
pub fn resolve(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
    fallback: Option<IpAddr>,
) -> Option<IpAddr> {
    let from_headers = if trust_proxy_headers {
        header_ip(headers)
    } else {
        None
    };
    let ip = from_headers.or(peer.map(|addr| addr.ip()));

    match (ip, fallback) {
        (Some(ip), Some(fallback)) if !is_public(ip) => Some(fallback),
        (None, fallback) => fallback,
        (ip, _) => ip,
    }
}

fn header_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(ip) = headers
        .get(X_REAL_IP)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| IpAddr::from_str(value.trim()).ok())
    {
        return Some(ip);
    }
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| IpAddr::from_str(first.trim()).ok())
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public(IpAddr::V4(v4));
            }
            // fc00::/7 unique local, fe80::/10 link local
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}
