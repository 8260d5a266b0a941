//! Rate-limit key derivation from the caller's network address.

use axum::extract::ConnectInfo;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::request::Parts;
use std::net::SocketAddr;

use crate::domain::rate_limiter::ClientKey;

/// Key used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derives a [`ClientKey`] from a request.
///
/// When `behind_proxy` is set, the first `X-Forwarded-For` entry (or
/// `X-Real-IP`) wins. Enable only behind a trusted reverse proxy; otherwise
/// callers can pick their own key. Without proxy trust, or when the headers
/// are absent, the peer socket address is used. The peer comes from
/// `ConnectInfo`, or from `MockConnectInfo` in test harnesses that serve the
/// router without a real socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIdentityResolver {
    behind_proxy: bool,
}

impl ClientIdentityResolver {
    pub fn new(behind_proxy: bool) -> Self {
        Self { behind_proxy }
    }

    pub fn resolve(&self, parts: &Parts) -> ClientKey {
        if self.behind_proxy
            && let Some(ip) = forwarded_ip(parts)
        {
            return ClientKey::new(ip);
        }

        peer_ip(parts)
            .map(ClientKey::new)
            .unwrap_or_else(|| ClientKey::new(UNKNOWN_CLIENT))
    }
}

fn forwarded_ip(parts: &Parts) -> Option<String> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("x-real-ip").map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
}

fn peer_ip(parts: &Parts) -> Option<String> {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .or_else(|| {
            parts
                .extensions
                .get::<MockConnectInfo<SocketAddr>>()
                .map(|MockConnectInfo(addr)| addr.ip().to_string())
        })
}
