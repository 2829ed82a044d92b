pub mod forecast_api;
mod home;

pub use forecast_api::*;
pub use home::*;

use crate::{client_ip, AppState};
use axum::extract::{ConnectInfo, Request};
use std::net::{IpAddr, SocketAddr};

/// Address the request came from, see `client_ip::resolve` for how proxies are handled.
fn caller_ip(state: &AppState, request: &Request) -> Option<IpAddr> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_ip::resolve(
        request.headers(),
        peer,
        state.settings.trust_proxy_headers,
        state.settings.dev_fallback_ip,
    )
}
