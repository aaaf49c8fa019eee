//! Request extractors.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

/// Best-effort client address for logging.
///
/// Uses the first `X-Forwarded-For` entry when present, otherwise the TCP
/// peer address, otherwise `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(strip_port);

        let addr = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(peer)| peer.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientAddr(addr))
    }
}

fn strip_port(value: &str) -> String {
    value
        .parse::<SocketAddr>()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(req: Request<()>) -> String {
        let (mut parts, _) = req.into_parts();
        let ClientAddr(addr) = ClientAddr::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        addr
    }

    #[tokio::test]
    async fn prefers_forwarded_for() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await, "203.0.113.7");
    }

    #[tokio::test]
    async fn strips_port_from_forwarded_for() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7:5555")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await, "203.0.113.7");
    }

    #[tokio::test]
    async fn falls_back_to_peer_then_unknown() {
        let mut req = Request::builder().body(()).unwrap();
        assert_eq!(extract(req).await, "unknown");

        req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.1:4000".parse::<SocketAddr>().unwrap()));
        assert_eq!(extract(req).await, "192.0.2.1");
    }
}
