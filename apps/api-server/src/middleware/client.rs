//! Client address resolution.

use actix_web::HttpRequest;

/// Address used for rate limiting and stored with submissions.
///
/// The socket peer is authoritative unless `trust_proxy` is set, in which
/// case `Forwarded`/`X-Forwarded-For` win. Those headers are client
/// controlled when no proxy rewrites them.
pub fn client_address(req: &HttpRequest, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        return req.connection_info().realip_remote_addr().map(str::to_string);
    }
    req.peer_addr().map(|addr| addr.ip().to_string())
}
