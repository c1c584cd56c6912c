use std::net::IpAddr;
use std::time::Duration;

use poem::Request;
use poem::web::cookie::{Cookie, SameSite};

use crate::auth::SessionResolver;
use crate::errors::InternalError;
use crate::providers::SESSION_TOKEN_TTL_SECONDS;
use crate::types::internal::context::RequestContext;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "roster_session";

/// Extract the client IP from proxy headers or the socket address
pub fn extract_ip_address(req: &Request) -> Option<IpAddr> {
    // Check X-Forwarded-For header (proxy/load balancer)
    if let Some(forwarded) = req.header("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().parse().ok();
        }
    }

    // Check X-Real-IP header (nginx)
    if let Some(real_ip) = req.header("X-Real-IP") {
        return real_ip.trim().parse().ok();
    }

    // Fall back to remote address
    req.remote_addr().as_socket_addr().map(|addr| addr.ip())
}

/// Read the session token from the `Cookie` header
pub fn session_token(req: &Request) -> Option<String> {
    req.headers()
        .get_all(poem::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, SESSION_COOKIE))
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

fn base_cookie(value: &str, secure: bool) -> Cookie {
    let mut cookie = Cookie::new_with_str(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = base_cookie(token, secure);
    cookie.set_max_age(Duration::from_secs(SESSION_TOKEN_TTL_SECONDS as u64));
    cookie.to_string()
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = base_cookie("", secure);
    cookie.set_max_age(Duration::ZERO);
    cookie.to_string()
}

/// Build the request context, resolving the session cookie if present
///
/// The principal is always re-resolved against the user row; a stale or
/// invalid cookie yields an anonymous context.
pub async fn create_request_context(
    req: &Request,
    session_resolver: &SessionResolver,
) -> Result<RequestContext, InternalError> {
    let token = session_token(req);
    let principal = session_resolver.resolve(token.as_deref()).await?;

    let ctx = RequestContext::for_api(extract_ip_address(req)).with_principal(principal);

    tracing::debug!(
        request_id = %ctx.request_id,
        actor = %ctx.actor_label(),
        ip = ?ctx.ip_address,
        "Request context created"
    );

    Ok(ctx)
}
