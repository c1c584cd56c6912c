use std::sync::Arc;

use poem::http::StatusCode;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

use crate::api::helpers;
use crate::providers::EdgeTokenVerifier;

/// Middleware rejecting requests under a path prefix that do not carry a
/// validly signed, unexpired session cookie
///
/// Uses only the lightweight verifier and never reads the database. It is
/// a first filter; handlers still resolve the session fully.
pub struct EdgeGuard {
    verifier: Arc<EdgeTokenVerifier>,
    protected_prefix: String,
}

impl EdgeGuard {
    /// # Arguments
    /// * `verifier` - Lightweight token verifier sharing the session secret
    /// * `protected_prefix` - Full request path prefix to guard, e.g. `/api/admin`
    pub fn new(verifier: Arc<EdgeTokenVerifier>, protected_prefix: impl Into<String>) -> Self {
        Self {
            verifier,
            protected_prefix: protected_prefix.into(),
        }
    }
}

impl<E: Endpoint> Middleware<E> for EdgeGuard {
    type Output = EdgeGuardEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        EdgeGuardEndpoint {
            inner: ep,
            verifier: self.verifier.clone(),
            protected_prefix: self.protected_prefix.clone(),
        }
    }
}

pub struct EdgeGuardEndpoint<E> {
    inner: E,
    verifier: Arc<EdgeTokenVerifier>,
    protected_prefix: String,
}

impl<E> EdgeGuardEndpoint<E> {
    fn is_protected(&self, req: &Request) -> bool {
        let path = req.original_uri().path();
        path == self.protected_prefix
            || path
                .strip_prefix(self.protected_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl<E: Endpoint> Endpoint for EdgeGuardEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        if self.is_protected(&req) {
            let Some(token) = helpers::session_token(&req) else {
                tracing::debug!(path = %req.original_uri().path(), "Edge guard: no session cookie");
                return Ok(unauthenticated());
            };

            if let Err(rejection) = self.verifier.verify(&token) {
                tracing::debug!(
                    path = %req.original_uri().path(),
                    class = ?rejection.class,
                    "Edge guard: session token rejected"
                );
                return Ok(unauthenticated());
            }
        }

        self.inner.call(req).await.map(IntoResponse::into_response)
    }
}

fn unauthenticated() -> Response {
    let body = serde_json::json!({
        "error": "unauthenticated",
        "message": "Authentication required",
        "status_code": 401,
    });

    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .content_type("application/json")
        .body(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ManualClock, TokenProvider};
    use crate::test::utils::{TEST_NOW, TEST_SESSION_SECRET, test_secret_manager, token_subject};
    use crate::types::internal::auth::Role;
    use chrono::Duration;
    use poem::endpoint::make_sync;
    use poem::http::uri::Scheme;
    use poem::web::{LocalAddr, RemoteAddr};
    use poem::{Body, EndpointExt, RequestParts, Route};

    fn setup() -> (Arc<ManualClock>, TokenProvider, impl Endpoint) {
        let clock = Arc::new(ManualClock::at_timestamp(TEST_NOW));
        let tokens = TokenProvider::new(test_secret_manager(), clock.clone());
        let verifier = Arc::new(EdgeTokenVerifier::new(TEST_SESSION_SECRET, clock.clone()));
        let ep = make_sync(|_| "handler ran").with(EdgeGuard::new(verifier, "/api/admin"));
        (clock, tokens, ep)
    }

    /// Build a request the way the server does, so `original_uri` is set
    fn request(path: &str, cookie: Option<&str>) -> Request {
        let mut builder = poem::http::Request::builder().uri(path);
        if let Some(token) = cookie {
            builder = builder.header("Cookie", format!("roster_session={}", token));
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        let parts = RequestParts::from((parts, LocalAddr::default(), RemoteAddr::default(), Scheme::HTTP));
        Request::from_parts(parts, Body::empty())
    }

    async fn status(ep: &impl Endpoint, req: Request) -> StatusCode {
        ep.call(req).await.map(IntoResponse::into_response).unwrap().status()
    }

    #[test]
    fn test_request_helper_sets_original_uri() {
        assert_eq!(request("/api/admin/users", None).original_uri().path(), "/api/admin/users");
    }

    #[tokio::test]
    async fn test_guard_inside_nested_route_sees_full_path() {
        let (_clock, tokens, _ep) = setup();
        let clock = Arc::new(ManualClock::at_timestamp(TEST_NOW));
        let verifier = Arc::new(EdgeTokenVerifier::new(TEST_SESSION_SECRET, clock));
        let app = Route::new().nest(
            "/api",
            make_sync(|_| "handler ran").with(EdgeGuard::new(verifier, "/api/admin")),
        );

        assert_eq!(status(&app, request("/api/admin/users", None)).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(&app, request("/api/auth/me", None)).await, StatusCode::OK);

        let token = tokens.issue(&token_subject("u1", "a@x.org", Role::Admin)).unwrap();
        assert_eq!(
            status(&app, request("/api/admin/users", Some(&token))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_rejection_body_matches_api_errors() {
        let (_clock, _tokens, ep) = setup();

        let resp = ep
            .call(request("/api/admin/users", None))
            .await
            .map(IntoResponse::into_response)
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_str(&resp.into_body().into_string().await.unwrap()).unwrap();
        assert_eq!(body["error"], "unauthenticated");
        assert_eq!(body["status_code"], 401);
    }

    #[tokio::test]
    async fn test_unprotected_paths_pass_through() {
        let (_clock, _tokens, ep) = setup();

        assert_eq!(status(&ep, request("/api/health", None)).await, StatusCode::OK);
        assert_eq!(status(&ep, request("/api/administrator", None)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_cookie_is_rejected() {
        let (_clock, _tokens, ep) = setup();

        assert_eq!(status(&ep, request("/api/admin/users", None)).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(&ep, request("/api/admin", None)).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let (_clock, tokens, ep) = setup();
        let token = tokens.issue(&token_subject("u1", "a@x.org", Role::Member)).unwrap();

        // Role is not checked here; the handler's gate decides
        assert_eq!(
            status(&ep, request("/api/admin/users", Some(&token))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_expired_or_forged_token_is_rejected() {
        let (clock, tokens, ep) = setup();
        let token = tokens.issue(&token_subject("u1", "a@x.org", Role::Admin)).unwrap();

        let forged = format!("{}x", token);
        assert_eq!(
            status(&ep, request("/api/admin/users", Some(&forged))).await,
            StatusCode::UNAUTHORIZED
        );

        clock.advance(Duration::days(7));
        assert_eq!(
            status(&ep, request("/api/admin/users", Some(&token))).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
