use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::helpers;
use crate::auth::SessionResolver;
use crate::coordinators::AuthCoordinator;
use crate::errors::api::AuthError;
use crate::providers::SESSION_TOKEN_TTL_SECONDS;
use crate::types::dto::auth::{
    HeartbeatResponse, LoginApiResponse, LoginRequest, LoginResponse, LogoutApiResponse,
    PasswordResetRequest, RegisterApiResponse, RegisterRequest, SessionResponse,
};
use crate::types::dto::common::MessageResponse;
use crate::types::internal::context::RequestContext;

/// Authentication API endpoints
pub struct AuthApi {
    auth_coordinator: Arc<AuthCoordinator>,
    session_resolver: Arc<SessionResolver>,
    cookie_secure: bool,
}

impl AuthApi {
    /// Create a new AuthApi
    pub fn new(
        auth_coordinator: Arc<AuthCoordinator>,
        session_resolver: Arc<SessionResolver>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            auth_coordinator,
            session_resolver,
            cookie_secure,
        }
    }

    async fn context(&self, req: &Request) -> Result<RequestContext, AuthError> {
        helpers::create_request_context(req, &self.session_resolver)
            .await
            .map_err(AuthError::from_internal_error)
    }
}

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Register a new member account
    #[oai(path = "/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register(
        &self,
        req: &Request,
        body: Json<RegisterRequest>,
    ) -> Result<RegisterApiResponse, AuthError> {
        let ctx = RequestContext::for_api(helpers::extract_ip_address(req));

        let principal = self
            .auth_coordinator
            .register(&ctx, &body.email, &body.password)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(RegisterApiResponse::Created(Json(principal.into())))
    }

    /// Authenticate with email and password
    ///
    /// Sets the `roster_session` cookie, valid for 7 days.
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, req: &Request, body: Json<LoginRequest>) -> Result<LoginApiResponse, AuthError> {
        let ctx = RequestContext::for_api(helpers::extract_ip_address(req));

        let outcome = self
            .auth_coordinator
            .login(&ctx, &body.email, &body.password)
            .await
            .map_err(AuthError::from_internal_error)?;

        let cookie = helpers::session_cookie(&outcome.token, self.cookie_secure);

        Ok(LoginApiResponse::Ok(
            Json(LoginResponse {
                user: outcome.principal.into(),
                expires_in: SESSION_TOKEN_TTL_SECONDS,
            }),
            cookie,
        ))
    }

    /// Clear the session cookie
    ///
    /// Always succeeds; an outstanding token stays valid until it expires
    /// or its account leaves the Active state.
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self) -> LogoutApiResponse {
        LogoutApiResponse::Ok(
            Json(MessageResponse::new("Logged out successfully")),
            helpers::clear_session_cookie(self.cookie_secure),
        )
    }

    /// Current user information, with the role as currently stored
    #[oai(path = "/me", method = "get", tag = "AuthTags::Authentication")]
    async fn me(&self, req: &Request) -> Result<Json<SessionResponse>, AuthError> {
        let ctx = self.context(req).await?;

        let principal = self.auth_coordinator.me(&ctx)?;

        Ok(Json(principal.into()))
    }

    /// Record that the current user is online
    #[oai(path = "/heartbeat", method = "post", tag = "AuthTags::Authentication")]
    async fn heartbeat(&self, req: &Request) -> Result<Json<HeartbeatResponse>, AuthError> {
        let ctx = self.context(req).await?;

        let online_at = self.auth_coordinator.heartbeat(&ctx).await?;

        Ok(Json(HeartbeatResponse { online_at }))
    }

    /// Complete a password reset with an out-of-band token
    #[oai(path = "/password-reset", method = "post", tag = "AuthTags::Authentication")]
    async fn password_reset(
        &self,
        req: &Request,
        body: Json<PasswordResetRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = RequestContext::for_api(helpers::extract_ip_address(req));

        self.auth_coordinator
            .complete_password_reset(&ctx, &body.email, &body.token, &body.new_password)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Password has been reset")))
    }
}
