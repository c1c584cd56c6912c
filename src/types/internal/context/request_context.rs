use std::net::IpAddr;

use crate::types::internal::auth::Principal;

use super::{request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Contains contextual information about the current request that is needed
/// for logging and auditing across API, coordinator, and service layers.
/// The principal is only ever set from a fresh session resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Resolved principal, if the session resolved to an active account
    pub principal: Option<Principal>,
}

impl RequestContext {
    /// Create a RequestContext for an API request
    pub fn for_api(ip_address: Option<IpAddr>) -> Self {
        Self {
            ip_address,
            request_id: RequestId::new(),
            source: RequestSource::API,
            principal: None,
        }
    }

    /// Create a RequestContext for CLI operations
    pub fn for_cli() -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            source: RequestSource::CLI,
            principal: None,
        }
    }

    /// Create a RequestContext for system operations (purge sweep)
    pub fn for_system() -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            source: RequestSource::System,
            principal: None,
        }
    }

    /// Attach the resolved principal
    pub fn with_principal(mut self, principal: Option<Principal>) -> Self {
        self.principal = principal;
        self
    }

    /// Actor id for log lines
    pub fn actor_label(&self) -> &str {
        match (&self.principal, &self.source) {
            (Some(principal), _) => &principal.user_id,
            (None, RequestSource::CLI) => "cli",
            (None, RequestSource::System) => "system",
            (None, RequestSource::API) => "anonymous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::auth::Role;

    #[test]
    fn test_for_api_defaults_to_anonymous() {
        let ctx = RequestContext::for_api(None);

        assert_eq!(ctx.source, RequestSource::API);
        assert!(ctx.principal.is_none());
        assert_eq!(ctx.actor_label(), "anonymous");
    }

    #[test]
    fn test_actor_label_uses_principal_when_present() {
        let ctx = RequestContext::for_api(Some("127.0.0.1".parse().unwrap())).with_principal(Some(Principal {
            user_id: "u-1".to_string(),
            email: "a@x.org".to_string(),
            role: Role::Admin,
        }));

        assert_eq!(ctx.actor_label(), "u-1");
        assert_eq!(ctx.ip_address, Some("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_for_system_and_cli_labels() {
        assert_eq!(RequestContext::for_system().actor_label(), "system");
        assert_eq!(RequestContext::for_cli().actor_label(), "cli");
        assert_eq!(RequestContext::for_system().source, RequestSource::System);
    }
}
