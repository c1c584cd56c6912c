use std::sync::Arc;

use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::providers::Clock;
use crate::types::dto::common::HealthResponse;

/// Health check API
pub struct HealthApi {
    clock: Arc<dyn Clock>,
}

impl HealthApi {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

/// API tags for health endpoints
#[derive(Tags)]
enum ApiTags {
    /// Health check endpoints
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    ///
    /// Returns the current status of the API service
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: self.clock.now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ManualClock;
    use crate::test::utils::TEST_NOW;

    #[tokio::test]
    async fn test_health_reports_clock_time() {
        let api = HealthApi::new(Arc::new(ManualClock::at_timestamp(TEST_NOW)));

        let response = api.health().await;

        assert_eq!(response.0.status, "healthy");
        assert!(response.0.timestamp.starts_with("2025-06-15T15:06:40"));
    }
}
