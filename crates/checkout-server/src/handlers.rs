//! HTTP Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use checkout_core::{Outcome, OutcomeStatus};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// What the demo page needs to know about the checkout endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub checkout_url: String,
    pub checkout_origin: String,
    pub trusted_origins: Vec<String>,
}

/// Query of a completion redirect; absent parameters read as `""`
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub status: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Checkout endpoint and origin allow-list
pub async fn checkout_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let settings = &state.settings;
    Json(ConfigResponse {
        checkout_url: settings.checkout_url().into(),
        checkout_origin: settings.checkout_origin().into(),
        trusted_origins: settings.trusted_origins().to_vec(),
    })
}

/// Landing point of `callback_url` redirects
pub async fn payment_callback(Query(query): Query<CallbackQuery>) -> Json<Outcome> {
    let outcome = Outcome {
        reference: query.reference,
        status: OutcomeStatus::parse(&query.status),
    };

    match outcome.status {
        OutcomeStatus::Success => {
            tracing::info!(reference = %outcome.reference, "Payment completed");
        }
        OutcomeStatus::Other(ref status) if status.is_empty() => {
            tracing::warn!(reference = %outcome.reference, "Redirect carried no status");
        }
        _ => {
            tracing::info!(reference = %outcome.reference, status = %outcome.status, "Payment not completed");
        }
    }

    Json(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use checkout_core::CheckoutSettings;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let settings = CheckoutSettings::new("https://checkout.staging.example:8443/pay").unwrap();
        crate::app(AppState::new(settings, "does-not-exist"))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(uri: &str) -> (StatusCode, T) {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, health): (_, HealthResponse) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, "healthy");
    }

    #[tokio::test]
    async fn test_config_reports_origin() {
        let (status, config): (_, ConfigResponse) = get_json("/api/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(config.checkout_url, "https://checkout.staging.example:8443/pay");
        assert_eq!(config.checkout_origin, "https://checkout.staging.example:8443");
        assert_eq!(config.trusted_origins, vec!["https://checkout.staging.example:8443"]);
    }

    #[tokio::test]
    async fn test_callback_echoes_outcome() {
        let (status, outcome): (_, Outcome) =
            get_json("/payment/callback?reference=COR_1&status=success").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome.reference, "COR_1");
        assert_eq!(outcome.status, OutcomeStatus::Success);
    }

    #[tokio::test]
    async fn test_callback_missing_params() {
        let (_, outcome): (_, Outcome) = get_json("/payment/callback").await;
        assert_eq!(outcome.reference, "");
        assert_eq!(outcome.status, OutcomeStatus::Other(String::new()));
    }

    #[tokio::test]
    async fn test_unknown_path_falls_through_to_static() {
        let response = app()
            .oneshot(Request::get("/nope.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
