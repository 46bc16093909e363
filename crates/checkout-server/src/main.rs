//! checkout-server
//!
//! Axum-based demo host: serves the sample page with the compiled WASM
//! bundle and receives completion redirects. No payment processing happens
//! here.

mod handlers;
mod state;

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{checkout_config, health_check, payment_callback};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::from_env()?;
    tracing::info!(
        checkout_url = %state.settings.checkout_url(),
        static_dir = %state.static_dir.display(),
        "Checkout settings loaded"
    );

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Demo host running on http://{}", addr);
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  GET  /api/config        - Checkout endpoint");
    tracing::info!("  GET  /payment/callback  - Completion redirects");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Routes, static files and middleware
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/config", get(checkout_config))
        .route("/payment/callback", get(payment_callback))
        // Sample page and WASM bundle
        .fallback_service(ServeDir::new(&state.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
