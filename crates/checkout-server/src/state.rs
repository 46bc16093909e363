//! Application State

use std::path::PathBuf;
use std::sync::Arc;

use checkout_core::CheckoutSettings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout endpoint advertised to the demo page
    pub settings: Arc<CheckoutSettings>,

    /// Directory holding the sample page and the compiled WASM bundle
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(settings: CheckoutSettings, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings: Arc::new(settings),
            static_dir: static_dir.into(),
        }
    }

    /// Create from environment variables (`CHECKOUT_URL`, `STATIC_DIR`)
    pub fn from_env() -> checkout_core::Result<Self> {
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());
        Ok(Self::new(CheckoutSettings::from_env()?, static_dir))
    }
}
