//! Library Settings
//!
//! Where the hosted checkout lives and which origins may talk to us.

use url::Url;

use crate::error::{CheckoutError, Result};

/// Production checkout endpoint
pub const DEFAULT_CHECKOUT_URL: &str = "https://checkout.cashonrails.com";

/// Endpoint and origin allow-list for one host page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSettings {
    checkout_url: String,
    checkout_origin: String,
    trusted_origins: Vec<String>,
}

impl CheckoutSettings {
    /// Build settings for a checkout endpoint.
    ///
    /// The allow-list is the single serialized origin (scheme, host, port)
    /// of the endpoint.
    pub fn new(checkout_url: impl Into<String>) -> Result<Self> {
        let checkout_url = checkout_url.into();
        let origin = origin_of(&checkout_url)?;

        Ok(Self {
            checkout_url,
            checkout_origin: origin.clone(),
            trusted_origins: vec![origin],
        })
    }

    /// Create from environment variables (`CHECKOUT_URL`), falling back to
    /// the production endpoint
    pub fn from_env() -> Result<Self> {
        match std::env::var("CHECKOUT_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// URL loaded into the frame
    pub fn checkout_url(&self) -> &str {
        &self.checkout_url
    }

    /// Target origin for every outbound message
    pub fn checkout_origin(&self) -> &str {
        &self.checkout_origin
    }

    /// Origins whose messages are accepted
    pub fn trusted_origins(&self) -> &[String] {
        &self.trusted_origins
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            checkout_url: DEFAULT_CHECKOUT_URL.into(),
            checkout_origin: DEFAULT_CHECKOUT_URL.into(),
            trusted_origins: vec![DEFAULT_CHECKOUT_URL.into()],
        }
    }
}

fn origin_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(CheckoutError::Config(format!(
            "checkout URL '{url}' has no network origin"
        )));
    }
    Ok(origin.ascii_serialization())
}
