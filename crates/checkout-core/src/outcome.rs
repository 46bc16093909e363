//! Outcome Resolution
//!
//! Decides how the result of a finished checkout reaches the host:
//!
//! 1. the host's own `callback_url`, with `reference` and `status` appended
//! 2. a redirect URL chosen by the checkout, followed verbatim
//! 3. the registered `onComplete` / `onCancel` callback
//!
//! The first that applies wins.

use url::Url;

use crate::error::Result;
use crate::host::HostPage;
use crate::lifecycle::FrameLifecycle;
use crate::message::{Outcome, TerminalPayload};
use crate::session::Session;

/// Which terminal event is being resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    Complete,
    Cancel,
}

impl std::fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveMode::Complete => write!(f, "complete"),
            ResolveMode::Cancel => write!(f, "cancel"),
        }
    }
}

/// How an outcome was delivered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Navigated to the host callback URL (with query parameters)
    HostRedirect(String),
    /// Navigated to the checkout-supplied URL
    PeerRedirect(String),
    /// Invoked the registered callback
    Callback(Outcome),
    /// Nothing registered to receive it
    Dropped(Outcome),
    /// Session had already concluded; nothing happened
    AlreadyResolved,
}

pub struct OutcomeResolver<'a, H: HostPage> {
    host: &'a H,
    lifecycle: &'a FrameLifecycle<'a, H>,
}

impl<'a, H: HostPage> OutcomeResolver<'a, H> {
    pub fn new(host: &'a H, lifecycle: &'a FrameLifecycle<'a, H>) -> Self {
        Self { host, lifecycle }
    }

    /// Tear the frame down, then deliver the outcome exactly once
    pub fn resolve(&self, mode: ResolveMode, payload: &TerminalPayload, session: &Session) -> Result<Delivery> {
        if session.is_terminal() {
            tracing::debug!(frame_id = %session.id(), "Session already resolved, ignoring");
            return Ok(Delivery::AlreadyResolved);
        }
        self.lifecycle.close(session);

        let outcome = payload.outcome();
        let config = session.config();

        if let Some(callback_url) = config.callback_url.as_deref().filter(|u| !u.is_empty()) {
            let url = redirect_url(callback_url, &outcome)?;
            tracing::info!(frame_id = %session.id(), %mode, url = %url, "Redirecting to host callback URL");
            self.host.navigate(&url)?;
            return Ok(Delivery::HostRedirect(url));
        }

        if let Some(url) = payload.callback_url.as_deref() {
            tracing::info!(frame_id = %session.id(), %mode, url = %url, "Redirecting to checkout callback URL");
            self.host.navigate(url)?;
            return Ok(Delivery::PeerRedirect(url.to_string()));
        }

        let slot = match mode {
            ResolveMode::Complete => &config.callbacks.on_complete,
            ResolveMode::Cancel => &config.callbacks.on_cancel,
        };
        match slot.handler() {
            Some(handler) => {
                tracing::info!(
                    frame_id = %session.id(),
                    %mode,
                    reference = %outcome.reference,
                    status = %outcome.status,
                    "Delivering outcome to callback"
                );
                handler(&outcome);
                Ok(Delivery::Callback(outcome))
            }
            None => {
                tracing::debug!(frame_id = %session.id(), %mode, "No callback registered, outcome dropped");
                Ok(Delivery::Dropped(outcome))
            }
        }
    }
}

/// Append `reference` and `status` to a callback URL, keeping its query
pub fn redirect_url(callback_url: &str, outcome: &Outcome) -> Result<String> {
    let mut url = Url::parse(callback_url)?;
    url.query_pairs_mut()
        .append_pair("reference", &outcome.reference)
        .append_pair("status", outcome.status.as_str());
    Ok(url.into())
}
