//! Origin-Gated Message Channel
//!
//! Receive-side filter. A message reaches the dispatcher only if it carries a
//! payload and an origin, comes from the session's own frame window, and
//! declares a trusted origin.

use crate::error::CheckoutError;
use crate::message::{InboundEvent, InboundMessage};
use crate::settings::CheckoutSettings;
use crate::validate::is_present;

/// Why a message was not admitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// No data attached to the message
    NoPayload,
    /// Transport supplied no origin
    NoOrigin,
    /// Sent by some other window than the checkout frame
    ForeignSource,
    /// Declared origin is not on the allow-list
    UntrustedOrigin(String),
}

impl Rejection {
    /// Only origin failures are reported as security errors; the rest is
    /// ordinary cross-window chatter not meant for us
    pub fn into_error(self) -> Option<CheckoutError> {
        match self {
            Rejection::UntrustedOrigin(origin) => {
                Some(CheckoutError::Security(format!("Invalid origin: {origin}")))
            }
            _ => None,
        }
    }
}

/// Allow-list check on inbound messages
#[derive(Clone, Debug)]
pub struct OriginGate {
    trusted: Vec<String>,
}

impl OriginGate {
    pub fn new(settings: &CheckoutSettings) -> Self {
        Self {
            trusted: settings.trusted_origins().to_vec(),
        }
    }

    /// Exact match on the serialized origin
    pub fn is_trusted(&self, origin: &str) -> bool {
        self.trusted.iter().any(|t| t == origin)
    }

    /// Screen one message against the window of the frame it claims to come
    /// from (`None` when no live frame has a window)
    pub fn screen<W: PartialEq>(
        &self,
        event: &InboundEvent<W>,
        frame_window: Option<&W>,
    ) -> Result<InboundMessage, Rejection> {
        let data = event
            .data
            .as_ref()
            .filter(|d| is_present(Some(*d)))
            .ok_or(Rejection::NoPayload)?;

        let origin = event
            .origin
            .as_deref()
            .filter(|o| !o.is_empty())
            .ok_or(Rejection::NoOrigin)?;

        match (event.source.as_ref(), frame_window) {
            (Some(source), Some(window)) if source == window => {}
            _ => return Err(Rejection::ForeignSource),
        }

        if !self.is_trusted(origin) {
            return Err(Rejection::UntrustedOrigin(origin.to_string()));
        }

        Ok(InboundMessage::from_envelope(origin, data))
    }
}
