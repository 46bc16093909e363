//! Protocol Dispatcher
//!
//! Routes an admitted message to the handler for its declared type.

use crate::config::Integration;
use crate::error::{CheckoutError, Result};
use crate::host::HostPage;
use crate::lifecycle::FrameLifecycle;
use crate::message::{EventType, InboundMessage, InitiationPayload, OutboundMessage, TerminalPayload};
use crate::outcome::{Delivery, OutcomeResolver, ResolveMode};
use crate::sender;
use crate::session::{Session, SessionState};
use crate::settings::CheckoutSettings;

/// Result of a successful dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// Initiation payload posted (false: the frame was already gone)
    Initiated { delivered: bool },
    /// Terminal event resolved
    Resolved(Delivery),
}

pub struct Dispatcher<'a, H: HostPage> {
    host: &'a H,
    settings: &'a CheckoutSettings,
}

impl<'a, H: HostPage> Dispatcher<'a, H> {
    pub fn new(host: &'a H, settings: &'a CheckoutSettings) -> Self {
        Self { host, settings }
    }

    pub fn dispatch(&self, message: &InboundMessage, session: &Session) -> Result<Dispatched> {
        tracing::debug!(frame_id = %session.id(), event = %message.event, "Dispatching checkout message");

        match &message.event {
            EventType::InitiateTransaction => self.initiate(session),
            EventType::CloseTransaction => self.resolve(ResolveMode::Complete, message, session),
            EventType::CancelTransaction => self.resolve(ResolveMode::Cancel, message, session),
            EventType::Unknown(other) => Err(CheckoutError::Protocol(format!("Unknown event type '{other}'"))),
        }
    }

    fn initiate(&self, session: &Session) -> Result<Dispatched> {
        let config = session.config();

        let errors = config.validate();
        if !errors.is_empty() {
            if config.debug {
                if let Err(e) = self.host.show_debug_overlay(&errors) {
                    tracing::warn!(error = %e, "Could not render debug overlay");
                }
            }
            return Err(CheckoutError::Validation(errors));
        }

        let payload = match &config.integration {
            Integration::Direct(params) => {
                let reference = session.reference().map(|r| r.as_str()).unwrap_or_default();
                InitiationPayload::inline(params, reference, config.callback_url.as_deref())
            }
            Integration::AccessCode(params) => InitiationPayload::access_code(&params.access_code),
        };

        let delivered = sender::send(
            self.host,
            session.id(),
            &OutboundMessage::InitiateTransaction(payload),
            self.settings.checkout_origin(),
        )?;

        if delivered {
            session.advance(SessionState::Initiated);
            tracing::info!(
                frame_id = %session.id(),
                reference = ?session.reference().map(|r| r.as_str()),
                "Transaction details sent to checkout"
            );
        }
        Ok(Dispatched::Initiated { delivered })
    }

    fn resolve(&self, mode: ResolveMode, message: &InboundMessage, session: &Session) -> Result<Dispatched> {
        let lifecycle = FrameLifecycle::new(self.host, self.settings);
        let resolver = OutcomeResolver::new(self.host, &lifecycle);
        let payload = TerminalPayload::from_map(&message.payload);
        resolver.resolve(mode, &payload, session).map(Dispatched::Resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckoutConfig, Customer, DirectParams};
    use crate::host::MemoryHost;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const ORIGIN: &str = "https://checkout.cashonrails.com";

    fn opened(host: &MemoryHost, settings: &CheckoutSettings, config: CheckoutConfig) -> Session {
        let session = Session::new(config);
        FrameLifecycle::new(host, settings).open(&session).unwrap();
        session
    }

    fn message(event: &str, data: serde_json::Value) -> InboundMessage {
        InboundMessage::from_envelope(ORIGIN, &json!({ "type": event, "data": data }))
    }

    #[test]
    fn test_initiate_direct_posts_payload() {
        let host = MemoryHost::new();
        let settings = CheckoutSettings::default();
        let session = opened(
            &host,
            &settings,
            CheckoutConfig::direct(
                DirectParams::new("pk_test_1", dec!(1500), "NGN", Customer::new("ada@example.com"))
                    .with_reference("ORDER-1"),
            )
            .with_callback_url("https://shop.example/done"),
        );

        let dispatched = Dispatcher::new(&host, &settings)
            .dispatch(&message("initiateTransaction", json!({})), &session)
            .unwrap();
        assert_eq!(dispatched, Dispatched::Initiated { delivered: true });
        assert_eq!(session.state(), SessionState::Initiated);

        let posted = host.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].target_origin, ORIGIN);
        let data = &posted[0].message["data"];
        assert_eq!(posted[0].message["type"], "initiateTransactionOnCheckout");
        assert_eq!(data["type"], "inline_integration");
        assert_eq!(data["amount"], "1500");
        assert_eq!(data["reference"], "ORDER-1");
        assert_eq!(data["redirect_url"], "https://shop.example/done");
    }

    #[test]
    fn test_initiate_access_code() {
        let host = MemoryHost::new();
        let settings = CheckoutSettings::default();
        let session = opened(&host, &settings, CheckoutConfig::access_code("AC_9"));

        Dispatcher::new(&host, &settings)
            .dispatch(&message("initiateTransaction", json!({})), &session)
            .unwrap();
        assert_eq!(
            host.posted()[0].message["data"],
            json!({ "status": true, "type": "access_code_integration", "access_code": "AC_9" })
        );
    }

    #[test]
    fn test_initiate_with_invalid_config_never_posts() {
        let host = MemoryHost::new();
        let settings = CheckoutSettings::default();
        let session = opened(&host, &settings, CheckoutConfig::access_code("").with_debug(true));

        let err = Dispatcher::new(&host, &settings)
            .dispatch(&message("initiateTransaction", json!({})), &session)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert!(host.posted().is_empty());
        assert_eq!(
            host.overlay().unwrap(),
            ["access_code is required and must be a string"]
        );
        assert_eq!(session.state(), SessionState::Loading);
    }

    #[test]
    fn test_unknown_event_is_protocol_error() {
        let host = MemoryHost::new();
        let settings = CheckoutSettings::default();
        let session = opened(&host, &settings, CheckoutConfig::access_code("AC_9"));

        let err = Dispatcher::new(&host, &settings)
            .dispatch(&message("resizeFrame", json!({})), &session)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Protocol(_)));
        assert_eq!(session.state(), SessionState::Loading);
        assert_eq!(host.frame_count(), 1);
    }

    #[test]
    fn test_close_resolves_and_tears_down() {
        let host = MemoryHost::new();
        let settings = CheckoutSettings::default();
        let session = opened(
            &host,
            &settings,
            CheckoutConfig::access_code("AC_9").with_callback_url("https://shop.example/done"),
        );

        let dispatched = Dispatcher::new(&host, &settings)
            .dispatch(&message("closeTransaction", json!({ "reference": "R1", "status": "success" })), &session)
            .unwrap();
        assert_eq!(
            dispatched,
            Dispatched::Resolved(Delivery::HostRedirect(
                "https://shop.example/done?reference=R1&status=success".into()
            ))
        );
        assert_eq!(host.frame_count(), 0);
        assert!(session.is_terminal());
    }
}
