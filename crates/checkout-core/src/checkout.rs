//! Checkout Registry
//!
//! One [`Checkout`] per host page. It owns the session registry (frame id →
//! session) and is the single entry point for the page's message listener,
//! which routes by lookup instead of broadcasting.
//!
//! Handlers run to completion one at a time on the page's event loop. No
//! registry borrow is held while host code (navigation, callbacks) runs, so a
//! callback may open a new session.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::channel::{OriginGate, Rejection};
use crate::config::{CheckoutConfig, ConfigInput};
use crate::dispatcher::{Dispatched, Dispatcher};
use crate::error::{CheckoutError, Result};
use crate::host::HostPage;
use crate::lifecycle::FrameLifecycle;
use crate::message::InboundEvent;
use crate::session::{FrameId, Session, SessionHandle, SessionState};
use crate::settings::CheckoutSettings;

/// Session registry and message router for one host page
pub struct Checkout<H: HostPage> {
    host: H,
    settings: CheckoutSettings,
    gate: OriginGate,
    sessions: RefCell<HashMap<FrameId, Rc<Session>>>,
}

impl<H: HostPage> Checkout<H> {
    pub fn new(host: H, settings: CheckoutSettings) -> Self {
        Self {
            gate: OriginGate::new(&settings),
            host,
            settings,
            sessions: RefCell::new(HashMap::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Validate a loosely-typed configuration, then open a session.
    ///
    /// With `debug: true` validation problems are also shown in the debug
    /// overlay.
    pub fn open_input(&self, input: ConfigInput) -> Result<SessionHandle> {
        let debug = input.debug();
        match CheckoutConfig::from_input(input) {
            Ok(config) => self.open(config),
            Err(e) => {
                self.report_invalid(&e, debug);
                Err(e)
            }
        }
    }

    /// Open a session: validate, claim the frame id, show the loader and
    /// mount the hidden frame
    pub fn open(&self, config: CheckoutConfig) -> Result<SessionHandle> {
        let errors = config.validate();
        if !errors.is_empty() {
            let err = CheckoutError::Validation(errors);
            self.report_invalid(&err, config.debug);
            return Err(err);
        }

        let frame_id = config.frame_id();
        let claimed = self
            .sessions
            .borrow()
            .get(&frame_id)
            .is_some_and(|s| !s.is_terminal());
        if claimed || self.host.has_frame(&frame_id) {
            tracing::error!(frame_id = %frame_id, "Checkout already open on this frame");
            return Err(CheckoutError::DuplicateSession(frame_id.to_string()));
        }

        let session = Rc::new(Session::new(config));
        FrameLifecycle::new(&self.host, &self.settings).open(&session)?;

        let handle = session.handle();
        self.sessions.borrow_mut().insert(frame_id, session);
        Ok(handle)
    }

    /// Native load event of a frame
    pub fn frame_loaded(&self, frame_id: &FrameId) {
        let lifecycle = FrameLifecycle::new(&self.host, &self.settings);
        match self.session(frame_id) {
            Some(session) => lifecycle.loaded(&session),
            None => self.host.remove_loader(),
        }
    }

    /// Entry point of the page's message listener. Never fails: every
    /// rejection is logged and dropped.
    pub fn handle_message(&self, event: InboundEvent<H::Window>) {
        let live: Vec<Rc<Session>> = self
            .sessions
            .borrow()
            .values()
            .filter(|s| !s.is_terminal())
            .cloned()
            .collect();

        let framed: Vec<(Rc<Session>, Option<H::Window>)> = live
            .into_iter()
            .filter(|s| self.host.has_frame(s.id()))
            .map(|s| {
                let window = self.host.frame_window(s.id());
                (s, window)
            })
            .collect();
        if framed.is_empty() {
            tracing::trace!("No checkout frame on the page, message ignored");
            return;
        }

        let routed = framed
            .iter()
            .find(|(_, window)| window.is_some() && window.as_ref() == event.source.as_ref());
        let (session, window) = match routed {
            Some((session, window)) => (Some(session.clone()), window.as_ref()),
            None => (None, None),
        };

        let message = match self.gate.screen(&event, window) {
            Ok(message) => message,
            Err(rejection) => {
                self.report_rejection(rejection);
                return;
            }
        };
        let Some(session) = session else {
            return;
        };

        let dispatcher = Dispatcher::new(&self.host, &self.settings);
        match dispatcher.dispatch(&message, &session) {
            Ok(Dispatched::Resolved(delivery)) => {
                tracing::debug!(frame_id = %session.id(), ?delivery, "Checkout session concluded");
            }
            Ok(Dispatched::Initiated { .. }) => {}
            Err(e @ CheckoutError::Validation(_)) => {
                tracing::error!(frame_id = %session.id(), "{}", e);
            }
            Err(e) if e.is_silent() => {
                tracing::debug!(frame_id = %session.id(), error = %e, "Checkout message ignored");
            }
            Err(e) => {
                tracing::error!(frame_id = %session.id(), error = %e, "Checkout message failed");
            }
        }

        if session.is_terminal() {
            self.release(&session);
        }
    }

    /// Tear a session down without delivering any outcome
    pub fn abandon(&self, frame_id: &FrameId) {
        let Some(session) = self.session(frame_id) else {
            return;
        };
        tracing::info!(frame_id = %frame_id, "Checkout session abandoned");
        FrameLifecycle::new(&self.host, &self.settings).close(&session);
        self.release(&session);
    }

    /// Current state of the session on a frame, if one is registered
    pub fn state(&self, frame_id: &FrameId) -> Option<SessionState> {
        self.session(frame_id).map(|s| s.state())
    }

    /// Number of sessions that have not concluded
    pub fn active_sessions(&self) -> usize {
        self.sessions.borrow().values().filter(|s| !s.is_terminal()).count()
    }

    fn session(&self, frame_id: &FrameId) -> Option<Rc<Session>> {
        self.sessions.borrow().get(frame_id).cloned()
    }

    /// Drop the registry entry, unless a callback already replaced it
    fn release(&self, session: &Rc<Session>) {
        let mut sessions = self.sessions.borrow_mut();
        if sessions.get(session.id()).is_some_and(|s| Rc::ptr_eq(s, session)) {
            sessions.remove(session.id());
        }
    }

    fn report_invalid(&self, err: &CheckoutError, debug: bool) {
        tracing::error!("{}", err);
        if let (true, Some(errors)) = (debug, err.validation_errors()) {
            if let Err(e) = self.host.show_debug_overlay(errors) {
                tracing::warn!(error = %e, "Could not render debug overlay");
            }
        }
    }

    fn report_rejection(&self, rejection: Rejection) {
        match rejection.into_error() {
            Some(err) => tracing::error!(error = %err, "Checkout message rejected"),
            None => tracing::trace!("Message not addressed to a checkout frame, ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Customer, DirectParams, IntegrationKind};
    use crate::host::{MemoryHost, WindowId};
    use crate::session::{ACCESS_CODE_FRAME_ID, DIRECT_FRAME_ID};
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    const ORIGIN: &str = "https://checkout.cashonrails.com";

    type Calls = Rc<RefCell<Vec<crate::message::Outcome>>>;

    fn checkout() -> Checkout<MemoryHost> {
        Checkout::new(MemoryHost::new(), CheckoutSettings::default())
    }

    fn direct_config() -> CheckoutConfig {
        CheckoutConfig::direct(DirectParams::new(
            "pk_test_123",
            dec!(5000),
            "NGN",
            Customer::new("ada@example.com"),
        ))
    }

    fn recorder() -> (Calls, impl Fn(&crate::message::Outcome) + 'static) {
        let calls: Calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        (calls, move |o: &crate::message::Outcome| sink.borrow_mut().push(o.clone()))
    }

    fn from_frame(checkout: &Checkout<MemoryHost>, frame: &str, data: Value) -> InboundEvent<WindowId> {
        let window = checkout.host().window_of(&FrameId::from_string(frame)).unwrap();
        InboundEvent::new(ORIGIN, window, data)
    }

    #[test]
    fn test_missing_email_never_creates_frame() {
        let checkout = checkout();
        let input = ConfigInput::new(
            IntegrationKind::Direct,
            json!({ "api_key": "pk", "amount": 10, "currency": "NGN", "customer": {}, "debug": true }),
        );

        let err = checkout.open_input(input).unwrap_err();
        assert!(err.validation_errors().unwrap().iter().any(|e| e.contains("customer.email")));
        assert_eq!(checkout.host().frame_count(), 0);
        assert!(!checkout.host().loader_visible());
        assert!(checkout.host().overlay().is_some());
    }

    #[test]
    fn test_invalid_without_debug_has_no_overlay() {
        let checkout = checkout();
        let config = CheckoutConfig::direct(DirectParams::new("pk", dec!(10), "NGN", Customer::new("")));
        assert!(checkout.open(config).is_err());
        assert!(checkout.host().overlay().is_none());
    }

    #[test]
    fn test_full_flow_with_callback() {
        let checkout = checkout();
        let (completed, on_complete) = recorder();
        let handle = checkout.open(direct_config().on_complete(on_complete)).unwrap();
        let frame_id = handle.frame_id.clone();
        assert_eq!(checkout.state(&frame_id), Some(SessionState::Loading));
        assert!(checkout.host().loader_visible());

        checkout.frame_loaded(&frame_id);
        assert_eq!(checkout.state(&frame_id), Some(SessionState::Visible));
        assert!(!checkout.host().loader_visible());

        checkout.handle_message(from_frame(&checkout, DIRECT_FRAME_ID, json!({ "type": "initiateTransaction" })));
        assert_eq!(checkout.state(&frame_id), Some(SessionState::Initiated));

        let reference = handle.reference.unwrap();
        let sent = &checkout.host().posted()[0].message["data"];
        assert_eq!(sent["reference"], reference.as_str());

        checkout.handle_message(from_frame(
            &checkout,
            DIRECT_FRAME_ID,
            json!({ "type": "closeTransaction", "data": { "reference": reference.as_str(), "status": "success" } }),
        ));

        assert_eq!(completed.borrow().len(), 1);
        assert_eq!(completed.borrow()[0].reference, reference.as_str());
        assert_eq!(checkout.state(&frame_id), None);
        assert_eq!(checkout.host().frame_count(), 0);
        assert_eq!(checkout.active_sessions(), 0);
    }

    #[test]
    fn test_second_terminal_message_is_noop() {
        let checkout = checkout();
        let (cancelled, on_cancel) = recorder();
        checkout.open(direct_config().on_cancel(on_cancel)).unwrap();
        let window = checkout.host().window_of(&FrameId::from_string(DIRECT_FRAME_ID)).unwrap();
        let cancel = json!({ "type": "cancelTransaction", "data": { "reference": "R2", "status": "cancelled" } });

        checkout.handle_message(InboundEvent::new(ORIGIN, window, cancel.clone()));
        checkout.handle_message(InboundEvent::new(ORIGIN, window, cancel.clone()));
        checkout.handle_message(InboundEvent::new(
            ORIGIN,
            window,
            json!({ "type": "closeTransaction", "data": { "reference": "R2", "status": "success" } }),
        ));

        assert_eq!(
            *cancelled.borrow(),
            [crate::message::Outcome {
                reference: "R2".into(),
                status: crate::message::OutcomeStatus::Cancelled,
            }]
        );
        assert!(checkout.host().navigations().is_empty());
    }

    #[test]
    fn test_host_callback_url_beats_on_complete() {
        let checkout = checkout();
        let (completed, on_complete) = recorder();
        checkout
            .open(
                direct_config()
                    .with_callback_url("https://shop.example/payment/callback")
                    .on_complete(on_complete),
            )
            .unwrap();

        checkout.handle_message(from_frame(
            &checkout,
            DIRECT_FRAME_ID,
            json!({ "type": "closeTransaction", "data": { "reference": "R1", "status": "success" } }),
        ));
        checkout.handle_message(InboundEvent::new(
            ORIGIN,
            WindowId(1),
            json!({ "type": "closeTransaction", "data": { "reference": "R1", "status": "success" } }),
        ));

        assert_eq!(
            checkout.host().navigations(),
            ["https://shop.example/payment/callback?reference=R1&status=success"]
        );
        assert!(completed.borrow().is_empty());
    }

    #[test]
    fn test_untrusted_origin_changes_nothing() {
        let checkout = checkout();
        let (completed, on_complete) = recorder();
        let handle = checkout.open(direct_config().on_complete(on_complete)).unwrap();
        checkout.frame_loaded(&handle.frame_id);
        let window = checkout.host().window_of(&handle.frame_id).unwrap();

        for data in [
            json!({ "type": "initiateTransaction" }),
            json!({ "type": "closeTransaction", "data": { "reference": "R", "status": "success" } }),
            json!({ "type": "cancelTransaction" }),
        ] {
            checkout.handle_message(InboundEvent::new("https://evil.example", window, data));
        }

        assert_eq!(checkout.state(&handle.frame_id), Some(SessionState::Visible));
        assert!(checkout.host().posted().is_empty());
        assert!(checkout.host().navigations().is_empty());
        assert!(completed.borrow().is_empty());
        assert_eq!(checkout.host().frame_count(), 1);
    }

    #[test]
    fn test_foreign_window_is_ignored() {
        let checkout = checkout();
        let handle = checkout.open(direct_config()).unwrap();
        let stranger = checkout.host().foreign_window();

        checkout.handle_message(InboundEvent::new(ORIGIN, stranger, json!({ "type": "initiateTransaction" })));
        assert!(checkout.host().posted().is_empty());
        assert_eq!(checkout.state(&handle.frame_id), Some(SessionState::Loading));
    }

    #[test]
    fn test_routes_only_to_matching_session() {
        let checkout = checkout();
        let (direct_calls, on_direct) = recorder();
        let (code_calls, on_code) = recorder();
        checkout.open(direct_config().on_complete(on_direct)).unwrap();
        checkout.open(CheckoutConfig::access_code("AC_1").on_complete(on_code)).unwrap();
        assert_eq!(checkout.active_sessions(), 2);

        checkout.handle_message(from_frame(
            &checkout,
            ACCESS_CODE_FRAME_ID,
            json!({ "type": "closeTransaction", "data": { "reference": "AC-REF", "status": "success" } }),
        ));

        assert_eq!(code_calls.borrow().len(), 1);
        assert!(direct_calls.borrow().is_empty());
        assert_eq!(checkout.active_sessions(), 1);
        assert!(checkout.host().has_frame(&FrameId::from_string(DIRECT_FRAME_ID)));
    }

    #[test]
    fn test_duplicate_frame_id_is_rejected() {
        let checkout = checkout();
        checkout.open(direct_config()).unwrap();
        let err = checkout.open(direct_config()).unwrap_err();
        assert!(matches!(err, CheckoutError::DuplicateSession(id) if id == DIRECT_FRAME_ID));
        assert_eq!(checkout.host().frame_count(), 1);

        let other = checkout
            .open(direct_config().with_frame_id(FrameId::from_string("second-checkout")))
            .unwrap();
        assert_eq!(other.frame_id.as_str(), "second-checkout");
    }

    #[test]
    fn test_callback_may_reopen_same_frame() {
        let checkout = Rc::new(checkout());
        let reopened = Rc::new(RefCell::new(None));
        let (weak, slot) = (Rc::downgrade(&checkout), reopened.clone());

        checkout
            .open(direct_config().on_cancel(move |_| {
                if let Some(checkout) = weak.upgrade() {
                    *slot.borrow_mut() = Some(checkout.open(direct_config()).is_ok());
                }
            }))
            .unwrap();

        checkout.handle_message(from_frame(&checkout, DIRECT_FRAME_ID, json!({ "type": "cancelTransaction" })));

        assert_eq!(*reopened.borrow(), Some(true));
        assert_eq!(checkout.active_sessions(), 1);
        assert_eq!(
            checkout.state(&FrameId::from_string(DIRECT_FRAME_ID)),
            Some(SessionState::Loading)
        );
    }

    #[test]
    fn test_generated_reference_round_trips_verbatim() {
        let checkout = checkout();
        let (completed, on_complete) = recorder();
        let handle = checkout.open(direct_config().on_complete(on_complete)).unwrap();
        checkout.handle_message(from_frame(&checkout, DIRECT_FRAME_ID, json!({ "type": "initiateTransaction" })));

        let echoed = checkout.host().posted()[0].message["data"]["reference"].clone();
        checkout.handle_message(from_frame(
            &checkout,
            DIRECT_FRAME_ID,
            json!({ "type": "closeTransaction", "data": { "reference": echoed, "status": "success" } }),
        ));

        let reference = handle.reference.unwrap();
        assert_eq!(completed.borrow()[0].reference, reference.as_str());
    }

    #[test]
    fn test_unknown_type_keeps_session_open() {
        let checkout = checkout();
        let handle = checkout.open(direct_config()).unwrap();
        checkout.handle_message(from_frame(&checkout, DIRECT_FRAME_ID, json!({ "type": "heartbeat" })));
        checkout.handle_message(from_frame(&checkout, DIRECT_FRAME_ID, json!({ "type": "initiateTransaction" })));
        assert_eq!(checkout.state(&handle.frame_id), Some(SessionState::Initiated));
    }

    #[test]
    fn test_abandon_and_late_load() {
        let checkout = checkout();
        let handle = checkout.open(direct_config()).unwrap();
        checkout.abandon(&handle.frame_id);
        checkout.abandon(&handle.frame_id);

        assert_eq!(checkout.host().frame_count(), 0);
        assert!(!checkout.host().loader_visible());
        assert_eq!(checkout.active_sessions(), 0);

        checkout.frame_loaded(&handle.frame_id);
        assert!(!checkout.host().loader_visible());
    }

    #[test]
    fn test_messages_without_sessions_are_ignored() {
        let checkout = checkout();
        checkout.handle_message(InboundEvent::new(ORIGIN, WindowId(1), json!({ "type": "closeTransaction" })));
        assert!(checkout.host().navigations().is_empty());
    }

    #[test]
    fn test_unparseable_host_url_releases_session() {
        let checkout = checkout();
        let (completed, on_complete) = recorder();
        let handle = checkout
            .open(direct_config().with_callback_url("/relative").on_complete(on_complete))
            .unwrap();

        checkout.handle_message(from_frame(
            &checkout,
            DIRECT_FRAME_ID,
            json!({ "type": "closeTransaction", "data": { "reference": "R5", "status": "success" } }),
        ));

        assert_eq!(checkout.host().frame_count(), 0);
        assert!(completed.borrow().is_empty());
        assert!(checkout.host().navigations().is_empty());
        assert_eq!(checkout.state(&handle.frame_id), None);
        assert_eq!(checkout.active_sessions(), 0);
    }

    #[test]
    fn test_script_shaped_config_opens_frame() {
        let checkout = checkout();
        let input = ConfigInput::new(
            IntegrationKind::Direct,
            json!({
                "api_key": 12345,
                "amount": 10,
                "currency": "NGN",
                "reference": 0,
                "customer": { "email": "ada@example.com", "phone": 0, "last_name": false }
            }),
        );

        let handle = checkout.open_input(input).unwrap();
        assert!(checkout.host().has_frame(&handle.frame_id));

        checkout.handle_message(from_frame(&checkout, DIRECT_FRAME_ID, json!({ "type": "initiateTransaction" })));
        let sent = &checkout.host().posted()[0].message["data"];
        assert_eq!(sent["api_key"], "12345");
        assert_eq!(sent["customer"]["phone"], "");
        assert_eq!(sent["customer"]["last_name"], "");
        assert!(sent["reference"].as_str().unwrap().starts_with("COR_"));
    }
}
