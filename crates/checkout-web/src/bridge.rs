//! Page-Wide Bridge
//!
//! One `Checkout` registry and one `message` listener per page, created on
//! first use. The listener routes every message through the registry.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::MessageEvent;

use checkout_core::{Checkout, CheckoutSettings, FrameId, InboundEvent, Result};

use crate::dom::{DomHost, js_error};

thread_local! {
    static BRIDGE: RefCell<Option<Rc<Checkout<DomHost>>>> = const { RefCell::new(None) };
}

/// The page's checkout registry, installing the listener on first call
pub fn checkout() -> Result<Rc<Checkout<DomHost>>> {
    if let Some(existing) = BRIDGE.with(|b| b.borrow().clone()) {
        return Ok(existing);
    }

    let host = DomHost::new()?;
    let listener = Closure::<dyn FnMut(MessageEvent)>::new(on_message);
    host.window()
        .add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
        .map_err(js_error)?;
    listener.forget();

    let checkout = Rc::new(Checkout::new(host, CheckoutSettings::default()));
    BRIDGE.with(|b| *b.borrow_mut() = Some(checkout.clone()));
    tracing::debug!("Checkout message listener installed");
    Ok(checkout)
}

/// Load handler of a checkout frame
pub fn frame_loaded(frame_id: &FrameId) {
    if let Some(checkout) = current() {
        checkout.frame_loaded(frame_id);
    }
}

fn current() -> Option<Rc<Checkout<DomHost>>> {
    BRIDGE.with(|b| b.borrow().clone())
}

fn on_message(event: MessageEvent) {
    let Some(checkout) = current() else {
        return;
    };

    let origin = event.origin();
    let inbound = InboundEvent {
        origin: (!origin.is_empty()).then_some(origin),
        source: event.source().map(JsValue::from),
        data: to_json(&event.data()),
    };
    checkout.handle_message(inbound);
}

/// Structured-clone data as JSON; `None` for absent or non-serializable data
pub fn to_json(data: &JsValue) -> Option<Value> {
    if data.is_undefined() || data.is_null() {
        return None;
    }
    let text = js_sys::JSON::stringify(data).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}
