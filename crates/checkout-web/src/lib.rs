//! checkout-web
//!
//! WASM binding of the embedded checkout. Exposes the two page-level entry
//! points and wires the browser into `checkout-core`.

mod bridge;
mod components;
mod dom;

use std::rc::Rc;

use js_sys::{Function, Reflect};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use checkout_core::{ConfigInput, HandlerSlot, IntegrationKind, Outcome};

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    init_tracing();
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(tracing_web::MakeWebConsoleWriter::new());

    // A second module instance on the page already owns the global subscriber
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Open a direct checkout from a page-supplied configuration object
#[wasm_bindgen(js_name = CashonrailsCheckout)]
pub fn cashonrails_checkout(config: JsValue) {
    open(IntegrationKind::Direct, &config);
}

/// Open a checkout for a server-issued access code
#[wasm_bindgen(js_name = CashonRailsCheckoutWithAccessCode)]
pub fn cashonrails_checkout_with_access_code(config: JsValue) {
    open(IntegrationKind::AccessCode, &config);
}

/// Problems are logged, never thrown back into the page
fn open(kind: IntegrationKind, config: &JsValue) {
    let input = config_input(kind, config);
    let result = bridge::checkout().and_then(|checkout| checkout.open_input(input));
    match result {
        Ok(handle) => tracing::debug!(frame_id = %handle.frame_id, %kind, "Checkout opened"),
        Err(e) => tracing::error!(%kind, error = %e, "{}", e.user_message()),
    }
}

fn config_input(kind: IntegrationKind, config: &JsValue) -> ConfigInput {
    let fields = if config.is_object() {
        bridge::to_json(config).unwrap_or_else(|| Value::Object(Default::default()))
    } else {
        Value::Null
    };

    ConfigInput::new(kind, fields)
        .with_on_complete(handler_slot(config, "onComplete"))
        .with_on_cancel(handler_slot(config, "onCancel"))
}

fn handler_slot(config: &JsValue, name: &str) -> HandlerSlot {
    if !config.is_object() {
        return HandlerSlot::Absent;
    }
    let value = Reflect::get(config, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED);
    if !value.is_truthy() {
        return HandlerSlot::Absent;
    }
    match value.dyn_into::<Function>() {
        Ok(function) => HandlerSlot::Registered(Rc::new(move |outcome: &Outcome| call(&function, outcome))),
        Err(_) => HandlerSlot::NotCallable,
    }
}

fn call(function: &Function, outcome: &Outcome) {
    let argument = serde_json::to_string(outcome)
        .ok()
        .and_then(|text| js_sys::JSON::parse(&text).ok())
        .unwrap_or(JsValue::UNDEFINED);
    if let Err(e) = function.call1(&JsValue::NULL, &argument) {
        tracing::error!(error = %dom::js_error(e), "Outcome handler threw");
    }
}
