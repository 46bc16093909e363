//! Caller Configuration
//!
//! Configuration arrives either loosely typed (a JSON object handed over by a
//! script on the host page) or fully typed (built in Rust). Both shapes meet in
//! [`ConfigInput`], which is what [`crate::validate::validate`] inspects, so a
//! session is always judged by the same rules no matter how it was built.

use std::rc::Rc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CheckoutError, Result};
use crate::message::Outcome;
use crate::reference::Reference;
use crate::session::FrameId;
use crate::validate::{is_present, validate};

/// Callback invoked with the final outcome
pub type OutcomeHandler = Rc<dyn Fn(&Outcome)>;

/// Which integration a session uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    /// Public key, amount and customer supplied by the host page
    Direct,
    /// Access code obtained beforehand from the payments API
    AccessCode,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationKind::Direct => "direct",
            IntegrationKind::AccessCode => "access_code",
        }
    }
}

impl std::fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A callback slot as supplied by the caller
#[derive(Clone, Default)]
pub enum HandlerSlot {
    #[default]
    Absent,
    Registered(OutcomeHandler),
    /// Something was supplied, but it cannot be called
    NotCallable,
}

impl HandlerSlot {
    pub fn handler(&self) -> Option<&OutcomeHandler> {
        match self {
            HandlerSlot::Registered(handler) => Some(handler),
            _ => None,
        }
    }
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerSlot::Absent => f.write_str("Absent"),
            HandlerSlot::Registered(_) => f.write_str("Registered(..)"),
            HandlerSlot::NotCallable => f.write_str("NotCallable"),
        }
    }
}

/// Loosely-typed configuration, exactly as the caller provided it
#[derive(Clone, Debug)]
pub struct ConfigInput {
    pub kind: IntegrationKind,
    /// Every data field of the caller's object (callbacks excluded)
    pub fields: Value,
    pub on_complete: HandlerSlot,
    pub on_cancel: HandlerSlot,
}

impl ConfigInput {
    pub fn new(kind: IntegrationKind, fields: Value) -> Self {
        Self {
            kind,
            fields,
            on_complete: HandlerSlot::Absent,
            on_cancel: HandlerSlot::Absent,
        }
    }

    pub fn with_on_complete(mut self, slot: HandlerSlot) -> Self {
        self.on_complete = slot;
        self
    }

    pub fn with_on_cancel(mut self, slot: HandlerSlot) -> Self {
        self.on_cancel = slot;
        self
    }

    /// Whether the caller explicitly asked for debug mode
    pub fn debug(&self) -> bool {
        self.fields.get("debug") == Some(&Value::Bool(true))
    }
}

/// Customer details for a direct integration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Customer {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Parameters of a direct integration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectParams {
    pub api_key: String,

    /// Amount in major units, sent to the checkout as a string
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    pub currency: String,

    pub customer: Customer,

    /// Caller-supplied reference; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Accepted and validated but never forwarded to the checkout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl DirectParams {
    pub fn new(
        api_key: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        customer: Customer,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            amount,
            currency: currency.into(),
            customer,
            reference: None,
            custom_fields: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_custom_fields(mut self, fields: Map<String, Value>) -> Self {
        self.custom_fields = Some(Value::Object(fields));
        self
    }
}

/// Parameters of an access-code integration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCodeParams {
    pub access_code: String,
}

/// The integration-specific half of a configuration
#[derive(Clone, Debug, PartialEq)]
pub enum Integration {
    Direct(DirectParams),
    AccessCode(AccessCodeParams),
}

impl Integration {
    pub fn kind(&self) -> IntegrationKind {
        match self {
            Integration::Direct(_) => IntegrationKind::Direct,
            Integration::AccessCode(_) => IntegrationKind::AccessCode,
        }
    }
}

/// Callbacks registered for the session outcome
#[derive(Clone, Debug, Default)]
pub struct Callbacks {
    pub on_complete: HandlerSlot,
    pub on_cancel: HandlerSlot,
}

/// Validated, immutable configuration of one session
#[derive(Clone, Debug)]
pub struct CheckoutConfig {
    pub integration: Integration,

    /// Host URL to redirect to once the checkout concludes
    pub callback_url: Option<String>,

    /// Render the debug overlay on validation failures
    pub debug: bool,

    pub callbacks: Callbacks,

    /// Override the default frame identifier of the integration
    pub frame_id: Option<FrameId>,
}

impl CheckoutConfig {
    /// Direct integration with no callbacks
    pub fn direct(params: DirectParams) -> Self {
        Self::with_integration(Integration::Direct(params))
    }

    /// Access-code integration with no callbacks
    pub fn access_code(access_code: impl Into<String>) -> Self {
        Self::with_integration(Integration::AccessCode(AccessCodeParams {
            access_code: access_code.into(),
        }))
    }

    fn with_integration(integration: Integration) -> Self {
        Self {
            integration,
            callback_url: None,
            debug: false,
            callbacks: Callbacks::default(),
            frame_id: None,
        }
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_frame_id(mut self, frame_id: FrameId) -> Self {
        self.frame_id = Some(frame_id);
        self
    }

    pub fn on_complete(mut self, handler: impl Fn(&Outcome) + 'static) -> Self {
        self.callbacks.on_complete = HandlerSlot::Registered(Rc::new(handler));
        self
    }

    pub fn on_cancel(mut self, handler: impl Fn(&Outcome) + 'static) -> Self {
        self.callbacks.on_cancel = HandlerSlot::Registered(Rc::new(handler));
        self
    }

    pub fn kind(&self) -> IntegrationKind {
        self.integration.kind()
    }

    /// Identifier of the frame element this session owns
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
            .clone()
            .unwrap_or_else(|| FrameId::default_for(self.kind()))
    }

    /// Reference the session will carry: the caller's, or a fresh one for
    /// direct integrations. Access-code references are assigned server-side.
    pub fn session_reference(&self) -> Option<Reference> {
        match &self.integration {
            Integration::Direct(params) => Some(
                params
                    .reference
                    .as_deref()
                    .filter(|r| !r.is_empty())
                    .map_or_else(Reference::generate, Reference::from_string),
            ),
            Integration::AccessCode(_) => None,
        }
    }

    /// Validate, then convert a loosely-typed configuration
    pub fn from_input(input: ConfigInput) -> Result<Self> {
        let errors = validate(&input);
        if !errors.is_empty() {
            return Err(CheckoutError::Validation(errors));
        }

        let debug = input.debug();
        let callback_url = input
            .fields
            .get("callback_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let integration = match input.kind {
            IntegrationKind::Direct => Integration::Direct(parse_fields(normalize_direct(input.fields))?),
            IntegrationKind::AccessCode => Integration::AccessCode(parse_fields(input.fields)?),
        };

        Ok(Self {
            integration,
            callback_url,
            debug,
            callbacks: Callbacks {
                on_complete: input.on_complete,
                on_cancel: input.on_cancel,
            },
            frame_id: None,
        })
    }

    /// The loosely-typed view of this configuration
    pub fn to_input(&self) -> ConfigInput {
        let mut fields = match &self.integration {
            Integration::Direct(params) => serde_json::to_value(params),
            Integration::AccessCode(params) => serde_json::to_value(params),
        }
        .ok()
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();

        if let Some(url) = &self.callback_url {
            fields.insert("callback_url".into(), Value::String(url.clone()));
        }
        if self.debug {
            fields.insert("debug".into(), Value::Bool(true));
        }

        ConfigInput {
            kind: self.kind(),
            fields: Value::Object(fields),
            on_complete: self.callbacks.on_complete.clone(),
            on_cancel: self.callbacks.on_cancel.clone(),
        }
    }

    /// Field-level validation messages; empty when valid
    pub fn validate(&self) -> Vec<String> {
        validate(&self.to_input())
    }
}

/// Bring script-shaped direct fields into their typed form: falsy optionals
/// are dropped and a non-string `api_key` is forwarded in its text form
fn normalize_direct(mut fields: Value) -> Value {
    let Some(map) = fields.as_object_mut() else {
        return fields;
    };

    if let Some(key) = map.get_mut("api_key") {
        if !key.is_string() {
            *key = Value::String(key.to_string());
        }
    }
    for name in ["reference", "custom_fields"] {
        if !is_present(map.get(name)) {
            map.remove(name);
        }
    }
    if let Some(Value::Object(customer)) = map.get_mut("customer") {
        for name in ["first_name", "last_name", "phone"] {
            if !is_present(customer.get(name)) {
                customer.remove(name);
            }
        }
    }

    fields
}

fn parse_fields<T: serde::de::DeserializeOwned>(fields: Value) -> Result<T> {
    serde_json::from_value(fields)
        .map_err(|e| CheckoutError::Validation(vec![format!("config could not be read: {e}")]))
}
