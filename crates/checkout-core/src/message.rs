//! Protocol Messages
//!
//! Wire shapes exchanged with the checkout frame.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Customer, DirectParams};
use crate::validate::is_present;

/// Event type declared by the checkout frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventType {
    /// Frame is ready to receive the transaction details
    InitiateTransaction,
    /// Checkout finished (success or failure)
    CloseTransaction,
    /// Customer cancelled the checkout
    CancelTransaction,
    /// Anything outside the protocol
    Unknown(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::InitiateTransaction => "initiateTransaction",
            EventType::CloseTransaction => "closeTransaction",
            EventType::CancelTransaction => "cancelTransaction",
            EventType::Unknown(other) => other,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "initiateTransaction" => EventType::InitiateTransaction,
            "closeTransaction" => EventType::CloseTransaction,
            "cancelTransaction" => EventType::CancelTransaction,
            other => EventType::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw cross-window message as delivered by the transport
///
/// `origin` and `source` are filled in by the browser, never by the peer.
#[derive(Clone, Debug)]
pub struct InboundEvent<W> {
    pub origin: Option<String>,
    pub source: Option<W>,
    pub data: Option<Value>,
}

impl<W> InboundEvent<W> {
    pub fn new(origin: impl Into<String>, source: W, data: Value) -> Self {
        Self {
            origin: Some(origin.into()),
            source: Some(source),
            data: Some(data),
        }
    }
}

/// A message that passed the origin gate
#[derive(Clone, Debug, PartialEq)]
pub struct InboundMessage {
    pub origin: String,
    pub event: EventType,
    pub payload: Map<String, Value>,
}

impl InboundMessage {
    /// Normalize an envelope: a missing type becomes `""`, a missing or
    /// non-object `data` becomes `{}`
    pub fn from_envelope(origin: impl Into<String>, envelope: &Value) -> Self {
        let event = envelope
            .get("type")
            .and_then(Value::as_str)
            .map_or(EventType::Unknown(String::new()), EventType::parse);

        let payload = match envelope.get("data") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        Self {
            origin: origin.into(),
            event,
            payload,
        }
    }
}

/// Body of a close/cancel message
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerminalPayload {
    pub reference: String,
    pub status: String,
    /// Redirect chosen by the checkout; `null`, `"null"` and `""` mean none
    pub callback_url: Option<String>,
}

impl TerminalPayload {
    pub fn from_map(payload: &Map<String, Value>) -> Self {
        let callback_url = payload
            .get("callback_url")
            .filter(|v| is_present(Some(*v)))
            .and_then(Value::as_str)
            .filter(|url| *url != "null")
            .map(str::to_string);

        Self {
            reference: text_field(payload, "reference"),
            status: text_field(payload, "status"),
            callback_url,
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            reference: self.reference.clone(),
            status: OutcomeStatus::parse(&self.status),
        }
    }
}

fn text_field(payload: &Map<String, Value>, key: &str) -> String {
    match payload.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Outcome status reported by the checkout
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutcomeStatus {
    Success,
    Failed,
    Cancelled,
    /// Any other status, kept verbatim
    Other(String),
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::Cancelled => "cancelled",
            OutcomeStatus::Other(other) => other,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "success" => OutcomeStatus::Success,
            "failed" => OutcomeStatus::Failed,
            "cancelled" => OutcomeStatus::Cancelled,
            other => OutcomeStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for OutcomeStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<OutcomeStatus> for String {
    fn from(status: OutcomeStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host learns when a session ends
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub reference: String,
    pub status: OutcomeStatus,
}

/// Customer block of the direct initiation payload; absent fields are `""`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&Customer> for CustomerPayload {
    fn from(customer: &Customer) -> Self {
        Self {
            first_name: customer.first_name.clone().unwrap_or_default(),
            last_name: customer.last_name.clone().unwrap_or_default(),
            email: customer.email.clone(),
            phone: customer.phone.clone().unwrap_or_default(),
        }
    }
}

/// Transaction details pushed into the frame
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitiationPayload {
    InlineIntegration {
        status: bool,
        api_key: String,
        amount: String,
        currency: String,
        customer: CustomerPayload,
        reference: String,
        redirect_url: String,
    },
    AccessCodeIntegration {
        status: bool,
        access_code: String,
    },
}

impl InitiationPayload {
    pub fn inline(params: &DirectParams, reference: &str, redirect_url: Option<&str>) -> Self {
        InitiationPayload::InlineIntegration {
            status: true,
            api_key: params.api_key.clone(),
            amount: params.amount.normalize().to_string(),
            currency: params.currency.clone(),
            customer: CustomerPayload::from(&params.customer),
            reference: reference.to_string(),
            redirect_url: redirect_url.unwrap_or_default().to_string(),
        }
    }

    pub fn access_code(access_code: &str) -> Self {
        InitiationPayload::AccessCodeIntegration {
            status: true,
            access_code: access_code.to_string(),
        }
    }
}

/// Host → frame envelope
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutboundMessage {
    #[serde(rename = "initiateTransactionOnCheckout")]
    InitiateTransaction(InitiationPayload),
}

impl OutboundMessage {
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
