//! # checkout-core
//!
//! Host-side protocol for embedding the hosted checkout in an isolated frame.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Checkout                              │
//! │  message ──▶ OriginGate ──▶ Dispatcher ──┬──▶ sender (initiate)  │
//! │                   │                      └──▶ OutcomeResolver    │
//! │             session registry                    │                │
//! │                   │                        FrameLifecycle        │
//! │  ┌────────────────┴──────────────────────────────┴─────────────┐ │
//! │  │                  HostPage (Strategy)                         │ │
//! │  └──────────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `HostPage` trait keeps the protocol independent of the DOM: the
//! browser binding lives in `checkout-web`, and [`host::MemoryHost`] runs the
//! same flows natively.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::{Checkout, CheckoutConfig, CheckoutSettings, Customer, DirectParams};
//!
//! let checkout = Checkout::new(host, CheckoutSettings::default());
//! let handle = checkout.open(
//!     CheckoutConfig::direct(DirectParams::new("pk_live_xxx", dec!(5000), "NGN", Customer::new("ada@example.com")))
//!         .on_complete(|outcome| println!("{} {}", outcome.reference, outcome.status)),
//! )?;
//!
//! // From the page's message listener:
//! checkout.handle_message(event);
//! ```

pub mod channel;
pub mod checkout;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod message;
pub mod outcome;
pub mod reference;
pub mod sender;
pub mod session;
pub mod settings;
pub mod validate;

pub use checkout::Checkout;
pub use config::{
    CheckoutConfig, ConfigInput, Customer, DirectParams, HandlerSlot, IntegrationKind, OutcomeHandler,
};
pub use error::{CheckoutError, Result};
pub use host::HostPage;
pub use message::{InboundEvent, Outcome, OutcomeStatus};
pub use reference::Reference;
pub use session::{FrameId, SessionHandle, SessionState};
pub use settings::CheckoutSettings;
pub use validate::validate;
