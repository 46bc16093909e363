//! Session Management
//!
//! One session per embedded checkout, from frame creation to outcome.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::config::{CheckoutConfig, IntegrationKind};
use crate::reference::Reference;

/// Frame id used by direct integrations
pub const DIRECT_FRAME_ID: &str = "corIframeContainer";

/// Frame id used by access-code integrations
pub const ACCESS_CODE_FRAME_ID: &str = "cor-iframe-access-code-container";

/// Identifier of the frame element a session owns
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(String);

impl FrameId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Default anchor of an integration
    pub fn default_for(kind: IntegrationKind) -> Self {
        match kind {
            IntegrationKind::Direct => Self(DIRECT_FRAME_ID.into()),
            IntegrationKind::AccessCode => Self(ACCESS_CODE_FRAME_ID.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a session. Ordered: a session only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Opening,
    Loading,
    Visible,
    Initiated,
    Terminal,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Opening => write!(f, "opening"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::Visible => write!(f, "visible"),
            SessionState::Initiated => write!(f, "initiated"),
            SessionState::Terminal => write!(f, "terminal"),
        }
    }
}

/// A live embedding of the hosted checkout
#[derive(Debug)]
pub struct Session {
    id: FrameId,
    config: CheckoutConfig,
    reference: Option<Reference>,
    state: Cell<SessionState>,
}

impl Session {
    /// Create a session in the `Opening` state
    pub fn new(config: CheckoutConfig) -> Self {
        Self {
            id: config.frame_id(),
            reference: config.session_reference(),
            config,
            state: Cell::new(SessionState::Opening),
        }
    }

    pub fn id(&self) -> &FrameId {
        &self.id
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Stable for the whole session; `None` for access-code sessions
    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_terminal(&self) -> bool {
        self.state() == SessionState::Terminal
    }

    /// Move forward to `next`. Returns false (and changes nothing) when the
    /// session is already at or past it.
    pub fn advance(&self, next: SessionState) -> bool {
        if next <= self.state.get() {
            return false;
        }
        tracing::debug!(frame_id = %self.id, from = %self.state.get(), to = %next, "Session state");
        self.state.set(next);
        true
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            frame_id: self.id.clone(),
            kind: self.config.kind(),
            reference: self.reference.clone(),
        }
    }
}

/// What the caller keeps after opening a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    pub frame_id: FrameId,
    pub kind: IntegrationKind,
    pub reference: Option<Reference>,
}
