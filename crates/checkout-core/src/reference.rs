//! Transaction References
//!
//! A reference is a session-scoped display token. Generated references are
//! not unpredictable and must never be used as credentials.

use chrono::{DateTime, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix of generated references
pub const REFERENCE_PREFIX: &str = "COR_";

/// Transaction reference, echoed back verbatim by the checkout
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    /// Generate a reference from the thread RNG and the current time
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng(), Utc::now())
    }

    /// `COR_` + random integer in `1..=1_000_000_000` + milliseconds + seconds
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let token: u32 = rng.gen_range(1..=1_000_000_000);
        let millis = now.timestamp_subsec_millis() % 1000;
        let seconds = now.second();
        Self(format!("{REFERENCE_PREFIX}{token}{millis}{seconds}"))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
