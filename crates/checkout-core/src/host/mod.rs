//! Host Page Integration
//!
//! Everything the protocol does to the embedding document goes through
//! [`HostPage`]. The browser implementation lives in `checkout-web`;
//! [`MemoryHost`] records effects for tests and native tooling.

mod memory;

pub use memory::{MemoryFrame, MemoryHost, PostedMessage, WindowId};

use serde_json::Value;

use crate::error::Result;
use crate::session::FrameId;

/// Id of the full-viewport loading indicator
pub const LOADER_ID: &str = "cor-svg-loader-container";

/// Id of the debug overlay
pub const DEBUG_OVERLAY_ID: &str = "corDebugContainer";

/// Inline style of a freshly mounted frame: full viewport, on top of
/// everything, invisible and click-through until it has loaded
pub const HIDDEN_FRAME_STYLE: &str = "position:fixed;top:0;left:0;z-index:99999999999999;border:none;opacity:0;pointer-events:none;width:100%;height:100%;";

/// Everything needed to create the frame element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSpec {
    pub id: FrameId,
    pub src: String,
    pub style: &'static str,
    pub attributes: Vec<(&'static str, &'static str)>,
}

impl FrameSpec {
    pub fn checkout(id: FrameId, src: impl Into<String>) -> Self {
        Self {
            id,
            src: src.into(),
            style: HIDDEN_FRAME_STYLE,
            attributes: vec![
                ("allowTransparency", "true"),
                ("width", "100%"),
                ("height", "100%"),
                ("allow", "clipboard-read; clipboard-write"),
            ],
        }
    }
}

/// Host page abstraction (Strategy pattern)
///
/// Removal methods must be no-ops on missing elements.
pub trait HostPage {
    /// Handle of a browsing context, compared against message sources
    type Window: PartialEq;

    /// Cover the viewport with the loading indicator
    fn show_loader(&self) -> Result<()>;

    /// Remove the loading indicator if present
    fn remove_loader(&self);

    /// Create and attach a hidden frame
    fn mount_frame(&self, frame: &FrameSpec) -> Result<()>;

    /// Make the frame visible and interactive
    fn reveal_frame(&self, id: &FrameId);

    /// Detach the frame; returns whether it was present
    fn remove_frame(&self, id: &FrameId) -> bool;

    /// Whether a frame with this id is attached
    fn has_frame(&self, id: &FrameId) -> bool;

    /// Content window of the frame, if it still has one
    fn frame_window(&self, id: &FrameId) -> Option<Self::Window>;

    /// Post a message to a window, restricted to `target_origin`
    fn post_message(&self, window: &Self::Window, message: &Value, target_origin: &str) -> Result<()>;

    /// Navigate the host document
    fn navigate(&self, url: &str) -> Result<()>;

    /// Show configuration problems to the integrating developer
    fn show_debug_overlay(&self, errors: &[String]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_spec_starts_hidden() {
        let spec = FrameSpec::checkout(FrameId::from_string("f"), "https://checkout.cashonrails.com");
        assert!(spec.style.contains("opacity:0"));
        assert!(spec.style.contains("pointer-events:none"));
        assert!(spec.attributes.contains(&("allow", "clipboard-read; clipboard-write")));
    }
}
