//! Frame Lifecycle
//!
//! Creates, reveals and tears down the checkout frame of a session.

use crate::error::Result;
use crate::host::{FrameSpec, HostPage};
use crate::session::{Session, SessionState};
use crate::settings::CheckoutSettings;

/// Drives a session's frame through `Loading → Visible → Terminal`
pub struct FrameLifecycle<'a, H: HostPage> {
    host: &'a H,
    settings: &'a CheckoutSettings,
}

impl<'a, H: HostPage> FrameLifecycle<'a, H> {
    pub fn new(host: &'a H, settings: &'a CheckoutSettings) -> Self {
        Self { host, settings }
    }

    /// Show the loader and mount a hidden frame pointed at the checkout.
    ///
    /// On failure the loader is taken down again and the session stays in
    /// `Opening`.
    pub fn open(&self, session: &Session) -> Result<()> {
        self.host.show_loader()?;

        let spec = FrameSpec::checkout(session.id().clone(), self.settings.checkout_url());
        if let Err(e) = self.host.mount_frame(&spec) {
            self.host.remove_loader();
            return Err(e);
        }

        session.advance(SessionState::Loading);
        tracing::info!(
            frame_id = %session.id(),
            integration = %session.config().kind(),
            "Checkout frame mounted"
        );
        Ok(())
    }

    /// The frame finished loading: drop the loader, reveal the frame
    pub fn loaded(&self, session: &Session) {
        self.host.remove_loader();
        if session.is_terminal() {
            return;
        }
        self.host.reveal_frame(session.id());
        session.advance(SessionState::Visible);
    }

    /// Remove the frame and any residual loader. Safe to call repeatedly.
    pub fn close(&self, session: &Session) {
        if self.host.remove_frame(session.id()) {
            tracing::debug!(frame_id = %session.id(), "Checkout frame removed");
        }
        self.host.remove_loader();
        session.advance(SessionState::Terminal);
    }
}
