//! In-Memory Host Page
//!
//! For testing and native tooling. Records every effect instead of touching
//! a document.

use std::cell::RefCell;

use serde_json::Value;

use super::{FrameSpec, HostPage};
use crate::error::{CheckoutError, Result};
use crate::session::FrameId;

/// Stand-in for a browsing context handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// A mounted frame
#[derive(Clone, Debug)]
pub struct MemoryFrame {
    pub spec: FrameSpec,
    pub window: Option<WindowId>,
    pub visible: bool,
}

/// A message posted into a frame
#[derive(Clone, Debug, PartialEq)]
pub struct PostedMessage {
    pub window: WindowId,
    pub message: Value,
    pub target_origin: String,
}

#[derive(Debug, Default)]
struct Page {
    frames: Vec<MemoryFrame>,
    loaders: usize,
    overlay: Option<Vec<String>>,
    posted: Vec<PostedMessage>,
    navigations: Vec<String>,
    next_window: u64,
    refuse_mounts: bool,
}

/// Host page that keeps its document in memory
#[derive(Debug, Default)]
pub struct MemoryHost {
    page: RefCell<Page>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `mount_frame` fail
    pub fn refuse_mounts(&self) {
        self.page.borrow_mut().refuse_mounts = true;
    }

    pub fn frame(&self, id: &FrameId) -> Option<MemoryFrame> {
        self.page.borrow().frames.iter().find(|f| &f.spec.id == id).cloned()
    }

    pub fn frame_count(&self) -> usize {
        self.page.borrow().frames.len()
    }

    /// Window of a frame, for forging message sources in tests
    pub fn window_of(&self, id: &FrameId) -> Option<WindowId> {
        self.frame(id).and_then(|f| f.window)
    }

    /// A window no frame will ever own
    pub fn foreign_window(&self) -> WindowId {
        let mut page = self.page.borrow_mut();
        page.next_window += 1;
        WindowId(page.next_window)
    }

    /// Simulate a frame that lost its browsing context
    pub fn detach_window(&self, id: &FrameId) {
        if let Some(frame) = self.page.borrow_mut().frames.iter_mut().find(|f| &f.spec.id == id) {
            frame.window = None;
        }
    }

    pub fn loader_visible(&self) -> bool {
        self.page.borrow().loaders > 0
    }

    pub fn overlay(&self) -> Option<Vec<String>> {
        self.page.borrow().overlay.clone()
    }

    pub fn posted(&self) -> Vec<PostedMessage> {
        self.page.borrow().posted.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.page.borrow().navigations.clone()
    }
}

impl HostPage for MemoryHost {
    type Window = WindowId;

    fn show_loader(&self) -> Result<()> {
        self.page.borrow_mut().loaders += 1;
        Ok(())
    }

    fn remove_loader(&self) {
        let mut page = self.page.borrow_mut();
        page.loaders = page.loaders.saturating_sub(1);
    }

    fn mount_frame(&self, frame: &FrameSpec) -> Result<()> {
        let mut page = self.page.borrow_mut();
        if page.refuse_mounts {
            return Err(CheckoutError::Host("document body unavailable".into()));
        }
        page.next_window += 1;
        let window = WindowId(page.next_window);
        page.frames.push(MemoryFrame {
            spec: frame.clone(),
            window: Some(window),
            visible: false,
        });
        Ok(())
    }

    fn reveal_frame(&self, id: &FrameId) {
        if let Some(frame) = self.page.borrow_mut().frames.iter_mut().find(|f| &f.spec.id == id) {
            frame.visible = true;
        }
    }

    fn remove_frame(&self, id: &FrameId) -> bool {
        let mut page = self.page.borrow_mut();
        let before = page.frames.len();
        page.frames.retain(|f| &f.spec.id != id);
        page.frames.len() != before
    }

    fn has_frame(&self, id: &FrameId) -> bool {
        self.page.borrow().frames.iter().any(|f| &f.spec.id == id)
    }

    fn frame_window(&self, id: &FrameId) -> Option<WindowId> {
        self.window_of(id)
    }

    fn post_message(&self, window: &WindowId, message: &Value, target_origin: &str) -> Result<()> {
        self.page.borrow_mut().posted.push(PostedMessage {
            window: *window,
            message: message.clone(),
            target_origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn navigate(&self, url: &str) -> Result<()> {
        self.page.borrow_mut().navigations.push(url.to_string());
        Ok(())
    }

    fn show_debug_overlay(&self, errors: &[String]) -> Result<()> {
        self.page.borrow_mut().overlay = Some(errors.to_vec());
        Ok(())
    }
}
