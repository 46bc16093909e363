//! Browser Host Page
//!
//! `HostPage` on top of the live document.

use leptos::prelude::*;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlIFrameElement, Window};

use checkout_core::host::{DEBUG_OVERLAY_ID, FrameSpec, HostPage, LOADER_ID};
use checkout_core::{CheckoutError, FrameId, Result};

use crate::bridge;
use crate::components::{DebugOverlay, Spinner};

const LOADER_STYLE: &str = "position:fixed;top:0;left:0;z-index:99999999999999;border:none;pointer-events:none;width:100%;height:100%;background:rgba(0,0,0,0.65);display:flex;justify-content:center;align-items:center;";

const DEBUG_OVERLAY_STYLE: &str = "position:fixed;top:0;left:0;z-index:99999999999999;border:none;width:100%;height:100%;background:rgba(0,0,0,0.65);display:flex;justify-content:center;align-items:center;padding:6px 3px;";

/// The embedding document
pub struct DomHost {
    window: Window,
    document: Document,
}

impl DomHost {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| CheckoutError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| CheckoutError::Host("no document".into()))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn body(&self) -> Result<HtmlElement> {
        self.document
            .body()
            .ok_or_else(|| CheckoutError::Host("document has no body".into()))
    }

    fn iframe(&self, id: &FrameId) -> Option<HtmlIFrameElement> {
        self.document
            .get_element_by_id(id.as_str())
            .and_then(|el| el.dyn_into::<HtmlIFrameElement>().ok())
    }

    /// Full-viewport container with a fixed id and style
    fn overlay_container(&self, id: &str, style: &str) -> Result<HtmlElement> {
        let container = self
            .document
            .create_element("div")
            .map_err(js_error)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| CheckoutError::Host("div is not an HtmlElement".into()))?;
        container.set_id(id);
        container.set_attribute("style", style).map_err(js_error)?;
        Ok(container)
    }
}

impl HostPage for DomHost {
    type Window = JsValue;

    fn show_loader(&self) -> Result<()> {
        let loader = self.overlay_container(LOADER_ID, LOADER_STYLE)?;
        self.body()?.append_child(&loader).map_err(js_error)?;
        leptos::mount::mount_to(loader, Spinner).forget();
        Ok(())
    }

    fn remove_loader(&self) {
        if let Some(loader) = self.document.get_element_by_id(LOADER_ID) {
            loader.remove();
        }
    }

    fn mount_frame(&self, frame: &FrameSpec) -> Result<()> {
        let iframe = self
            .document
            .create_element("iframe")
            .map_err(js_error)?
            .dyn_into::<HtmlIFrameElement>()
            .map_err(|_| CheckoutError::Host("iframe is not an HtmlIFrameElement".into()))?;

        iframe.set_attribute("src", &frame.src).map_err(js_error)?;
        iframe.set_id(frame.id.as_str());
        iframe.set_attribute("style", frame.style).map_err(js_error)?;
        for (name, value) in &frame.attributes {
            iframe.set_attribute(name, value).map_err(js_error)?;
        }

        let frame_id = frame.id.clone();
        let onload = Closure::<dyn FnMut()>::new(move || bridge::frame_loaded(&frame_id));
        iframe.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        self.body()?.append_child(&iframe).map_err(js_error)?;
        Ok(())
    }

    fn reveal_frame(&self, id: &FrameId) {
        if let Some(iframe) = self.iframe(id) {
            let style = HtmlElement::style(&iframe);
            let revealed = style
                .set_property("opacity", "1")
                .and_then(|()| style.set_property("pointer-events", "auto"));
            if let Err(e) = revealed {
                tracing::warn!(frame_id = %id, error = %js_error(e), "Could not reveal checkout frame");
            }
        }
    }

    fn remove_frame(&self, id: &FrameId) -> bool {
        match self.iframe(id) {
            Some(iframe) => {
                iframe.remove();
                true
            }
            None => false,
        }
    }

    fn has_frame(&self, id: &FrameId) -> bool {
        self.iframe(id).is_some()
    }

    fn frame_window(&self, id: &FrameId) -> Option<JsValue> {
        self.iframe(id)?.content_window().map(JsValue::from)
    }

    fn post_message(&self, window: &JsValue, message: &Value, target_origin: &str) -> Result<()> {
        let message = js_sys::JSON::parse(&serde_json::to_string(message)?).map_err(js_error)?;
        // Cross-origin content windows fail `instanceof Window`
        window
            .unchecked_ref::<Window>()
            .post_message(&message, target_origin)
            .map_err(js_error)
    }

    fn navigate(&self, url: &str) -> Result<()> {
        self.window.location().set_href(url).map_err(js_error)
    }

    fn show_debug_overlay(&self, errors: &[String]) -> Result<()> {
        if let Some(previous) = self.document.get_element_by_id(DEBUG_OVERLAY_ID) {
            previous.remove();
        }
        let overlay = self.overlay_container(DEBUG_OVERLAY_ID, DEBUG_OVERLAY_STYLE)?;
        self.body()?.prepend_with_node_1(&overlay).map_err(js_error)?;

        let errors = errors.to_vec();
        leptos::mount::mount_to(overlay, move || view! { <DebugOverlay errors=errors /> }).forget();
        Ok(())
    }
}

/// Describe a thrown JS value
pub fn js_error(value: JsValue) -> CheckoutError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    CheckoutError::Host(message)
}
