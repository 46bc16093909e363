//! UI Components

use leptos::prelude::*;

use checkout_core::host::DEBUG_OVERLAY_ID;

const SPINNER_SVG: &str = r##"<svg version="1.1" width="80" height="80" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path fill="#fff" d="M73,50c0-12.7-10.3-23-23-23S27,37.3,27,50 M30.9,50c0-10.5,8.5-19.1,19.1-19.1S69.1,39.5,69.1,50"><animateTransform attributeName="transform" attributeType="XML" type="rotate" dur="0.7s" from="0 50 50" to="360 50 50" repeatCount="indefinite"></animateTransform></path></svg>"##;

/// Rotating arc shown while the checkout frame loads
#[component]
pub fn Spinner() -> impl IntoView {
    view! { <div inner_html=SPINNER_SVG></div> }
}

/// Split a validation message into its field name and the rest
pub fn split_field(error: &str) -> (&str, &str) {
    error.split_once(' ').unwrap_or((error, ""))
}

/// Configuration problems, shown only in debug mode
#[component]
pub fn DebugOverlay(errors: Vec<String>) -> impl IntoView {
    let close = move |_| {
        if let Some(overlay) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(DEBUG_OVERLAY_ID))
        {
            overlay.remove();
        }
    };

    let items = errors
        .into_iter()
        .map(|error| {
            let (field, rest) = split_field(&error);
            let (field, rest) = (field.to_string(), rest.to_string());
            view! {
                <li>
                    <span style="border:1px solid #dedee4;padding:0.25rem 0.35rem;border-radius:6px;background-color:#ffffff;font-weight:400;">
                        {field}
                    </span>
                    " "
                    {rest}
                </li>
            }
        })
        .collect_view();

    view! {
        <div style="border:1.5px solid #cf7488;background:#FFF1F2;padding:16px;border-radius:8px;min-width:380px;max-width:380px;">
            <h3 style="font-size:1rem;font-weight:500">"Kindly review the following configuration issues"</h3>
            <ul style="display:flex;flex-direction:column;row-gap:0.75rem;margin-top:1rem;font-size:12px;list-style:disc;margin-left:1.15rem;">
                {items}
            </ul>
            <div style="display:flex;justify-content:center;">
                <button
                    style="font-size:13px;border:none;outline:none;background:#E11D48;color:#ffffff;padding:0.6rem 1.5rem;border-radius:6px;margin-top:1.5rem;cursor:pointer;"
                    on:click=close
                >
                    "Close"
                </button>
            </div>
            <p style="color:#4d4d4d;text-align:center;font-size:10px;margin-top:1rem;">
                "Debug mode is active. Remember to set debug to "
                <strong>"false"</strong>
                " or remove it in the production environment."
            </p>
            <p style="color:#4d4d4d;text-align:center;font-size:10px;">
                "Powered by "
                <a href="https://cashonrails.com" target="_blank" style="text-decoration:underline;font-weight:600">"Cashonrails"</a>
            </p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_field() {
        assert_eq!(
            split_field("customer.email is required and must be a string"),
            ("customer.email", "is required and must be a string")
        );
        assert_eq!(split_field("oops"), ("oops", ""));
    }
}
