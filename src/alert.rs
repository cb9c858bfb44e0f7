//! Alert messages shown to the user.
//!
//! Alerts are rendered into the `#alert-container` element of the base page,
//! either as the target of a failed htmx request (`hx-target-error`) or
//! directly when a page is rendered.

use maud::{Markup, html};

/// An alert message and its styling.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (message, details) = match self {
            Alert::Error { message, details } => (message, Some(details)),
            Alert::ErrorSimple { message } => (message, None),
        };

        html! {
            div
                role="alert"
                class="flex items-start justify-between gap-4 p-4 mb-4 text-sm
                    text-red-800 rounded-lg bg-red-50 border border-red-300
                    dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
            {
                div
                {
                    p class="font-medium" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty()) {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    onclick="this.closest('[role=alert]').remove()"
                    class="font-bold"
                {
                    "×"
                }
            }
        }
    }
}
