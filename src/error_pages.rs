//! Full pages shown for requests that cannot be served: unknown routes and server errors.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A full HTML error page with a status code.
pub struct ErrorPage<'a> {
    pub status_code: StatusCode,
    pub description: &'a str,
    pub fix: &'a str,
}

impl ErrorPage<'_> {
    pub fn not_found() -> Self {
        Self {
            status_code: StatusCode::NOT_FOUND,
            description: "Something's missing.",
            fix: "Sorry, we can't find that page. Your loans are on the home page.",
        }
    }

    pub fn internal_server_error() -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for ErrorPage<'_> {
    fn into_response(self) -> Response {
        let title = self
            .status_code
            .canonical_reason()
            .unwrap_or("Error");
        let markup = error_view(title, self.status_code.as_str(), self.description, self.fix);

        (self.status_code, Html(markup.into_string())).into_response()
    }
}

/// Route handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}

/// Route handler for the page clients are sent to after an unexpected error.
pub async fn get_internal_server_error_page() -> Response {
    ErrorPage::internal_server_error().into_response()
}
