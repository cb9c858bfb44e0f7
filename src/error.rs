//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, error_pages::ErrorPage};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more of the required fields was empty or only whitespace.
    #[error("all fields are required")]
    MissingField,

    /// An amount was not an unsigned decimal number such as "120" or "99.95".
    #[error("amount must be a valid number")]
    InvalidAmount,

    /// A repayment was made against a lender that is not in the ledger.
    ///
    /// The UI only offers repayments for lenders in the ledger, so this
    /// usually means the page is out of date.
    #[error("there is no loan from \"{0}\"")]
    UnknownLender(String),

    /// The stored ledger snapshot could not be parsed or failed validation.
    #[error("the stored ledger is malformed: {0}")]
    MalformedLedger(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the ledger lock
    #[error("could not acquire the ledger lock")]
    LedgerLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => ErrorPage::not_found().into_response(),
            Error::DatabaseLockError | Error::LedgerLockError => {
                ErrorPage::internal_server_error().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::internal_server_error().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::MissingField => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing fields".to_owned(),
                    details: "All fields are required!".to_owned(),
                },
            ),
            Error::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: "Amount must be a valid number, e.g. 120 or 99.95.".to_owned(),
                },
            ),
            Error::UnknownLender(lender) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not record repayment".to_owned(),
                    details: format!(
                        "There is no loan from {lender}. \
                        Try refreshing the page to see if the loan has been deleted."
                    ),
                },
            ),
            Error::DatabaseLockError | Error::LedgerLockError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::ErrorSimple {
                    message: "Could not access your loans, please try again.".to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
