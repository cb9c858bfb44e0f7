//! A web app for keeping track of money borrowed from banks and other lenders.
//!
//! Each lender has a record of the total loaned, the total repaid and the
//! individual loans that make up the total. The ledger is kept in memory and
//! saved to a SQLite database after every change.
//!
//! This library provides the HTTP server, which directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod delete_loan;
mod endpoints;
mod error;
mod error_pages;
mod html;
mod ledger;
mod loan_views;
mod loans_page;
mod logging;
mod persistence;
mod record_loan;
mod record_repayment;
mod routing;
mod store;
#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use error::Error;
pub use ledger::{Ledger, LedgerCommand, LedgerSummary, LenderKey, LoanRecord, Transaction};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use persistence::{LoadedLedger, load_ledger, save_ledger};
pub use routing::build_router;
pub use store::initialize as initialize_db;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`. If a signal handler cannot be
/// installed, the error is logged and the server is left running.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
