//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    delete_loan::delete_loan_endpoint,
    endpoints,
    error_pages::{get_404_not_found, get_internal_server_error_page},
    loans_page::get_loans_page,
    record_loan::record_loan_endpoint,
    record_repayment::record_repayment_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_loans_page))
        .route(
            endpoints::LOANS_API,
            post(record_loan_endpoint).delete(delete_loan_endpoint),
        )
        .route(endpoints::REPAYMENTS_API, post(record_repayment_endpoint))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}
