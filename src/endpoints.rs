//! The API endpoints URIs.
//!
//! For endpoints that take the lender as a query parameter, use [format_lender_endpoint].

use crate::ledger::LenderKey;

/// The page listing every loan.
pub const ROOT: &str = "/";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route for recording a loan (POST) and deleting a lender's loans (DELETE).
pub const LOANS_API: &str = "/api/loans";
/// The route for recording a repayment.
pub const REPAYMENTS_API: &str = "/api/repayments";

/// Append `lender` to `endpoint_path` as the `lender` query parameter.
///
/// Lender keys may contain spaces and other characters that are not valid in
/// a URI, so the key is URL encoded.
pub fn format_lender_endpoint(endpoint_path: &str, lender: &LenderKey) -> String {
    match serde_urlencoded::to_string([("lender", lender.as_ref())]) {
        Ok(query) => format!("{endpoint_path}?{query}"),
        Err(error) => {
            tracing::error!("Could not encode lender {lender}: {error}");
            endpoint_path.to_owned()
        }
    }
}
