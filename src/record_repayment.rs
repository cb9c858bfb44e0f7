//! The endpoint for recording a repayment against an existing lender.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::html;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::LedgerState,
    ledger::{LedgerCommand, LenderKey, parse_amount},
    loan_views::{loan_card_view, summary_view},
};

/// The fields of a lender's repayment form.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentForm {
    #[serde(default)]
    pub lender: String,
    #[serde(default)]
    pub amount: String,
}

/// A route handler for recording a repayment.
///
/// An invalid amount is rejected before the lender is looked up, so a bad
/// amount is reported as such even when the lender is blank or unknown.
///
/// On success, responds with the lender's card, which resets that card's
/// repayment input and leaves other cards alone, plus an out-of-band update
/// for the summary.
pub async fn record_repayment_endpoint(
    State(state): State<LedgerState>,
    Form(form): Form<RepaymentForm>,
) -> Response {
    let lender = match LenderKey::new(&form.lender) {
        Ok(lender) => lender,
        // A blank lender can never match a record, but the amount is checked first.
        Err(_) => {
            let error = match parse_amount(&form.amount) {
                Ok(_) => Error::UnknownLender(form.lender.clone()),
                Err(error) => error,
            };
            tracing::debug!("Rejected repayment {form:?}: {error}");
            return error.into_alert_response();
        }
    };

    let command = LedgerCommand::RecordRepayment {
        lender: lender.clone(),
        amount: form.amount.clone(),
    };

    let ledger = match state.commit(&command) {
        Ok(ledger) => ledger,
        Err(error @ (Error::InvalidAmount | Error::UnknownLender(_))) => {
            tracing::debug!("Rejected repayment {form:?}: {error}");
            return error.into_alert_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while recording a repayment: {error}");
            return error.into_alert_response();
        }
    };

    match ledger.get(&lender) {
        Some(record) => html! {
            (loan_card_view(&lender, record, false))
            (summary_view(&ledger.summary(), true))
        }
        .into_response(),
        None => Error::UnknownLender(lender.to_string()).into_alert_response(),
    }
}
