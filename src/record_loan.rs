//! The endpoint for recording a loan from a lender.

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
    ledger::{LedgerCommand, LenderKey},
    loan_views::{
        append_loan_card_view, loan_card_view, loan_form_view, loan_list_view, summary_view,
    },
};

/// The fields of the loan form, exactly as the user entered them.
///
/// Missing fields deserialize to empty strings so that they are reported as
/// [Error::MissingField] rather than rejected by the extractor.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanForm {
    #[serde(default)]
    pub lender: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub purpose: String,
}

/// A route handler for recording a loan.
///
/// On success, responds with an empty loan form for the form to swap itself
/// with, plus out-of-band updates for the lender's card and the summary.
/// On failure, responds with an alert and the ledger is left unchanged.
pub async fn record_loan_endpoint(
    State(state): State<LedgerState>,
    Form(form): Form<LoanForm>,
) -> Response {
    let command = LedgerCommand::RecordLoan {
        lender: form.lender.clone(),
        amount: form.amount.clone(),
        purpose: form.purpose.clone(),
    };

    let ledger = match state.commit(&command) {
        Ok(ledger) => ledger,
        Err(error @ (Error::MissingField | Error::InvalidAmount)) => {
            tracing::debug!("Rejected loan {form:?}: {error}");
            return error.into_alert_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while recording a loan: {error}");
            return error.into_alert_response();
        }
    };

    let Some((lender, record)) = LenderKey::new(&form.lender)
        .ok()
        .and_then(|lender| ledger.get(&lender).map(|record| (lender, record)))
    else {
        tracing::error!("Recorded a loan from {:?} but the lender is not in the ledger", form.lender);
        return Error::NotFound.into_alert_response();
    };

    let is_new_lender = record.transactions().len() == 1;
    let card_update = if is_new_lender && ledger.len() == 1 {
        // Replaces the "no loans" placeholder.
        loan_list_view(&ledger, true)
    } else if is_new_lender {
        append_loan_card_view(&lender, record)
    } else {
        loan_card_view(&lender, record, true)
    };

    html! {
        (loan_form_view(&LoanForm::default()))
        (card_update)
        (summary_view(&ledger.summary(), true))
    }
    .into_response()
}
