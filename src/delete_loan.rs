//! The endpoint for deleting a lender and all of their loans.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::{HxReswap, HxRetarget, SwapOption};
use maud::html;
use serde::Deserialize;

use crate::{
    app_state::LedgerState,
    ledger::{LedgerCommand, LenderKey},
    loan_views::{LOAN_LIST_ID, loan_list_view, summary_view},
};

/// The query parameters for [delete_loan_endpoint].
#[derive(Debug, Deserialize)]
pub struct DeleteLoanQuery {
    #[serde(default)]
    pub lender: String,
}

/// A route handler for deleting a lender's record.
///
/// The delete button removes its own card, so the response only carries the
/// updated summary. Once the last card is gone, the response is retargeted
/// to the loan list so the "no loans" placeholder is shown.
///
/// Deleting a lender that is not in the ledger is not an error.
pub async fn delete_loan_endpoint(
    State(state): State<LedgerState>,
    Query(query): Query<DeleteLoanQuery>,
) -> Response {
    let ledger = match LenderKey::new(&query.lender) {
        Ok(lender) => state.commit(&LedgerCommand::DeleteLoan { lender }),
        Err(_) => state.snapshot().map(|loaded| loaded.ledger),
    };

    let ledger = match ledger {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting the loans from {:?}: {error}",
                query.lender
            );
            return error.into_alert_response();
        }
    };

    let summary = summary_view(&ledger.summary(), true);

    if ledger.is_empty() {
        (
            HxRetarget(format!("#{LOAN_LIST_ID}")),
            HxReswap(SwapOption::OuterHtml),
            html! {
                (loan_list_view(&ledger, false))
                (summary)
            },
        )
            .into_response()
    } else {
        summary.into_response()
    }
}

#[cfg(test)]
mod delete_loan_endpoint_tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use axum_htmx::{HX_RESWAP, HX_RETARGET};
    use scraper::Selector;

    use crate::{
        app_state::{LedgerState, get_test_ledger_state},
        ledger::{Ledger, LenderKey},
        loan_views::{LOAN_LIST_ID, SUMMARY_ID},
        persistence::load_ledger,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    use super::{DeleteLoanQuery, delete_loan_endpoint};

    fn test_ledger() -> Ledger {
        Ledger::new()
            .record_loan("chase", "100", "Car")
            .unwrap()
            .record_loan("boa", "40", "Phone")
            .unwrap()
    }

    async fn delete(state: &LedgerState, lender: &str) -> Response {
        delete_loan_endpoint(
            State(state.clone()),
            Query(DeleteLoanQuery {
                lender: lender.to_owned(),
            }),
        )
        .await
    }

    #[tokio::test]
    async fn deletes_lender_and_returns_summary() {
        let state = get_test_ledger_state(test_ledger());

        let response = delete(&state, "CHASE").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(HX_RETARGET).is_none());
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(
            html.select(&Selector::parse(&format!("#{SUMMARY_ID}[hx-swap-oob='true']")).unwrap())
                .next()
                .is_some()
        );

        let want = test_ledger().delete_loan(&LenderKey::new_unchecked("CHASE"));
        assert_eq!(state.snapshot().unwrap().ledger, want);
        assert_eq!(
            load_ledger(&state.db_connection.lock().unwrap()).unwrap().ledger,
            want
        );
    }

    #[tokio::test]
    async fn deleting_last_lender_shows_empty_list() {
        let state = get_test_ledger_state(Ledger::new().record_loan("chase", "1", "x").unwrap());

        let response = delete(&state, "CHASE").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(HX_RETARGET).and_then(|value| value.to_str().ok()),
            Some(format!("#{LOAN_LIST_ID}").as_str())
        );
        assert_eq!(
            response.headers().get(HX_RESWAP).and_then(|value| value.to_str().ok()),
            Some("outerHTML")
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let placeholder = html
            .select(&Selector::parse(&format!("#{LOAN_LIST_ID} p[data-empty]")).unwrap())
            .next()
            .expect("Could not find empty list placeholder");
        assert_eq!(
            placeholder.text().collect::<String>().trim(),
            "No loans recorded."
        );
        assert!(state.snapshot().unwrap().ledger.is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_lender_is_a_no_op() {
        let state = get_test_ledger_state(test_ledger());

        for lender in ["WELLS FARGO", "", "   "] {
            let response = delete(&state, lender).await;

            assert_eq!(response.status(), StatusCode::OK, "lender {lender:?}");
        }

        assert_eq!(state.snapshot().unwrap().ledger, test_ledger());
    }
}
