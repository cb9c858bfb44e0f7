//! The page that lists every loan and hosts the loan form.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    alert::Alert,
    app_state::LedgerState,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    loan_views::{loan_form_view, loan_list_view, summary_view},
    persistence::LoadedLedger,
    record_loan::LoanForm,
};

/// Renders the loans page.
pub async fn get_loans_page(State(state): State<LedgerState>) -> Result<Response, Error> {
    let loaded = state.snapshot()?;

    Ok(base("Loans", &[dollar_input_styles()], &loans_view(&loaded)).into_response())
}

fn loans_view(loaded: &LoadedLedger) -> Markup {
    let problem_alert = loaded.problem.as_ref().map(|problem| {
        Alert::Error {
            message: "Your saved loans could not be read".to_owned(),
            details: format!(
                "Starting with an empty ledger. The saved data will be overwritten \
                the next time you record or delete a loan. ({problem})"
            ),
        }
        .into_html()
    });

    html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold text-center" { "Loan Tracker" }

            @if let Some(problem_alert) = problem_alert {
                div class="w-full" data-load-problem="true" { (problem_alert) }
            }

            (summary_view(&loaded.ledger.summary(), false))

            section class=(CARD_STYLE)
            {
                h2 class="mb-4 text-xl font-semibold" { "Add a Loan" }
                (loan_form_view(&LoanForm::default()))
            }

            (loan_list_view(&loaded.ledger, false))
        }
    }
}

#[cfg(test)]
mod loans_page_tests {
    use axum::{extract::State, http::StatusCode};
    use scraper::{Html, Selector};

    use crate::{
        app_state::get_test_ledger_state,
        endpoints,
        ledger::Ledger,
        test_utils::{
            assert_content_type, assert_form_input, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_loans_page;

    fn count(html: &Html, selector: &str) -> usize {
        html.select(&Selector::parse(selector).unwrap()).count()
    }

    #[tokio::test]
    async fn renders_empty_page() {
        let state = get_test_ledger_state(Ledger::new());

        let response = get_loans_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let title = html
            .select(&Selector::parse("h1").unwrap())
            .next()
            .expect("Could not find heading")
            .text()
            .collect::<String>();
        assert_eq!(title, "Loan Tracker");
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::LOANS_API, "hx-post");
        assert_form_input(&form, "lender", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "purpose", "text");
        assert_eq!(count(&html, "#loan-list p[data-empty]"), 1);
        assert_eq!(count(&html, "#alert-container"), 1);
        assert_eq!(count(&html, "[data-load-problem]"), 0);
    }

    #[tokio::test]
    async fn renders_card_per_lender() {
        let ledger = Ledger::new()
            .record_loan("chase", "100", "Car")
            .unwrap()
            .record_loan("boa", "40", "Phone")
            .unwrap()
            .record_loan("chase", "20", "Fuel")
            .unwrap();
        let state = get_test_ledger_state(ledger);

        let response = get_loans_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(count(&html, "#loan-list article"), 2);
        assert_eq!(count(&html, "#loan-list li[data-transaction]"), 3);
        assert_eq!(count(&html, "#loan-list p[data-empty]"), 0);
    }

    #[tokio::test]
    async fn shows_load_problem() {
        let state = get_test_ledger_state(Ledger::new());
        state.ledger.lock().unwrap().problem = Some("expected value at line 1".to_owned());

        let response = get_loans_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(count(&html, "[data-load-problem] div[role='alert']"), 1);
    }
}
