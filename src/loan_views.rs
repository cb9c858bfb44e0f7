//! HTML components for the loans page that are also sent back by the loan endpoints.
//!
//! The endpoints update the page in place with htmx: the component that was
//! the target of the request is swapped normally, and any other component
//! that changed (the summary, the loan list, another card) is sent with
//! `hx-swap-oob` so htmx swaps it by its `id`.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_lender_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_REPAY_STYLE, CARD_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, format_currency,
    },
    ledger::{Ledger, LedgerSummary, LenderKey, LoanRecord},
    record_loan::LoanForm,
};

/// The `id` of the element holding every loan card.
pub const LOAN_LIST_ID: &str = "loan-list";

/// The `id` of the element showing the totals across all lenders.
pub const SUMMARY_ID: &str = "ledger-summary";

/// A stable, HTML-safe element `id` for the card of `lender`.
pub fn card_id(lender: &LenderKey) -> String {
    format!("loan-{:x}", md5::compute(lender.as_ref()))
}

/// The form for recording a loan, pre-filled with `form`.
pub fn loan_form_view(form: &LoanForm) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOANS_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="lender" class=(FORM_LABEL_STYLE) { "Bank Name" }

                input
                    id="lender"
                    type="text"
                    name="lender"
                    placeholder="Bank Name"
                    value=(form.lender)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Loan Amount" }

                div class="input-wrapper"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="any"
                        min="0"
                        placeholder="0.00"
                        value=(form.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="purpose" class=(FORM_LABEL_STYLE) { "Purpose" }

                input
                    id="purpose"
                    type="text"
                    name="purpose"
                    placeholder="Purpose (e.g., Land Purchase)"
                    value=(form.purpose)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Loan" }
        }
    }
}

/// The card for one lender: balances, the loan breakdown and the repay and delete controls.
///
/// Set `swap_oob` when the card is sent alongside another swap target.
pub fn loan_card_view(lender: &LenderKey, record: &LoanRecord, swap_oob: bool) -> Markup {
    let id = card_id(lender);
    let target = format!("#{id}");
    let repayment_input_id = format!("{id}-repayment");
    let delete_url = format_lender_endpoint(endpoints::LOANS_API, lender);

    html! {
        article
            id=(id)
            class=(CARD_STYLE)
            data-loan-card="true"
            hx-swap-oob=[swap_oob.then_some("true")]
        {
            h2 class="text-xl font-bold" { (lender.as_ref()) }

            dl class="mt-2 space-y-1"
            {
                div class="flex justify-between"
                {
                    dt { "Total Loaned" }
                    dd data-field="total" class="font-bold text-blue-600 dark:text-blue-400"
                    { (format_currency(record.total())) }
                }

                div class="flex justify-between"
                {
                    dt { "Repaid" }
                    dd data-field="repaid" class="font-bold text-green-600 dark:text-green-400"
                    { (format_currency(record.repaid())) }
                }

                div class="flex justify-between"
                {
                    dt { "Remaining" }
                    dd data-field="remaining" class="font-bold text-red-600 dark:text-red-400"
                    { (format_currency(record.remaining())) }
                }
            }

            h3 class="mt-4 font-semibold" { "Loan Breakdown" }

            ul class="list-disc pl-5"
            {
                @for transaction in record.transactions() {
                    li data-transaction="true"
                    {
                        (format_currency(transaction.amount)) " - " (transaction.purpose)
                    }
                }
            }

            form
                hx-post=(endpoints::REPAYMENTS_API)
                hx-target=(target)
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class="mt-4 space-y-2"
            {
                input type="hidden" name="lender" value=(lender.as_ref());

                label for=(repayment_input_id) class="sr-only" { "Repayment Amount" }

                div class="input-wrapper"
                {
                    input
                        id=(repayment_input_id)
                        type="number"
                        name="amount"
                        step="any"
                        min="0"
                        placeholder="Repayment Amount"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="flex"
                {
                    button type="submit" class=(BUTTON_REPAY_STYLE) { "Repay" }
                }
            }

            div class="flex mt-2"
            {
                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-target=(target)
                    hx-swap="delete"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

/// Every loan card in ledger order, or a placeholder if there are no loans.
pub fn loan_list_view(ledger: &Ledger, swap_oob: bool) -> Markup {
    html! {
        section
            id=(LOAN_LIST_ID)
            class="w-full space-y-6"
            hx-swap-oob=[swap_oob.then_some("true")]
        {
            @if ledger.is_empty() {
                p class="text-center text-lg text-gray-500 dark:text-gray-400" data-empty="true"
                {
                    "No loans recorded."
                }
            }

            @for (lender, record) in ledger.iter() {
                (loan_card_view(lender, record, false))
            }
        }
    }
}

/// An out-of-band swap that appends the card for a new lender to the loan list.
pub fn append_loan_card_view(lender: &LenderKey, record: &LoanRecord) -> Markup {
    html! {
        div hx-swap-oob=(format!("beforeend:#{LOAN_LIST_ID}"))
        {
            (loan_card_view(lender, record, false))
        }
    }
}

/// The totals across every lender.
pub fn summary_view(summary: &LedgerSummary, swap_oob: bool) -> Markup {
    html! {
        section
            id=(SUMMARY_ID)
            class=(CARD_STYLE)
            hx-swap-oob=[swap_oob.then_some("true")]
        {
            h2 class="text-lg font-semibold" { "Summary" }

            dl class="mt-2 grid grid-cols-2 gap-2"
            {
                dt { "Lenders" }
                dd data-field="lender-count" class="text-right" { (summary.lender_count) }

                dt { "Total Loaned" }
                dd data-field="total" class="text-right" { (format_currency(summary.total)) }

                dt { "Total Repaid" }
                dd data-field="repaid" class="text-right" { (format_currency(summary.repaid)) }

                dt { "Total Remaining" }
                dd data-field="remaining" class="text-right font-bold"
                { (format_currency(summary.remaining)) }
            }
        }
    }
}

#[cfg(test)]
mod card_id_tests {
    use crate::ledger::LenderKey;

    use super::card_id;

    #[test]
    fn is_stable_and_html_safe() {
        let lender = LenderKey::new_unchecked("BANK OF \"AMERICA\" <&>");

        let id = card_id(&lender);

        assert_eq!(id, card_id(&lender));
        assert!(id.starts_with("loan-"));
        assert!(
            id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
            "{id:?} has characters that are not safe in a CSS selector"
        );
    }

    #[test]
    fn differs_between_lenders() {
        assert_ne!(
            card_id(&LenderKey::new_unchecked("CHASE")),
            card_id(&LenderKey::new_unchecked("BOA"))
        );
    }
}

#[cfg(test)]
mod loan_form_view_tests {
    use scraper::Html;

    use crate::{
        endpoints,
        record_loan::LoanForm,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, must_get_form,
        },
    };

    use super::loan_form_view;

    #[test]
    fn renders_empty_form() {
        let html = Html::parse_fragment(&loan_form_view(&LoanForm::default()).into_string());

        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::LOANS_API, "hx-post");
        assert_hx_endpoint(&form, "#alert-container", "hx-target-error");
        assert_form_input(&form, "lender", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "purpose", "text");
        assert_form_submit_button(&form);
    }

    #[test]
    fn keeps_entered_values() {
        let entered = LoanForm {
            lender: "Chase".to_owned(),
            amount: "12.50".to_owned(),
            purpose: "Car".to_owned(),
        };

        let html = Html::parse_fragment(&loan_form_view(&entered).into_string());

        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "lender", "text", "Chase");
        assert_form_input_with_value(&form, "amount", "number", "12.50");
        assert_form_input_with_value(&form, "purpose", "text", "Car");
    }
}
