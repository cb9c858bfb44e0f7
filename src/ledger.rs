//! The loan ledger: lender keys, loan records and the operations that change them.
//!
//! Every operation borrows the current [Ledger] and returns a new one, so a
//! ledger that is being rendered is never modified underneath the renderer.
//! All changes go through [Ledger::apply].

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The largest difference allowed between a stored total and the sum of its
/// transaction amounts when loading a ledger, relative to the total for
/// totals above one.
const TOTAL_TOLERANCE: f64 = 1e-6;

/// A lender name normalized for use as a unique key: trimmed and upper-cased.
///
/// Two names that differ only in case or surrounding whitespace map to the
/// same key, e.g. " Chase " and "CHASE".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LenderKey(String);

impl LenderKey {
    /// Normalize a raw lender name into a key.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::MissingField)
        } else {
            Ok(Self(name.to_uppercase()))
        }
    }

    /// Create a key without normalizing it.
    ///
    /// The caller should ensure that `name` is already trimmed, upper-cased
    /// and not empty. Keys read from storage go through [LenderKey::is_normalized]
    /// before they are accepted.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Whether normalizing this key again would leave it unchanged.
    pub fn is_normalized(&self) -> bool {
        LenderKey::new(&self.0).is_ok_and(|key| key == *self)
    }
}

impl AsRef<str> for LenderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for LenderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single loan disbursement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// How much was loaned.
    pub amount: f64,
    /// What the money was for, as entered by the user.
    pub purpose: String,
}

/// Everything recorded against one lender.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    total: f64,
    repaid: f64,
    transactions: Vec<Transaction>,
}

impl LoanRecord {
    fn new(first_transaction: Transaction) -> Self {
        Self {
            total: first_transaction.amount,
            repaid: 0.0,
            transactions: vec![first_transaction],
        }
    }

    /// Rebuild a record from stored parts, checking the record invariants.
    ///
    /// # Errors
    ///
    /// Returns [Error::MalformedLedger] if there are no transactions, a number
    /// is negative or not finite, a purpose is empty, or `total` does not equal
    /// the sum of the transaction amounts.
    pub fn from_parts(
        total: f64,
        repaid: f64,
        transactions: Vec<Transaction>,
    ) -> Result<Self, Error> {
        if transactions.is_empty() {
            return Err(Error::MalformedLedger(
                "a loan record has no transactions".to_owned(),
            ));
        }

        if !is_valid_amount(total) || !is_valid_amount(repaid) {
            return Err(Error::MalformedLedger(format!(
                "invalid total {total} or repaid amount {repaid}"
            )));
        }

        for transaction in &transactions {
            if !is_valid_amount(transaction.amount) {
                return Err(Error::MalformedLedger(format!(
                    "invalid transaction amount {}",
                    transaction.amount
                )));
            }

            if transaction.purpose.trim().is_empty() {
                return Err(Error::MalformedLedger(
                    "a transaction has an empty purpose".to_owned(),
                ));
            }
        }

        let sum: f64 = transactions.iter().map(|transaction| transaction.amount).sum();
        if (sum - total).abs() > TOTAL_TOLERANCE * total.abs().max(1.0) {
            return Err(Error::MalformedLedger(format!(
                "total {total} does not match the sum of its transactions {sum}"
            )));
        }

        Ok(Self {
            total,
            repaid,
            transactions,
        })
    }

    /// The cumulative amount loaned.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// The cumulative amount repaid. May exceed [LoanRecord::total].
    pub fn repaid(&self) -> f64 {
        self.repaid
    }

    /// The loan transactions in the order they were recorded.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// How much is left to repay, negative if the loan has been over-repaid.
    pub fn remaining(&self) -> f64 {
        self.total - self.repaid
    }

    /// Fails with [Error::InvalidAmount] if the new total would overflow.
    fn add_transaction(&mut self, transaction: Transaction) -> Result<(), Error> {
        let total = checked_sum(self.total, transaction.amount)?;

        self.total = total;
        self.transactions.push(transaction);

        Ok(())
    }

    /// Fails with [Error::InvalidAmount] if the new repaid amount would overflow.
    fn add_repayment(&mut self, amount: f64) -> Result<(), Error> {
        self.repaid = checked_sum(self.repaid, amount)?;

        Ok(())
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

/// Running totals must stay finite, otherwise they cannot be saved.
fn checked_sum(running_total: f64, amount: f64) -> Result<f64, Error> {
    Some(running_total + amount)
        .filter(|sum| sum.is_finite())
        .ok_or(Error::InvalidAmount)
}

/// Totals across every lender in a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LedgerSummary {
    /// The number of lenders with a record.
    pub lender_count: usize,
    /// The sum of every lender's total loaned.
    pub total: f64,
    /// The sum of every lender's repayments.
    pub repaid: f64,
    /// `total - repaid`, negative if lenders have been over-repaid.
    pub remaining: f64,
}

/// A change to the ledger requested by the user.
///
/// The amounts are the raw text the user entered; they are validated when the
/// command is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    /// See [Ledger::record_loan].
    RecordLoan {
        /// The lender name as entered, normalized when applied.
        lender: String,
        /// The amount loaned as entered.
        amount: String,
        /// What the loan is for.
        purpose: String,
    },
    /// See [Ledger::record_repayment].
    RecordRepayment {
        /// The lender being repaid.
        lender: LenderKey,
        /// The amount repaid as entered.
        amount: String,
    },
    /// See [Ledger::delete_loan].
    DeleteLoan {
        /// The lender to remove.
        lender: LenderKey,
    },
}

/// The loan records of every lender, in the order the lenders were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    loans: Vec<(LenderKey, LoanRecord)>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from records read back from storage.
    ///
    /// # Errors
    ///
    /// Returns [Error::MalformedLedger] if a key is not normalized or appears
    /// more than once.
    pub fn from_records(records: Vec<(LenderKey, LoanRecord)>) -> Result<Self, Error> {
        for (index, (key, _)) in records.iter().enumerate() {
            if !key.is_normalized() {
                return Err(Error::MalformedLedger(format!(
                    "the lender key \"{key}\" is not normalized"
                )));
            }

            if records[..index].iter().any(|(other, _)| other == key) {
                return Err(Error::MalformedLedger(format!(
                    "the lender key \"{key}\" appears more than once"
                )));
            }
        }

        Ok(Self { loans: records })
    }

    /// The record for `lender`, if there is one.
    pub fn get(&self, lender: &LenderKey) -> Option<&LoanRecord> {
        self.loans
            .iter()
            .find(|(key, _)| key == lender)
            .map(|(_, record)| record)
    }

    fn get_mut(&mut self, lender: &LenderKey) -> Option<&mut LoanRecord> {
        self.loans
            .iter_mut()
            .find(|(key, _)| key == lender)
            .map(|(_, record)| record)
    }

    /// Iterate over the records in the order the lenders were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&LenderKey, &LoanRecord)> {
        self.loans.iter().map(|(key, record)| (key, record))
    }

    /// The number of lenders.
    pub fn len(&self) -> usize {
        self.loans.len()
    }

    /// Whether there are no lenders.
    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Sum the totals, repayments and remaining amounts of every record.
    pub fn summary(&self) -> LedgerSummary {
        self.loans
            .iter()
            .fold(LedgerSummary::default(), |summary, (_, record)| LedgerSummary {
                lender_count: summary.lender_count + 1,
                total: summary.total + record.total(),
                repaid: summary.repaid + record.repaid(),
                remaining: summary.remaining + record.remaining(),
            })
    }

    /// Apply `command`, returning the updated ledger.
    ///
    /// # Errors
    ///
    /// See [Ledger::record_loan] and [Ledger::record_repayment]. On error
    /// nothing has changed.
    pub fn apply(&self, command: &LedgerCommand) -> Result<Ledger, Error> {
        match command {
            LedgerCommand::RecordLoan {
                lender,
                amount,
                purpose,
            } => self.record_loan(lender, amount, purpose),
            LedgerCommand::RecordRepayment { lender, amount } => {
                self.record_repayment(lender, amount)
            }
            LedgerCommand::DeleteLoan { lender } => Ok(self.delete_loan(lender)),
        }
    }

    /// Record a loan of `amount` from `lender` for `purpose`.
    ///
    /// The lender name is normalized into a [LenderKey]. A new record is
    /// created for an unseen lender, otherwise the amount is added to the
    /// existing record's total and the transaction appended to its history.
    ///
    /// # Errors
    ///
    /// - [Error::MissingField] if any input is empty or only whitespace.
    /// - [Error::InvalidAmount] if `amount` is not an unsigned decimal number
    ///   or the lender's total would become too large to represent.
    pub fn record_loan(&self, lender: &str, amount: &str, purpose: &str) -> Result<Ledger, Error> {
        if [lender, amount, purpose]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(Error::MissingField);
        }

        let amount = parse_amount(amount)?;
        let key = LenderKey::new(lender)?;
        let transaction = Transaction {
            amount,
            purpose: purpose.to_owned(),
        };

        let mut ledger = self.clone();
        match ledger.get_mut(&key) {
            Some(record) => record.add_transaction(transaction)?,
            None => ledger.loans.push((key, LoanRecord::new(transaction))),
        }

        Ok(ledger)
    }

    /// Record a repayment of `amount` against `lender`.
    ///
    /// Only the repaid amount changes. Repaying more than was loaned is
    /// allowed and results in a negative remaining amount.
    ///
    /// # Errors
    ///
    /// - [Error::InvalidAmount] if `amount` is empty, not an unsigned decimal
    ///   number, or the repaid amount would become too large to represent.
    /// - [Error::UnknownLender] if there is no record for `lender`.
    pub fn record_repayment(&self, lender: &LenderKey, amount: &str) -> Result<Ledger, Error> {
        let amount = parse_amount(amount)?;

        let mut ledger = self.clone();
        let record = ledger
            .get_mut(lender)
            .ok_or_else(|| Error::UnknownLender(lender.to_string()))?;
        record.add_repayment(amount)?;

        Ok(ledger)
    }

    /// Remove the record for `lender` along with its history.
    ///
    /// Deleting a lender that is not in the ledger changes nothing.
    pub fn delete_loan(&self, lender: &LenderKey) -> Ledger {
        let mut ledger = self.clone();
        ledger.loans.retain(|(key, _)| key != lender);

        ledger
    }
}

/// Parse an amount entered by the user.
///
/// Only unsigned decimal numbers are accepted: one or more digits, optionally
/// followed by a decimal point and one or more digits. Signs, exponents,
/// thousands separators and surrounding whitespace are rejected. Zero is
/// accepted.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `text` does not match the format or is
/// too large to represent.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    if !is_unsigned_decimal(text) {
        return Err(Error::InvalidAmount);
    }

    text.parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or(Error::InvalidAmount)
}

fn is_unsigned_decimal(text: &str) -> bool {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    match text.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(text),
    }
}





#[cfg(test)]
mod delete_loan_tests {
    use super::{Ledger, LenderKey};

    #[test]
    fn removes_record_and_history() {
        let ledger = Ledger::new()
            .record_loan("chase", "100", "car")
            .unwrap()
            .record_loan("boa", "40", "phone")
            .unwrap();

        let got = ledger.delete_loan(&LenderKey::new_unchecked("CHASE"));

        assert_eq!(got.len(), 1);
        assert!(got.get(&LenderKey::new_unchecked("CHASE")).is_none());
        assert!(got.get(&LenderKey::new_unchecked("BOA")).is_some());
    }

    #[test]
    fn deleting_unknown_lender_is_a_no_op() {
        let ledger = Ledger::new().record_loan("chase", "100", "car").unwrap();

        let got = ledger.delete_loan(&LenderKey::new_unchecked("BOA"));

        assert_eq!(got, ledger);
    }

    #[test]
    fn lender_can_be_added_again_after_deletion() {
        let chase = LenderKey::new_unchecked("CHASE");
        let ledger = Ledger::new()
            .record_loan("chase", "100", "car")
            .unwrap()
            .record_repayment(&chase, "30")
            .unwrap();

        let got = ledger
            .delete_loan(&chase)
            .record_loan("chase", "5", "coffee")
            .unwrap();

        let record = got.get(&chase).unwrap();
        assert_eq!(record.total(), 5.0);
        assert_eq!(record.repaid(), 0.0);
        assert_eq!(record.transactions().len(), 1);
    }
}
