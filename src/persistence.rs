//! Saves and restores the ledger as a versioned JSON snapshot in the key-value store.
//!
//! The whole ledger is written under [LEDGER_KEY] after every change:
//!
//! ```json
//! {
//!   "version": 1,
//!   "loans": {
//!     "CHASE": {
//!       "total": 150.0,
//!       "repaid": 20.0,
//!       "transactions": [{ "amount": 100.0, "purpose": "Car" }]
//!     }
//!   }
//! }
//! ```
//!
//! Snapshots written before the schema was versioned hold just the `loans`
//! object. They are still accepted and are rewritten in the versioned layout
//! on the next save.

use std::fmt;

use rusqlite::Connection;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{IgnoredAny, MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{
    Error,
    ledger::{Ledger, LenderKey, LoanRecord, Transaction},
    store::{get_value, set_value},
};

/// The key the ledger snapshot is stored under.
pub const LEDGER_KEY: &str = "loans";

/// The snapshot layout written by this version of the application.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LedgerSnapshot {
    version: u32,
    loans: LoanEntries,
}

/// Just enough of a stored snapshot to tell the two layouts apart.
///
/// Lender keys are upper-case, so a lower-case `version` key only appears in
/// the versioned layout.
#[derive(Debug, Deserialize)]
struct SnapshotHeader {
    version: Option<IgnoredAny>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LoanRecordSnapshot {
    total: f64,
    repaid: f64,
    transactions: Vec<Transaction>,
}

/// Loan records keyed by lender, kept in the order they appear in the JSON object.
#[derive(Debug, Default)]
struct LoanEntries(Vec<(String, LoanRecordSnapshot)>);

impl Serialize for LoanEntries {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (lender, record) in &self.0 {
            map.serialize_entry(lender, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LoanEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LoanEntriesVisitor;

        impl<'de> Visitor<'de> for LoanEntriesVisitor {
            type Value = LoanEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of lender names to loan records")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some(entry) = access.next_entry::<String, LoanRecordSnapshot>()? {
                    entries.push(entry);
                }

                Ok(LoanEntries(entries))
            }
        }

        deserializer.deserialize_map(LoanEntriesVisitor)
    }
}

impl From<&Ledger> for LoanEntries {
    fn from(ledger: &Ledger) -> Self {
        LoanEntries(
            ledger
                .iter()
                .map(|(lender, record)| {
                    (
                        lender.to_string(),
                        LoanRecordSnapshot {
                            total: record.total(),
                            repaid: record.repaid(),
                            transactions: record.transactions().to_vec(),
                        },
                    )
                })
                .collect(),
        )
    }
}

impl TryFrom<LoanEntries> for Ledger {
    type Error = Error;

    fn try_from(entries: LoanEntries) -> Result<Self, Self::Error> {
        let records = entries
            .0
            .into_iter()
            .map(|(lender, record)| {
                LoanRecord::from_parts(record.total, record.repaid, record.transactions)
                    .map(|record| (LenderKey::new_unchecked(&lender), record))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ledger::from_records(records)
    }
}

/// The ledger restored at start up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedLedger {
    /// The stored ledger, or an empty ledger if the snapshot was discarded.
    pub ledger: Ledger,
    /// Why the stored snapshot could not be used, if it was discarded.
    ///
    /// The stored snapshot is left untouched until the next save replaces it.
    pub problem: Option<String>,
}

/// Serialize `ledger` as a versioned JSON snapshot.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if serialization fails.
pub fn serialize_ledger(ledger: &Ledger) -> Result<String, Error> {
    let snapshot = LedgerSnapshot {
        version: SCHEMA_VERSION,
        loans: LoanEntries::from(ledger),
    };

    serde_json::to_string(&snapshot).map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// Parse a stored snapshot, versioned or not, and check every ledger invariant.
///
/// # Errors
/// Returns [Error::MalformedLedger] if `text` is not valid JSON, has an
/// unexpected shape or version, or describes an invalid ledger.
pub fn parse_ledger(text: &str) -> Result<Ledger, Error> {
    let header: SnapshotHeader = serde_json::from_str(text).map_err(malformed)?;

    let entries = if header.version.is_some() {
        let snapshot: LedgerSnapshot = serde_json::from_str(text).map_err(malformed)?;

        if snapshot.version != SCHEMA_VERSION {
            return Err(Error::MalformedLedger(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        snapshot.loans
    } else {
        let entries: LoanEntries = serde_json::from_str(text).map_err(malformed)?;
        tracing::info!("Read an unversioned ledger snapshot, it will be upgraded on next save");

        entries
    };

    Ledger::try_from(entries)
}

fn malformed(error: serde_json::Error) -> Error {
    Error::MalformedLedger(error.to_string())
}

/// Write the whole ledger to the store, replacing the previous snapshot.
///
/// # Errors
/// Returns an error if the ledger cannot be serialized or written.
pub fn save_ledger(ledger: &Ledger, connection: &Connection) -> Result<(), Error> {
    let text = serialize_ledger(ledger)?;

    set_value(LEDGER_KEY, &text, connection)
        .inspect_err(|error| tracing::error!("could not save the ledger: {error}"))
}

/// Read the ledger from the store.
///
/// A missing snapshot gives an empty ledger. A snapshot that cannot be parsed
/// or fails validation also gives an empty ledger, with the reason recorded
/// in [LoadedLedger::problem].
///
/// # Errors
/// Returns [Error::SqlError] if the store cannot be read.
pub fn load_ledger(connection: &Connection) -> Result<LoadedLedger, Error> {
    let Some(text) = get_value(LEDGER_KEY, connection)? else {
        tracing::debug!("No stored ledger found, starting with an empty ledger");
        return Ok(LoadedLedger::default());
    };

    match parse_ledger(&text) {
        Ok(ledger) => {
            tracing::info!("Loaded ledger with {} lender(s)", ledger.len());
            Ok(LoadedLedger {
                ledger,
                problem: None,
            })
        }
        Err(error) => {
            tracing::warn!("Ignoring stored ledger, starting with an empty ledger: {error}");
            Ok(LoadedLedger {
                ledger: Ledger::new(),
                problem: Some(error.to_string()),
            })
        }
    }
}


#[cfg(test)]
mod load_save_tests {
    use rusqlite::Connection;

    use crate::{
        ledger::Ledger,
        store::{create_kv_table, get_value, set_value},
    };

    use super::{LEDGER_KEY, LoadedLedger, load_ledger, save_ledger};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_kv_table(&connection).unwrap();
        connection
    }

    #[test]
    fn missing_snapshot_loads_empty_ledger() {
        let connection = get_test_connection();

        let got = load_ledger(&connection).unwrap();

        assert_eq!(got, LoadedLedger::default());
    }

    #[test]
    fn saved_ledger_is_loaded() {
        let connection = get_test_connection();
        let ledger = Ledger::new().record_loan("chase", "100", "car").unwrap();

        save_ledger(&ledger, &connection).unwrap();
        let got = load_ledger(&connection).unwrap();

        assert_eq!(got.ledger, ledger);
        assert_eq!(got.problem, None);
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let connection = get_test_connection();
        let first = Ledger::new().record_loan("chase", "100", "car").unwrap();
        save_ledger(&first, &connection).unwrap();

        let second = Ledger::new();
        save_ledger(&second, &connection).unwrap();

        assert_eq!(load_ledger(&connection).unwrap().ledger, second);
    }

    #[test]
    fn malformed_snapshot_loads_empty_ledger_and_reports_problem() {
        let connection = get_test_connection();
        set_value(LEDGER_KEY, "{\"BOA\": 42}", &connection).unwrap();

        let got = load_ledger(&connection).unwrap();

        assert!(got.ledger.is_empty());
        assert!(got.problem.is_some(), "want a problem to be reported");
        assert_eq!(
            get_value(LEDGER_KEY, &connection).unwrap(),
            Some("{\"BOA\": 42}".to_owned()),
            "the stored snapshot should not be touched by loading"
        );
    }

    #[test]
    fn missing_table_is_an_error() {
        let connection = Connection::open_in_memory().unwrap();

        assert!(load_ledger(&connection).is_err());
    }
}
