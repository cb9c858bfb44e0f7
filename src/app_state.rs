//! Implements a struct that holds the state of the server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    ledger::{Ledger, LedgerCommand},
    persistence::{LoadedLedger, load_ledger, save_ledger},
    store::initialize,
};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The one ledger for this process, restored from the database at start up.
    pub ledger: Arc<Mutex<LoadedLedger>>,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database and load the stored ledger.
    /// A stored ledger that cannot be read is replaced by an empty ledger, see
    /// [load_ledger].
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or read.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        initialize(&db_connection)?;
        let loaded = load_ledger(&db_connection)?;

        Ok(Self {
            ledger: Arc::new(Mutex::new(loaded)),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

/// The state needed by the route handlers that read or change the ledger.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub ledger: Arc<Mutex<LoadedLedger>>,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl LedgerState {
    /// Get a copy of the current ledger and the problem found when loading it, if any.
    ///
    /// # Errors
    /// Returns [Error::LedgerLockError] if the ledger lock is poisoned.
    pub fn snapshot(&self) -> Result<LoadedLedger, Error> {
        let loaded = self
            .ledger
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
            .map_err(|_| Error::LedgerLockError)?;

        Ok(loaded.clone())
    }

    /// Apply `command` to the current ledger, save the result and make it the current ledger.
    ///
    /// The ledger lock is held until the new ledger has been saved, so a
    /// concurrent request never sees a ledger that is not yet on disk. If
    /// saving fails, the current ledger is left as it was.
    ///
    /// # Errors
    /// Returns the validation error from [Ledger::apply], or an error if a
    /// lock cannot be acquired or the ledger cannot be saved.
    pub fn commit(&self, command: &LedgerCommand) -> Result<Ledger, Error> {
        let mut loaded = self
            .ledger
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
            .map_err(|_| Error::LedgerLockError)?;

        let updated = loaded.ledger.apply(command)?;

        {
            let connection = self
                .db_connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            save_ledger(&updated, &connection)?;
        }

        *loaded = LoadedLedger {
            ledger: updated.clone(),
            problem: None,
        };

        Ok(updated)
    }
}

#[cfg(test)]
pub(crate) fn get_test_ledger_state(ledger: Ledger) -> LedgerState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    save_ledger(&ledger, &connection).expect("Could not save test ledger");

    LedgerState {
        ledger: Arc::new(Mutex::new(LoadedLedger {
            ledger,
            problem: None,
        })),
        db_connection: Arc::new(Mutex::new(connection)),
    }
}


#[cfg(test)]
mod commit_tests {
    use crate::{
        Error,
        ledger::{Ledger, LedgerCommand, LenderKey},
        persistence::load_ledger,
    };

    use super::get_test_ledger_state;

    fn record_loan(lender: &str, amount: &str) -> LedgerCommand {
        LedgerCommand::RecordLoan {
            lender: lender.to_owned(),
            amount: amount.to_owned(),
            purpose: "test".to_owned(),
        }
    }

    #[test]
    fn commit_updates_memory_and_store() {
        let state = get_test_ledger_state(Ledger::new());

        let got = state.commit(&record_loan("chase", "100")).unwrap();

        assert_eq!(state.snapshot().unwrap().ledger, got);
        let stored = load_ledger(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(stored.ledger, got);
    }

    #[test]
    fn failed_command_changes_nothing() {
        let ledger = Ledger::new().record_loan("chase", "100", "car").unwrap();
        let state = get_test_ledger_state(ledger.clone());

        let got = state.commit(&record_loan("chase", "abc"));

        assert_eq!(got, Err(Error::InvalidAmount));
        assert_eq!(state.snapshot().unwrap().ledger, ledger);
        let stored = load_ledger(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(stored.ledger, ledger);
    }

    #[test]
    fn failed_save_keeps_current_ledger() {
        let ledger = Ledger::new().record_loan("chase", "100", "car").unwrap();
        let state = get_test_ledger_state(ledger.clone());
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("DROP TABLE kv_store", ())
            .unwrap();

        let got = state.commit(&LedgerCommand::DeleteLoan {
            lender: LenderKey::new_unchecked("CHASE"),
        });

        assert!(matches!(got, Err(Error::SqlError(_))), "got {got:?}");
        assert_eq!(state.snapshot().unwrap().ledger, ledger);
    }

    #[test]
    fn successful_commit_clears_load_problem() {
        let state = get_test_ledger_state(Ledger::new());
        state.ledger.lock().unwrap().problem = Some("bad snapshot".to_owned());

        state.commit(&record_loan("chase", "1")).unwrap();

        assert_eq!(state.snapshot().unwrap().problem, None);
    }
}
