//! Host key/value substrate.
//!
//! Everything above this module talks to durable state only through the
//! [`Ledger`] trait, so the same table and dispatch code runs against the
//! in-memory ledger, the file-backed ledger, or a transaction overlay.

pub mod memory;
pub mod persistence;
pub mod transaction;

pub use memory::MemoryLedger;
pub use persistence::FileLedger;
pub use transaction::{Transaction, WriteSet};

use crate::core::Result;

pub type StateEntry = (String, Vec<u8>);

/// Lazy, finite, non-restartable stream of ledger entries.
pub type StateIter<'a> = Box<dyn Iterator<Item = Result<StateEntry>> + 'a>;

pub trait Ledger {
    /// Fetch the value stored under `key`.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Entries with keys in `[start, end)`, in ascending key order.
    fn range_scan<'a>(&'a self, start: &str, end: &str) -> Result<StateIter<'a>>;

    /// Make committed state durable. A no-op for volatile ledgers.
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    /// Apply a finished transaction's write set and make it durable.
    ///
    /// The default applies the puts and then calls [`Ledger::sync`]. Ledgers
    /// whose sync can fail override this so that an `Err` leaves the visible
    /// state exactly as it was before the call.
    fn commit(&mut self, writes: WriteSet) -> Result<()> {
        writes.apply(self)?;
        self.sync()
    }
}
