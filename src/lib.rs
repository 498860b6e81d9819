// ============================================================================
// Supplier/Dealer Record Store
// ============================================================================

pub mod chaincode;
pub mod config;
pub mod core;
pub mod executor;
pub mod facade;
pub mod ledger;
pub mod storage;

// Re-export main types for convenience
pub use chaincode::chat::{ChatLog, MessageLog};
pub use chaincode::{Chaincode, SupplierDealer};
pub use config::HostConfig;
pub use self::core::{Column, DataType, DbError, Namespace, Result, Row, Value};
pub use facade::Host;
pub use ledger::{FileLedger, Ledger, MemoryLedger};
pub use storage::{Catalog, StorageEngine, TableSchema};

/// Deploy the supplier/dealer chaincode on a fresh in-memory ledger.
///
/// # Examples
///
/// ```
/// use supplier_dealer::{ChatLog, in_memory};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut host = in_memory()?;
/// host.invoke("sendMessage", &["alice".to_string(), "hello".to_string()])?;
///
/// let payload = host.query("readMessages", &[])?;
/// let log: Vec<ChatLog> = serde_json::from_slice(&payload)?;
/// assert_eq!(log, vec![ChatLog::new("alice", "hello")]);
/// # Ok(())
/// # }
/// ```
pub fn in_memory() -> Result<Host<MemoryLedger>> {
    Host::deploy(MemoryLedger::new(), SupplierDealer::new())
}
