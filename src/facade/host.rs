// ============================================================================
// Host Runtime Harness
// ============================================================================
//
// Stands in for the host execution environment: each init/invoke runs in its
// own ledger transaction that is committed only if the chaincode returns Ok,
// and each query runs against a read-only view of committed state.
//
// ============================================================================

use crate::chaincode::{Chaincode, SupplierDealer};
use crate::core::Result;
use crate::executor::{ExecutionContext, QueryContext};
use crate::ledger::{Ledger, Transaction};
use tracing::{Level, event, info_span};
use uuid::Uuid;

pub struct Host<L: Ledger, C: Chaincode = SupplierDealer> {
    ledger: L,
    chaincode: C,
}

impl<L: Ledger> Host<L, SupplierDealer> {
    /// Attach the supplier/dealer chaincode to an existing ledger without
    /// initializing it.
    pub fn supplier_dealer(ledger: L) -> Self {
        Self::new(ledger, SupplierDealer::new())
    }
}

impl<L: Ledger, C: Chaincode> Host<L, C> {
    pub fn new(ledger: L, chaincode: C) -> Self {
        Self { ledger, chaincode }
    }

    /// Attach and initialize. No host is returned if initialization fails,
    /// so a half-built schema is never served.
    pub fn deploy(ledger: L, chaincode: C) -> Result<Self> {
        let mut host = Self::new(ledger, chaincode);
        host.init("init", &[])?;
        Ok(host)
    }

    pub fn init(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        self.run_transaction("init", function, |chaincode, ctx| {
            chaincode.init(ctx, function, args)
        })
    }

    pub fn invoke(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        self.run_transaction("invoke", function, |chaincode, ctx| {
            chaincode.invoke(ctx, function, args)
        })
    }

    pub fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let tx_id = Uuid::new_v4();
        let span = info_span!("host.query", tx_id = %tx_id, function = %function);
        let _enter = span.enter();

        let result = self
            .chaincode
            .query(&QueryContext::new(&self.ledger, tx_id), function, args);
        if let Err(e) = &result {
            event!(Level::WARN, error = %e, "query failed");
        }
        result
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn chaincode(&self) -> &C {
        &self.chaincode
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    fn run_transaction<F>(&mut self, kind: &'static str, function: &str, body: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&C, &mut ExecutionContext<'_>) -> Result<Vec<u8>>,
    {
        let tx_id = Uuid::new_v4();
        let span = info_span!("host.transaction", kind, tx_id = %tx_id, function = %function);
        let _enter = span.enter();

        let mut tx = Transaction::with_id(&self.ledger, tx_id);
        let result = body(&self.chaincode, &mut ExecutionContext::new(&mut tx, tx_id));
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                event!(
                    Level::WARN,
                    error = %e,
                    discarded = tx.pending_writes(),
                    "transaction rolled back"
                );
                return Err(e);
            }
        };

        let writes = tx.into_write_set();
        let count = writes.len();
        if let Err(e) = self.ledger.commit(writes) {
            event!(Level::WARN, error = %e, discarded = count, "commit failed");
            return Err(e);
        }
        event!(Level::DEBUG, writes = count, "transaction committed");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DbError;
    use crate::ledger::MemoryLedger;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_deploy_then_second_init_fails() {
        let mut host = Host::deploy(MemoryLedger::new(), SupplierDealer::new()).unwrap();
        let committed = host.ledger().clone();

        let err = host.init("init", &[]).unwrap_err();
        assert!(matches!(err, DbError::SchemaAlreadyExists(_)));
        assert_eq!(host.ledger(), &committed);
    }

    #[test]
    fn test_failed_invocation_commits_nothing() {
        let mut host = Host::deploy(MemoryLedger::new(), SupplierDealer::new()).unwrap();
        let committed = host.ledger().clone();

        assert!(host.invoke("sendMessage", &args(&["only-sender"])).is_err());
        assert!(host.invoke("unknown", &args(&["a", "b"])).is_err());
        assert_eq!(host.ledger(), &committed);
    }

    #[test]
    fn test_query_sees_committed_state() {
        let mut host = Host::supplier_dealer(MemoryLedger::new());
        host.init("init", &[]).unwrap();
        host.invoke("sendMessage", &args(&["alice", "hello"])).unwrap();

        let payload = host.query("readMessages", &[]).unwrap();
        assert_eq!(payload, br#"[{"sender":"alice","message":"hello"}]"#);
    }
}
