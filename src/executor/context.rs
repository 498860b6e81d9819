use crate::ledger::Ledger;
use uuid::Uuid;

/// Handle passed to state-mutating handlers for one unit of work.
pub struct ExecutionContext<'a> {
    pub ledger: &'a mut dyn Ledger,
    pub tx_id: Uuid,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(ledger: &'a mut dyn Ledger, tx_id: Uuid) -> Self {
        Self { ledger, tx_id }
    }
}

/// Read-only counterpart of [`ExecutionContext`].
pub struct QueryContext<'a> {
    pub ledger: &'a dyn Ledger,
    pub tx_id: Uuid,
}

impl<'a> QueryContext<'a> {
    pub fn new(ledger: &'a dyn Ledger, tx_id: Uuid) -> Self {
        Self { ledger, tx_id }
    }
}
