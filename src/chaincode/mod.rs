pub mod chat;

use crate::core::Result;
use crate::executor::{ExecutionContext, OperationRegistry, QueryContext};
use crate::storage::Catalog;
use log::debug;

/// Entry points a host runtime drives.
///
/// `init` and `invoke` receive a mutable ledger view scoped to one
/// transaction; `query` receives a read-only view.
pub trait Chaincode: Send + Sync {
    fn init(&self, ctx: &mut ExecutionContext<'_>, function: &str, args: &[String]) -> Result<Vec<u8>>;

    fn invoke(&self, ctx: &mut ExecutionContext<'_>, function: &str, args: &[String]) -> Result<Vec<u8>>;

    fn query(&self, ctx: &QueryContext<'_>, function: &str, args: &[String]) -> Result<Vec<u8>>;
}

/// The supplier/dealer record store: a `ChatLog` message log plus an `Order`
/// table whose schema is created but which no operation writes to yet.
pub struct SupplierDealer {
    catalog: Catalog,
    registry: OperationRegistry,
}

impl SupplierDealer {
    pub fn new() -> Self {
        Self::with_parts(Catalog::standard(), OperationRegistry::with_default_operations())
    }

    pub fn with_parts(catalog: Catalog, registry: OperationRegistry) -> Self {
        Self { catalog, registry }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }
}

impl Default for SupplierDealer {
    fn default() -> Self {
        Self::new()
    }
}

impl Chaincode for SupplierDealer {
    /// Function name and arguments are ignored.
    fn init(&self, ctx: &mut ExecutionContext<'_>, _function: &str, _args: &[String]) -> Result<Vec<u8>> {
        debug!("Init chaincode (tx {})", ctx.tx_id);
        self.catalog.initialize(ctx.ledger)?;
        debug!("Init chaincode done (tx {})", ctx.tx_id);
        Ok(Vec::new())
    }

    fn invoke(&self, ctx: &mut ExecutionContext<'_>, function: &str, args: &[String]) -> Result<Vec<u8>> {
        self.registry.invoke(ctx, function, args)
    }

    fn query(&self, ctx: &QueryContext<'_>, function: &str, args: &[String]) -> Result<Vec<u8>> {
        self.registry.query(ctx, function, args)
    }
}
