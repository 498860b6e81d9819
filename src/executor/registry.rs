use super::{ExecutionContext, Invocation, Query, QueryContext};
use crate::core::{DbError, Namespace, Result};
use log::debug;
use std::collections::HashMap;

/// Name-based dispatch for the mutating and read-only operation namespaces.
///
/// Dispatch does not look at the arguments; each handler validates its own.
pub struct OperationRegistry {
    invocations: HashMap<&'static str, Box<dyn Invocation>>,
    queries: HashMap<&'static str, Box<dyn Query>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            invocations: HashMap::new(),
            queries: HashMap::new(),
        }
    }

    /// Register a mutating operation. A later registration under the same
    /// name replaces the earlier one.
    pub fn register_invocation(&mut self, invocation: Box<dyn Invocation>) {
        self.invocations.insert(invocation.name(), invocation);
    }

    /// Register a read-only operation.
    pub fn register_query(&mut self, query: Box<dyn Query>) {
        self.queries.insert(query.name(), query);
    }

    /// `sendMessage` on the mutating side, `readMessages` on the read side.
    pub fn with_default_operations() -> Self {
        use crate::chaincode::chat::{ReadMessages, SendMessage};

        let mut registry = Self::new();
        registry.register_invocation(Box::new(SendMessage));
        registry.register_query(Box::new(ReadMessages));
        registry
    }

    pub fn invoke(&self, ctx: &mut ExecutionContext<'_>, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let Some(invocation) = self.invocations.get(function) else {
            return Err(DbError::UnknownOperation {
                namespace: Namespace::Invoke,
                function: function.to_string(),
            });
        };
        debug!("Dispatching invocation {} ({} args)", function, args.len());
        invocation.execute(ctx, args)
    }

    pub fn query(&self, ctx: &QueryContext<'_>, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let Some(query) = self.queries.get(function) else {
            return Err(DbError::UnknownOperation {
                namespace: Namespace::Query,
                function: function.to_string(),
            });
        };
        debug!("Dispatching query {} ({} args)", function, args.len());
        query.execute(ctx, args)
    }

    pub fn list_invocations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.invocations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn list_queries(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.queries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
