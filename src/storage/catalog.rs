use super::{StorageEngine, TableSchema};
use crate::core::{Column, DataType, DbError, Result};
use crate::ledger::Ledger;
use log::{debug, error};

pub const CHAT_LOG_TABLE: &str = "ChatLog";
pub const ORDER_TABLE: &str = "Order";

/// A table the catalog will create at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<Column>,
}

/// The set of tables a deployment owns, in creation order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Vec<TableDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// `ChatLog` (Sender, Message) and `Order` (ProductName, DeliveryAddress).
    /// All columns are strings and none is a key.
    pub fn standard() -> Self {
        Self {
            tables: vec![
                TableDefinition {
                    name: CHAT_LOG_TABLE.to_string(),
                    columns: vec![
                        Column::new("Sender", DataType::String),
                        Column::new("Message", DataType::String),
                    ],
                },
                TableDefinition {
                    name: ORDER_TABLE.to_string(),
                    columns: vec![
                        Column::new("ProductName", DataType::String),
                        Column::new("DeliveryAddress", DataType::String),
                    ],
                },
            ],
        }
    }

    pub fn with_table(mut self, name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(DbError::SchemaAlreadyExists(name));
        }
        self.tables.push(TableDefinition { name, columns });
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn definitions(&self) -> &[TableDefinition] {
        &self.tables
    }

    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.iter().map(|table| table.name.as_str()).collect()
    }

    /// Create every table in order, stopping at the first failure.
    ///
    /// Tables created before the failure are still written to `ledger`; run
    /// this inside a transaction to make initialization all-or-nothing.
    pub fn initialize<L: Ledger + ?Sized>(&self, ledger: &mut L) -> Result<Vec<TableSchema>> {
        debug!("Initializing {} tables", self.tables.len());

        let mut created = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            match ledger.create_table(&table.name, table.columns.clone()) {
                Ok(schema) => created.push(schema),
                Err(e) => {
                    error!("Failed creating {} table: {}", table.name, e);
                    return Err(e);
                }
            }
        }

        debug!("Initialized tables: {}", self.list_tables().join(", "));
        Ok(created)
    }
}
