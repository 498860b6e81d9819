pub mod catalog;
pub mod engine;
pub mod table;

pub use catalog::{CHAT_LOG_TABLE, Catalog, ORDER_TABLE, TableDefinition};
pub use engine::StorageEngine;
pub use table::{RowIter, TableSchema};
