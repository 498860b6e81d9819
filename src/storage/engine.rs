use super::table::{
    RowIter, TableSchema, row_range_end, row_range_start, schema_key, sequence_key, sequence_row_key,
};
use crate::core::{Column, DbError, Result, Row, Value};
use crate::ledger::Ledger;
use log::{debug, error};

/// Table operations layered over any [`Ledger`].
///
/// The engine keeps no state of its own: schemas, rows and row sequence
/// counters all live in the ledger, so every call is a fresh read of
/// whatever the ledger (or the enclosing transaction) currently holds.
pub trait StorageEngine {
    /// Register a new table schema. Fails if the name is already taken.
    fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<TableSchema>;

    /// Get the schema for a table
    fn get_table(&self, name: &str) -> Result<TableSchema>;

    /// Check if a table exists
    fn table_exists(&self, name: &str) -> Result<bool>;

    /// Insert a row into a table. The row is checked against the schema
    /// before anything is written.
    fn insert_row(&mut self, table: &str, row: Row) -> Result<()>;

    /// Scan the rows of a table whose leading key columns equal `filter`.
    /// An empty filter yields every row.
    fn get_rows<'a>(&'a self, table: &str, filter: &[Value]) -> Result<RowIter<'a>>;

    /// Get table row count
    fn row_count(&self, table: &str) -> Result<usize>;
}

impl<L: Ledger + ?Sized> StorageEngine for L {
    fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<TableSchema> {
        let schema = TableSchema::new(name, columns)?;

        let key = schema_key(schema.name());
        if self.get_state(&key)?.is_some() {
            return Err(DbError::SchemaAlreadyExists(name.to_string()));
        }

        self.put_state(&key, rmp_serde::to_vec(&schema)?)?;
        debug!("Created table '{}' with {} columns", name, schema.columns().len());
        Ok(schema)
    }

    fn get_table(&self, name: &str) -> Result<TableSchema> {
        match self.get_state(&schema_key(name))? {
            Some(bytes) => Ok(rmp_serde::from_slice(&bytes)?),
            None => Err(DbError::TableNotFound(name.to_string())),
        }
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_state(&schema_key(name))?.is_some())
    }

    fn insert_row(&mut self, table: &str, row: Row) -> Result<()> {
        let schema = self.get_table(table)?;
        schema.schema().validate_row(&row)?;

        let encoded = rmp_serde::to_vec(&row)?;
        let inserted = if schema.schema().has_key() {
            let key = schema.keyed_row_key(&row)?;
            put_if_absent(self, &key, encoded)?
        } else {
            let seq_key = sequence_key(table);
            let seq = match self.get_state(&seq_key)? {
                Some(bytes) => rmp_serde::from_slice::<u64>(&bytes)?,
                None => 0,
            };
            let inserted = put_if_absent(self, &sequence_row_key(table, seq), encoded)?;
            if inserted {
                self.put_state(&seq_key, rmp_serde::to_vec(&(seq + 1))?)?;
            }
            inserted
        };

        // "Not inserted" is a failure even when the store gave no cause.
        if !inserted {
            error!("Row was not inserted into table '{}'", table);
            return Err(DbError::StoreRejected(format!(
                "row already present in table '{}'",
                table
            )));
        }
        Ok(())
    }

    fn get_rows<'a>(&'a self, table: &str, filter: &[Value]) -> Result<RowIter<'a>> {
        let schema = self.get_table(table)?;
        let filter = schema.resolve_filter(filter)?;
        let entries = self.range_scan(&row_range_start(table), &row_range_end(table))?;
        Ok(RowIter::new(&schema, entries, filter))
    }

    fn row_count(&self, table: &str) -> Result<usize> {
        let mut count = 0;
        for row in self.get_rows(table, &[])? {
            row?;
            count += 1;
        }
        Ok(count)
    }
}

/// Returns `false` without writing when `key` is already occupied.
fn put_if_absent<L: Ledger + ?Sized>(ledger: &mut L, key: &str, value: Vec<u8>) -> Result<bool> {
    if ledger.get_state(key)?.is_some() {
        return Ok(false);
    }
    ledger.put_state(key, value)?;
    Ok(true)
}
