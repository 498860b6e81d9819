use crate::core::{Column, DbError, Result, Row, Schema, Value};
use crate::ledger::StateIter;
use serde::{Deserialize, Serialize};

// Ledger key layout. Table names never contain NUL, so every table owns the
// half-open range `\0row\0{name}\0 .. \0row\0{name}\x01`.
const SCHEMA_PREFIX: &str = "\0table\0";
const SEQUENCE_PREFIX: &str = "\0seq\0";
const ROW_PREFIX: &str = "\0row\0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    schema: Schema,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DbError::InvalidSchema("table name cannot be empty".into()));
        }
        if name.contains('\0') {
            return Err(DbError::InvalidSchema(format!(
                "table name {:?} contains a NUL character",
                name
            )));
        }
        let schema = Schema::new(columns)?;
        Ok(Self { name, schema })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        self.schema.columns()
    }

    /// Positions of the key columns, in schema order.
    pub fn key_indices(&self) -> Vec<usize> {
        self.columns()
            .iter()
            .enumerate()
            .filter(|(_, col)| col.key)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Ledger key for the row, for tables with at least one key column.
    pub(crate) fn keyed_row_key(&self, row: &Row) -> Result<String> {
        let key_values: Vec<&Value> = self.key_indices().into_iter().map(|idx| &row[idx]).collect();
        let encoded = rmp_serde::to_vec(&key_values)?;

        let hex: String = encoded.iter().map(|byte| format!("{:02x}", byte)).collect();
        Ok(format!("{}k{}", row_range_start(&self.name), hex))
    }

    /// Resolve a key-prefix filter into `(column index, expected value)`
    /// pairs. An empty filter matches every row.
    pub(crate) fn resolve_filter(&self, filter: &[Value]) -> Result<Vec<(usize, Value)>> {
        let key_indices = self.key_indices();
        if filter.len() > key_indices.len() {
            return Err(DbError::SchemaMismatch(format!(
                "Table '{}' has {} key columns, filter has {} values",
                self.name,
                key_indices.len(),
                filter.len()
            )));
        }

        let mut resolved = Vec::with_capacity(filter.len());
        for (idx, value) in key_indices.into_iter().zip(filter.iter()) {
            self.columns()[idx].validate(value)?;
            resolved.push((idx, value.clone()));
        }
        Ok(resolved)
    }
}

pub(crate) fn schema_key(table: &str) -> String {
    format!("{}{}", SCHEMA_PREFIX, table)
}

pub(crate) fn sequence_key(table: &str) -> String {
    format!("{}{}", SEQUENCE_PREFIX, table)
}

pub(crate) fn row_range_start(table: &str) -> String {
    format!("{}{}\0", ROW_PREFIX, table)
}

pub(crate) fn row_range_end(table: &str) -> String {
    format!("{}{}\u{1}", ROW_PREFIX, table)
}

/// Zero-padded so that ledger key order equals insertion order.
pub(crate) fn sequence_row_key(table: &str, seq: u64) -> String {
    format!("{}s{:020}", row_range_start(table), seq)
}

/// Lazy sequence of rows produced by a table scan.
///
/// Rows are decoded as the underlying ledger iterator is consumed. The
/// iterator is finite and cannot be restarted; scanning again is a fresh read.
pub struct RowIter<'a> {
    table: String,
    arity: usize,
    entries: StateIter<'a>,
    filter: Vec<(usize, Value)>,
}

impl<'a> RowIter<'a> {
    pub(crate) fn new(schema: &TableSchema, entries: StateIter<'a>, filter: Vec<(usize, Value)>) -> Self {
        Self {
            table: schema.name().to_string(),
            arity: schema.schema().column_count(),
            entries,
            filter,
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Row> {
        let row: Row = rmp_serde::from_slice(bytes)?;
        if row.len() != self.arity {
            return Err(DbError::Codec(format!(
                "Stored row in table '{}' has {} values, schema has {}",
                self.table,
                row.len(),
                self.arity
            )));
        }
        Ok(row)
    }

    fn matches(&self, row: &Row) -> bool {
        self.filter.iter().all(|(idx, expected)| &row[*idx] == expected)
    }
}

impl Iterator for RowIter<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (_, bytes) = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            match self.decode(&bytes) {
                Ok(row) if self.matches(&row) => return Some(Ok(row)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;

    fn keyed_schema() -> TableSchema {
        TableSchema::new(
            "Shipment",
            vec![
                Column::new("Region", DataType::String).key(),
                Column::new("Id", DataType::UInt64).key(),
                Column::new("Note", DataType::String),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_name_validation() {
        let columns = vec![Column::new("Sender", DataType::String)];
        assert!(matches!(
            TableSchema::new("", columns.clone()),
            Err(DbError::InvalidSchema(_))
        ));
        assert!(matches!(
            TableSchema::new("Chat\0Log", columns.clone()),
            Err(DbError::InvalidSchema(_))
        ));
        assert!(TableSchema::new("ChatLog", columns).is_ok());
    }

    #[test]
    fn test_sequence_keys_sort_in_insertion_order() {
        let mut keys: Vec<String> = [10u64, 2, 1, 100].iter().map(|s| sequence_row_key("ChatLog", *s)).collect();
        keys.sort();
        assert_eq!(keys[0], sequence_row_key("ChatLog", 1));
        assert_eq!(keys[3], sequence_row_key("ChatLog", 100));
        for key in &keys {
            assert!(key.as_str() >= row_range_start("ChatLog").as_str());
            assert!(key.as_str() < row_range_end("ChatLog").as_str());
        }
    }

    #[test]
    fn test_row_ranges_do_not_overlap_across_tables() {
        let chat = sequence_row_key("Chat", 0);
        assert!(chat.as_str() < row_range_start("ChatLog").as_str() || chat.as_str() >= row_range_end("ChatLog").as_str());
    }

    #[test]
    fn test_keyed_row_key_depends_only_on_key_columns() {
        let schema = keyed_schema();
        let a = schema
            .keyed_row_key(&vec!["eu".into(), Value::UInt64(1), "first".into()])
            .unwrap();
        let b = schema
            .keyed_row_key(&vec!["eu".into(), Value::UInt64(1), "second".into()])
            .unwrap();
        let c = schema
            .keyed_row_key(&vec!["eu".into(), Value::UInt64(2), "first".into()])
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(&row_range_start("Shipment")));

        let suffix = &a[row_range_start("Shipment").len()..];
        let encoded = rmp_serde::to_vec(&vec![Value::from("eu"), Value::UInt64(1)]).unwrap();
        assert_eq!(suffix.len(), 1 + 2 * encoded.len());
        assert!(suffix.starts_with('k'));
        assert!(suffix[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_resolve_filter() {
        let schema = keyed_schema();
        assert!(schema.resolve_filter(&[]).unwrap().is_empty());
        assert_eq!(
            schema.resolve_filter(&["eu".into()]).unwrap(),
            vec![(0, Value::from("eu"))]
        );
        assert!(matches!(
            schema.resolve_filter(&[Value::UInt64(1)]),
            Err(DbError::SchemaMismatch(_))
        ));
        assert!(matches!(
            schema.resolve_filter(&["eu".into(), Value::UInt64(1), "x".into()]),
            Err(DbError::SchemaMismatch(_))
        ));
    }
}
