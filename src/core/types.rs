use std::collections::HashSet;
use std::fmt;
use serde::{Deserialize, Serialize};
use super::{DbError, Result, Value};

pub type Row = Vec<Value>;

/// Column types understood by the host ledger's table layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Bool,
    Bytes,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::UInt32 => "UINT32",
            Self::UInt64 => "UINT64",
            Self::Bool => "BOOL",
            Self::Bytes => "BYTES",
        }
    }

    pub fn is_compatible(&self, value: &Value) -> bool {
        value.data_type() == *self
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            key: false,
        }
    }

    /// Marks the column as part of the row key.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if !self.data_type.is_compatible(value) {
            return Err(DbError::SchemaMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Builds a schema, rejecting empty column lists and blank or repeated
    /// column names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(DbError::InvalidSchema("at least one column is required".into()));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.name.is_empty() {
                return Err(DbError::InvalidSchema("column name cannot be empty".into()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(DbError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|col| col.key)
    }

    pub fn has_key(&self) -> bool {
        self.columns.iter().any(|col| col.key)
    }

    /// Checks arity and per-column type.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DbError::SchemaMismatch(format!(
                "Expected {} columns, got {}",
                self.columns.len(),
                row.len()
            )));
        }
        for (column, value) in self.columns.iter().zip(row.iter()) {
            column.validate(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_columns() -> Vec<Column> {
        vec![
            Column::new("Sender", DataType::String),
            Column::new("Message", DataType::String),
        ]
    }

    #[test]
    fn test_schema_rejects_empty_and_duplicates() {
        assert!(matches!(Schema::new(vec![]), Err(DbError::InvalidSchema(_))));
        assert!(matches!(
            Schema::new(vec![Column::new("", DataType::String)]),
            Err(DbError::InvalidSchema(_))
        ));
        assert!(matches!(
            Schema::new(vec![
                Column::new("Sender", DataType::String),
                Column::new("Sender", DataType::Bytes),
            ]),
            Err(DbError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_validate_row_arity_and_types() {
        let schema = Schema::new(chat_columns()).unwrap();

        assert!(schema.validate_row(&vec!["alice".into(), "hello".into()]).is_ok());
        assert!(matches!(
            schema.validate_row(&vec!["alice".into()]),
            Err(DbError::SchemaMismatch(_))
        ));
        assert!(matches!(
            schema.validate_row(&vec!["alice".into(), Value::Int64(1)]),
            Err(DbError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_key_columns() {
        let schema = Schema::new(vec![
            Column::new("Id", DataType::UInt64).key(),
            Column::new("Body", DataType::String),
        ])
        .unwrap();

        assert!(schema.has_key());
        let keys: Vec<_> = schema.key_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(keys, vec!["Id"]);
        assert_eq!(schema.find_column_index("Body"), Some(1));
        assert!(!Schema::new(chat_columns()).unwrap().has_key());
    }
}
