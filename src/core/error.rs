use thiserror::Error;

/// Which dispatch surface an operation name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// State-mutating calls (`invoke`).
    Invoke,
    /// Read-only calls (`query`).
    Query,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Table '{0}' already exists")]
    SchemaAlreadyExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid table definition: {0}")]
    InvalidSchema(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Store rejected operation: {0}")]
    StoreRejected(String),

    #[error("Incorrect arguments: {0}")]
    InvalidArguments(String),

    #[error("{}", unknown_operation_message(*.namespace, .function))]
    UnknownOperation { namespace: Namespace, function: String },

    #[error("Cannot send the message: {0}")]
    SendFailed(#[source] Box<DbError>),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

// The mutating surface does not echo the attempted name.
fn unknown_operation_message(namespace: Namespace, function: &str) -> String {
    match namespace {
        Namespace::Invoke => "Received unknown function invocation".to_string(),
        Namespace::Query => format!(
            "Received unknown function query invocation with function {}",
            function
        ),
    }
}

impl From<rmp_serde::encode::Error> for DbError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for DbError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
