pub mod context;
pub mod executor;
pub mod registry;

pub use context::{ExecutionContext, QueryContext};
pub use executor::{Invocation, Query, require_args};
pub use registry::OperationRegistry;
