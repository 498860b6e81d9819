use super::{ExecutionContext, QueryContext};
use crate::core::{DbError, Result};

/// A named state-mutating operation.
pub trait Invocation: Send + Sync {
    /// Operation name callers dispatch on
    fn name(&self) -> &'static str;

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[String]) -> Result<Vec<u8>>;
}

/// A named read-only operation.
pub trait Query: Send + Sync {
    /// Operation name callers dispatch on
    fn name(&self) -> &'static str;

    fn execute(&self, ctx: &QueryContext<'_>, args: &[String]) -> Result<Vec<u8>>;
}

/// Fails with `InvalidArguments` unless at least `expected` positional
/// arguments were supplied to `function`.
pub fn require_args(function: &str, args: &[String], expected: usize) -> Result<()> {
    if args.len() < expected {
        return Err(DbError::InvalidArguments(format!(
            "{} expects {} arguments, got {}",
            function,
            expected,
            args.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_args() {
        let args = vec!["alice".to_string()];
        assert!(require_args("sendMessage", &args, 1).is_ok());
        assert!(require_args("readMessages", &[], 0).is_ok());

        let err = require_args("sendMessage", &args, 2).unwrap_err();
        assert!(matches!(err, DbError::InvalidArguments(_)));
        assert_eq!(
            err.to_string(),
            "Incorrect arguments: sendMessage expects 2 arguments, got 1"
        );
    }
}
