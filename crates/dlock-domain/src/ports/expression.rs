//! Expression Evaluator Port

use crate::error::Result;
use crate::value_objects::VariableScope;
use serde_json::Value;

/// Evaluates a key expression against the variables of one call
///
/// An `Err` is not fatal for key derivation: the resolver falls back to a
/// plain property-path lookup and drops the part if that fails too.
pub trait ExpressionEvaluator: Send + Sync + std::fmt::Debug {
    /// Evaluate `expression`
    ///
    /// # Returns
    /// The resulting value; `Value::Null` when it evaluates to nothing.
    fn evaluate(&self, expression: &str, scope: &VariableScope) -> Result<Value>;

    /// Get the name/identifier of this evaluator
    fn evaluator_name(&self) -> &str;
}
