//! Lock key derivation
//!
//! Turns a [`KeyConfig`] and the [`CallArgs`] of one invocation into a
//! deterministic [`LockKey`]. Parts are collected in two fixed groups:
//!
//! 1. Tagged arguments and fields, walking the arguments in declaration order.
//!    An argument nobody tagged still contributes the fields its type declares
//!    through [`KeyFields`](dlock_domain::KeyFields).
//! 2. Expressions, in configuration order, evaluated against a
//!    [`VariableScope`] holding every argument by name and positional alias.
//!
//! Absent or empty values are skipped, never rendered as placeholders.

use std::sync::Arc;

use dlock_domain::ports::ExpressionEvaluator;
use dlock_domain::value_objects::{
    CallArgs, CallArgument, KeyConfig, KeyPart, LockKey, VariableScope, render_key_part,
    value_at_path,
};
use serde_json::Value;
use tracing::debug;

/// Derives lock keys; pure apart from the injected evaluator
#[derive(Debug, Clone)]
pub struct KeyResolver {
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl KeyResolver {
    /// Create a resolver that evaluates expressions with `evaluator`
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Derive the key for one call
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = KeyConfig::default()
    ///     .with_part(KeyPart::argument_path("user", "id"))
    ///     .with_expression("#p1");
    /// let args = CallArgs::new().arg("user", &user)?.arg("order_id", &9)?;
    /// assert_eq!(resolver.resolve(&config, &args).as_str(), "dl:1:9");
    /// ```
    pub fn resolve(&self, config: &KeyConfig, args: &CallArgs) -> LockKey {
        let mut parts = tagged_parts(config, args);
        parts.extend(self.expression_parts(config, args));

        let key = join_key(config, &parts);
        debug!(key = %key, parts = ?parts, "built lock key");
        key
    }

    fn expression_parts(&self, config: &KeyConfig, args: &CallArgs) -> Vec<String> {
        let expressions: Vec<&str> = config
            .parts
            .iter()
            .filter_map(|part| match part {
                KeyPart::Expression { expression } if !expression.trim().is_empty() => {
                    Some(expression.as_str())
                }
                _ => None,
            })
            .collect();
        if expressions.is_empty() {
            return Vec::new();
        }

        let scope = VariableScope::from_args(args);
        expressions
            .into_iter()
            .filter_map(|expression| self.evaluate_part(expression, &scope))
            .collect()
    }

    fn evaluate_part(&self, expression: &str, scope: &VariableScope) -> Option<String> {
        match self.evaluator.evaluate(expression, scope) {
            Ok(value) => render_key_part(&value),
            Err(e) => {
                debug!(
                    expression,
                    evaluator = self.evaluator.evaluator_name(),
                    error = %e,
                    "expression failed, falling back to property path"
                );
                scope.lookup_path(expression).and_then(render_key_part)
            }
        }
    }
}

/// Group 1: tagged arguments and fields, in argument declaration order
fn tagged_parts(config: &KeyConfig, args: &CallArgs) -> Vec<String> {
    let mut parts = Vec::new();
    for (index, arg) in args.iter().enumerate() {
        let mut tagged = config.parts.iter().filter(|part| {
            part.argument_ref()
                .and_then(|reference| args.position(reference))
                == Some(index)
        });

        match tagged.next() {
            Some(first) => {
                for part in std::iter::once(first).chain(tagged) {
                    parts.extend(render_tagged(part, arg));
                }
            }
            None => parts.extend(declared_fields(arg)),
        }
    }
    parts
}

fn render_tagged(part: &KeyPart, arg: &CallArgument) -> Vec<String> {
    match part {
        KeyPart::TaggedArgument { path: None, .. } if arg.is_simple() => {
            render_key_part(&arg.value).into_iter().collect()
        }
        KeyPart::TaggedArgument { path: None, .. } => declared_fields(arg),
        KeyPart::TaggedArgument {
            path: Some(path), ..
        }
        | KeyPart::TaggedField { path, .. } => render_path(&arg.value, path).into_iter().collect(),
        KeyPart::Expression { .. } => Vec::new(),
    }
}

/// Fields the argument's type tags through `KeyFields`
fn declared_fields(arg: &CallArgument) -> Vec<String> {
    if arg.is_simple() {
        return Vec::new();
    }
    arg.key_fields
        .iter()
        .filter_map(|path| render_path(&arg.value, path))
        .collect()
}

fn render_path(value: &Value, path: &str) -> Option<String> {
    value_at_path(value, path).and_then(render_key_part)
}

/// Prefix (when not blank) and parts joined by the delimiter
fn join_key(config: &KeyConfig, parts: &[String]) -> LockKey {
    let prefix = (!config.prefix.trim().is_empty()).then_some(config.prefix.as_str());
    let segments: Vec<&str> = prefix
        .into_iter()
        .chain(parts.iter().map(String::as_str))
        .collect();
    LockKey::new(segments.join(&config.delimiter))
}
