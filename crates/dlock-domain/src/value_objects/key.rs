//! Key derivation inputs
//!
//! A lock key is derived from two things: a [`KeyConfig`] describing which
//! values contribute (and in what order), and the [`CallArgs`] of one
//! invocation. Argument values are carried as [`serde_json::Value`] so that
//! sub-paths can be resolved without reflection.

use crate::constants::{
    EXPRESSION_VARIABLE_SIGIL, LOCK_KEY_DEFAULT_DELIMITER, LOCK_KEY_DEFAULT_PREFIX,
    SCOPE_ARGS_VARIABLE, SCOPE_POSITIONAL_ALIASES,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Tagging metadata for compound argument types
///
/// Lists the (dotted) paths of the fields that contribute to a lock key when
/// a value of this type is passed to a locked operation.
///
/// ```
/// use dlock_domain::value_objects::KeyFields;
///
/// #[derive(serde::Serialize)]
/// struct OrderRequest { user_id: u64, order_id: u64, note: String }
///
/// impl KeyFields for OrderRequest {
///     fn key_fields() -> &'static [&'static str] {
///         &["user_id", "order_id"]
///     }
/// }
/// ```
pub trait KeyFields {
    /// Tagged field paths, in declaration order
    fn key_fields() -> &'static [&'static str] {
        &[]
    }
}

/// One contributing source of a key part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum KeyPart {
    /// A tagged call argument, optionally narrowed by a sub-path
    ///
    /// Without a path, a simple value renders as-is and a compound value
    /// contributes its own tagged fields.
    TaggedArgument {
        /// Declared name or positional alias (`p0`, `a0`, `arg0`)
        argument: String,
        /// Dotted sub-path resolved against the argument
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    /// A tagged field inside a call argument
    TaggedField {
        /// Declared name or positional alias of the owning argument
        argument: String,
        /// Dotted path of the field
        path: String,
    },
    /// An expression evaluated against the variable scope
    Expression {
        /// Expression text, e.g. `#p0.id`
        expression: String,
    },
}

impl KeyPart {
    /// Tagged argument without a sub-path
    pub fn argument(argument: impl Into<String>) -> Self {
        Self::TaggedArgument {
            argument: argument.into(),
            path: None,
        }
    }

    /// Tagged argument narrowed by a sub-path
    pub fn argument_path(argument: impl Into<String>, path: impl Into<String>) -> Self {
        Self::TaggedArgument {
            argument: argument.into(),
            path: Some(path.into()),
        }
    }

    /// Tagged field of an argument
    pub fn field(argument: impl Into<String>, path: impl Into<String>) -> Self {
        Self::TaggedField {
            argument: argument.into(),
            path: path.into(),
        }
    }

    /// Expression part
    pub fn expression(expression: impl Into<String>) -> Self {
        Self::Expression {
            expression: expression.into(),
        }
    }

    /// Argument reference of a tagged part, `None` for expressions
    pub fn argument_ref(&self) -> Option<&str> {
        match self {
            Self::TaggedArgument { argument, .. } | Self::TaggedField { argument, .. } => {
                Some(argument)
            }
            Self::Expression { .. } => None,
        }
    }
}

/// Key derivation configuration for one call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Leading segment; omitted when blank
    pub prefix: String,
    /// Separator between segments
    pub delimiter: String,
    /// Contributing parts
    pub parts: Vec<KeyPart>,
}

impl KeyConfig {
    /// Config with the given prefix and delimiter and no parts
    pub fn new(prefix: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: delimiter.into(),
            parts: Vec::new(),
        }
    }

    /// Append a part
    pub fn with_part(mut self, part: KeyPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Append an expression part
    pub fn with_expression(self, expression: impl Into<String>) -> Self {
        self.with_part(KeyPart::expression(expression))
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self::new(LOCK_KEY_DEFAULT_PREFIX, LOCK_KEY_DEFAULT_DELIMITER)
    }
}

/// One argument of an intercepted call
#[derive(Debug, Clone, PartialEq)]
pub struct CallArgument {
    /// Declared parameter name
    pub name: String,
    /// Argument value
    pub value: Value,
    /// Tagged field paths of the argument's type (see [`KeyFields`])
    pub key_fields: Vec<String>,
}

impl CallArgument {
    /// Whether the value renders directly (not an object or array)
    pub fn is_simple(&self) -> bool {
        !matches!(self.value, Value::Object(_) | Value::Array(_))
    }
}

/// Ordered arguments of an intercepted call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    args: Vec<CallArgument>,
}

impl CallArgs {
    /// Empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pre-built JSON value
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.args.push(CallArgument {
            name: name.into(),
            value,
            key_fields: Vec::new(),
        });
        self
    }

    /// Append a serializable argument without tagged fields
    pub fn arg<T: Serialize + ?Sized>(self, name: impl Into<String>, value: &T) -> Result<Self> {
        Ok(self.with_value(name, serde_json::to_value(value)?))
    }

    /// Append a serializable argument whose type declares tagged fields
    pub fn keyed<T: Serialize + KeyFields>(
        mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        self.args.push(CallArgument {
            name: name.into(),
            value: serde_json::to_value(value)?,
            key_fields: T::key_fields().iter().map(|f| (*f).to_string()).collect(),
        });
        Ok(self)
    }

    /// Arguments in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &CallArgument> {
        self.args.iter()
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether there are no arguments
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Position of an argument by declared name or positional alias
    pub fn position(&self, reference: &str) -> Option<usize> {
        if let Some(index) = self.args.iter().position(|a| a.name == reference) {
            return Some(index);
        }
        positional_index(reference).filter(|index| *index < self.args.len())
    }

    /// Argument by declared name or positional alias
    pub fn get(&self, reference: &str) -> Option<&CallArgument> {
        self.position(reference).map(|index| &self.args[index])
    }
}

/// Parse `p3`, `a3` or `arg3` into `3`
fn positional_index(reference: &str) -> Option<usize> {
    // Longest alias first so "arg1" is not read as "a" + "rg1".
    let mut aliases = SCOPE_POSITIONAL_ALIASES;
    aliases.sort_by_key(|alias| std::cmp::Reverse(alias.len()));
    aliases.iter().find_map(|alias| {
        reference
            .strip_prefix(alias)
            .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|rest| rest.parse().ok())
    })
}

/// Variables visible to key expressions
///
/// Every argument is bound under its declared name and under the positional
/// aliases `p{i}`, `a{i}` and `arg{i}`; `args` holds all of them as an array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableScope {
    variables: HashMap<String, Value>,
}

impl VariableScope {
    /// Empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the scope for one call
    pub fn from_args(args: &CallArgs) -> Self {
        let mut variables = HashMap::new();
        for (index, arg) in args.iter().enumerate() {
            variables.insert(arg.name.clone(), arg.value.clone());
            for alias in SCOPE_POSITIONAL_ALIASES {
                variables.insert(format!("{alias}{index}"), arg.value.clone());
            }
        }
        variables.insert(
            SCOPE_ARGS_VARIABLE.to_string(),
            Value::Array(args.iter().map(|a| a.value.clone()).collect()),
        );
        Self { variables }
    }

    /// Bind a variable
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Resolve `#name.field.sub` (leading `#` optional) as a plain property path
    pub fn lookup_path(&self, expression: &str) -> Option<&Value> {
        let trimmed = expression.trim();
        let trimmed = trimmed
            .strip_prefix(EXPRESSION_VARIABLE_SIGIL)
            .unwrap_or(trimmed);
        let (root, rest) = match trimmed.split_once('.') {
            Some((root, rest)) => (root, Some(rest)),
            None => (trimmed, None),
        };
        let base = self.get(root)?;
        match rest {
            Some(path) => value_at_path(base, path),
            None => Some(base),
        }
    }
}

/// Resolve a dotted path (`customer.id`, `items.0.sku`) inside a value
pub fn value_at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Render a value as a key segment, `None` when absent or empty
pub fn render_key_part(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        compound => serde_json::to_string(compound).ok(),
    }
}
