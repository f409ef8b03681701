//! Path expression evaluator
//!
//! A small expression language for lock keys:
//!
//! | Form | Example | Result |
//! |------|---------|--------|
//! | Variable | `#p0`, `#user`, `order_id` | bound value, `null` when unbound |
//! | Property | `#user.id`, `#p0.address.city` | field of an object |
//! | Index | `#args[1]`, `#args.1`, `#p0.items[0].sku` | element of an array |
//! | String literal | `'order'` | the string |
//! | Integer literal | `42`, `-1` | the number |
//! | Concatenation | `'u' + #p0.id` | sum of two integers, otherwise joined text |
//!
//! Whitespace between tokens is ignored.

use dlock_domain::constants::EXPRESSION_VARIABLE_SIGIL;
use dlock_domain::error::{Error, Result};
use dlock_domain::ports::ExpressionEvaluator;
use dlock_domain::value_objects::VariableScope;
use serde_json::Value;

use crate::constants::EXPRESSION_EVALUATOR_PATH;

/// Evaluates variable paths, literals and `+` concatenation
#[derive(Debug, Clone, Copy, Default)]
pub struct PathExpressionEvaluator;

impl PathExpressionEvaluator {
    /// Create an evaluator
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator for PathExpressionEvaluator {
    fn evaluate(&self, expression: &str, scope: &VariableScope) -> Result<Value> {
        let mut parser = Parser::new(expression, scope);
        let value = parser.sum()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(value),
            Some(c) => Err(parser.error(format!("unexpected '{c}'"))),
        }
    }

    fn evaluator_name(&self) -> &str {
        EXPRESSION_EVALUATOR_PATH
    }
}

struct Parser<'a> {
    source: &'a str,
    rest: &'a str,
    scope: &'a VariableScope,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, scope: &'a VariableScope) -> Self {
        Self {
            source,
            rest: source,
            scope,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::expression(self.source, message)
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Consume the longest prefix matching `accept`
    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| !accept(*c))
            .map_or(self.rest.len(), |(i, _)| i);
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    /// sum := term ('+' term)*
    fn sum(&mut self) -> Result<Value> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some('+') {
                return Ok(value);
            }
            self.bump();
            let rhs = self.term()?;
            value = concat(value, rhs);
        }
    }

    /// term := string | integer | reference
    fn term(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') => self.string(),
            Some(c) if c.is_ascii_digit() || c == '-' => self.integer(),
            Some(c) if c == EXPRESSION_VARIABLE_SIGIL || is_ident_start(c) => self.reference(),
            Some(c) => Err(self.error(format!("unexpected '{c}'"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn string(&mut self) -> Result<Value> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                // '' inside a literal is an escaped quote
                Some('\'') if self.peek() == Some('\'') => {
                    self.bump();
                    text.push('\'');
                }
                Some('\'') => return Ok(Value::String(text)),
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    fn integer(&mut self) -> Result<Value> {
        let negative = self.peek() == Some('-');
        if negative {
            self.bump();
        }
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(self.error("expected digits"));
        }
        let magnitude: i64 = digits
            .parse()
            .map_err(|e| self.error(format!("invalid integer '{digits}': {e}")))?;
        Ok(Value::from(if negative { -magnitude } else { magnitude }))
    }

    /// reference := '#'? ident ('.' segment | '[' index ']')*
    fn reference(&mut self) -> Result<Value> {
        if self.peek() == Some(EXPRESSION_VARIABLE_SIGIL) {
            self.bump();
        }
        let name = self.identifier()?;
        let Some(mut current) = self.scope.get(name).cloned() else {
            return Ok(Value::Null);
        };

        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    let segment = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                    if segment.is_empty() {
                        return Err(self.error("expected property name after '.'"));
                    }
                    current = self.step(current, segment)?;
                }
                Some('[') => {
                    self.bump();
                    self.skip_whitespace();
                    let index = self.take_while(|c| c.is_ascii_digit());
                    self.skip_whitespace();
                    if index.is_empty() || self.bump() != Some(']') {
                        return Err(self.error("expected '[<index>]'"));
                    }
                    current = self.step(current, index)?;
                }
                _ => return Ok(current),
            }
        }
    }

    fn identifier(&mut self) -> Result<&'a str> {
        match self.peek() {
            Some(c) if is_ident_start(c) => {
                Ok(self.take_while(|c| c.is_ascii_alphanumeric() || c == '_'))
            }
            _ => Err(self.error("expected variable name")),
        }
    }

    fn step(&self, current: Value, segment: &str) -> Result<Value> {
        match current {
            Value::Object(mut map) => map
                .remove(segment)
                .ok_or_else(|| self.error(format!("no property '{segment}'"))),
            Value::Array(mut items) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| self.error(format!("'{segment}' is not an array index")))?;
                if index < items.len() {
                    Ok(items.swap_remove(index))
                } else {
                    Err(self.error(format!("index {index} out of bounds")))
                }
            }
            Value::Null => Err(self.error(format!("cannot read '{segment}' of null"))),
            other => Err(self.error(format!("cannot read '{segment}' of {other}"))),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn concat(lhs: Value, rhs: Value) -> Value {
    if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Value::from(sum);
        }
    }
    Value::String(format!("{}{}", text(&lhs), text(&rhs)))
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
