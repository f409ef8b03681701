//! Key Expression Evaluators
//!
//! | Evaluator | Description |
//! |-----------|-------------|
//! | [`PathExpressionEvaluator`] | Variables, property paths, indices, literals and `+` |

pub mod path;

pub use path::PathExpressionEvaluator;
