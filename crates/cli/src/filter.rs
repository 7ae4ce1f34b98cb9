// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `--filter` expression evaluation for `fm list`, via `cel-interpreter`
//! (listed in DESIGN.md as the crate the broader example pack reaches for
//! whenever a CLI needs a small user-facing boolean expression language,
//! rather than hand-rolling one). Each row exposes its summary fields as
//! CEL variables (`status == "running" && agent_count > 0`).

use std::collections::HashMap;

use cel_interpreter::{Context, Program, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid --filter expression: {0}")]
    Parse(String),
    #[error("--filter expression did not evaluate to a boolean: {0:?}")]
    NonBoolean(Value),
    #[error("--filter evaluation failed: {0}")]
    Eval(String),
}

/// One row's fields, named exactly as they appear in the CEL expression.
#[derive(Default)]
pub struct Row(HashMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn str(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), Value::String(value.into().into()));
        self
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.0.insert(key.to_string(), Value::Int(value));
        self
    }

    pub fn bool(mut self, key: &str, value: bool) -> Self {
        self.0.insert(key.to_string(), Value::Bool(value));
        self
    }
}

/// Compiles `expr` once; reuse the returned [`Filter`] across every row
/// instead of recompiling per row.
pub struct Filter {
    program: Program,
}

impl Filter {
    pub fn compile(expr: &str) -> Result<Self, FilterError> {
        let program = Program::compile(expr).map_err(|e| FilterError::Parse(e.to_string()))?;
        Ok(Self { program })
    }

    pub fn matches(&self, row: &Row) -> Result<bool, FilterError> {
        let mut ctx = Context::default();
        for (key, value) in &row.0 {
            let _ = ctx.add_variable(key.clone(), value.clone());
        }
        match self.program.execute(&ctx) {
            Ok(Value::Bool(b)) => Ok(b),
            Ok(other) => Err(FilterError::NonBoolean(other)),
            Err(e) => Err(FilterError::Eval(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_simple_equality() {
        let filter = Filter::compile("status == \"running\"").unwrap();
        assert!(filter.matches(&Row::new().str("status", "running")).unwrap());
        assert!(!filter.matches(&Row::new().str("status", "stopped")).unwrap());
    }

    #[test]
    fn matches_numeric_comparison() {
        let filter = Filter::compile("agent_count > 1").unwrap();
        assert!(filter.matches(&Row::new().int("agent_count", 2)).unwrap());
        assert!(!filter.matches(&Row::new().int("agent_count", 1)).unwrap());
    }

    #[test]
    fn rejects_non_boolean_result() {
        let filter = Filter::compile("1 + 1").unwrap();
        assert!(matches!(filter.matches(&Row::new()), Err(FilterError::NonBoolean(_))));
    }
}
