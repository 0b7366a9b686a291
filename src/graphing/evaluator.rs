//! Seam between the graphing core and the expression evaluator.
//!
//! The core never looks inside an expression: it hands text plus the names of the
//! variables a family binds to an [`ExpressionEvaluator`] and gets back something it
//! can call with positional bindings. [`SymbolicEvaluator`] is the implementation
//! backed by the crate's symbolic engine.
use std::fmt;

use crate::graphing::error::{EvalError, Result};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::LambdifiedFn;

/// A compiled expression. `bindings[i]` is the value of the i-th variable name the
/// expression was compiled with.
pub trait CompiledExpr: fmt::Debug {
    /// # Errors
    /// `EvalError` when this particular point has no numeric value (domain error,
    /// division by zero, overflow). Callers treat that as "no sample here".
    fn evaluate(&self, bindings: &[f64]) -> std::result::Result<f64, EvalError>;
}

/// Compiles expression text into a [`CompiledExpr`].
pub trait ExpressionEvaluator {
    /// # Errors
    /// `PlotError::Parse` for malformed text, `PlotError::UnknownVariable` when the
    /// text references a name absent from `variables`.
    fn compile(&self, expression: &str, variables: &[&str]) -> Result<Box<dyn CompiledExpr>>;
}

/// Evaluator built on [`Expr`] parsing and lambdification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymbolicEvaluator;

/// A lambdified expression plus the tree it came from (kept for diagnostics).
pub struct SymbolicCompiled {
    expr: Expr,
    function: LambdifiedFn,
}

impl SymbolicCompiled {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Debug for SymbolicCompiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolicCompiled")
            .field("expr", &format_args!("{}", self.expr))
            .finish()
    }
}

impl CompiledExpr for SymbolicCompiled {
    fn evaluate(&self, bindings: &[f64]) -> std::result::Result<f64, EvalError> {
        let value = (self.function)(bindings);
        if value.is_nan() {
            Err(EvalError::Domain)
        } else if value.is_infinite() {
            Err(EvalError::NonFinite)
        } else {
            Ok(value)
        }
    }
}

impl ExpressionEvaluator for SymbolicEvaluator {
    fn compile(&self, expression: &str, variables: &[&str]) -> Result<Box<dyn CompiledExpr>> {
        let expr = Expr::parse_expression(expression)?;
        let function = expr.lambdify_checked(variables)?;
        Ok(Box::new(SymbolicCompiled { expr, function }))
    }
}
