//! # Symbolic Engine Module
//!
//! Expression tree used by the graphing core to hold what the user typed into an
//! equation row after it has been parsed.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "y", "t", "theta"
//! - **Constants**: `Const(f64)` - numerical constants (pi and e are folded at parse time)
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, ... , `Abs`
//!
//! ### Key Methods
//! - `parse_expression(input)` - string to expression (see `parse_expr`)
//! - `contains_variable(var)` - does the tree reference `var`
//! - `extract_variables()` - sorted list of referenced variables
//! - `lambdify_checked(vars)` - compile into a closure (see `symbolic_lambdify`)
//!
//! The trigonometric variants keep the mathematical notation (tg, ctg, arctg, arcctg);
//! the parser accepts both that notation and the programming one (tan, cot, atan, acot).

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::fmt;

use crate::graphing::error::PlotError;
use crate::symbolic::parse_expr::parse_expression_func;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedGraph::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "theta")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x)
    tg(Box<Expr>),
    /// Cotangent function: cot(x)
    ctg(Box<Expr>),
    /// Arcsine function: arcsin(x)
    arcsin(Box<Expr>),
    /// Arccosine function: arccos(x)
    arccos(Box<Expr>),
    /// Arctangent function: arctan(x)
    arctg(Box<Expr>),
    /// Arccotangent function: arccot(x)
    arcctg(Box<Expr>),
    /// Absolute value: |x|
    Abs(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arcctg(expr) => write!(f, "arcctg({})", expr),
            Expr::Abs(expr) => write!(f, "abs({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// Parses a string into a symbolic expression.
    ///
    /// # Errors
    /// Returns `PlotError::Parse` when the text is not a well-formed expression.
    pub fn parse_expression(input: &str) -> Result<Expr, PlotError> {
        parse_expression_func(input)
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Single-argument children of function nodes, `None` for leaves and binary nodes.
    fn unary_child(&self) -> Option<&Expr> {
        match self {
            Expr::Exp(e)
            | Expr::Ln(e)
            | Expr::sin(e)
            | Expr::cos(e)
            | Expr::tg(e)
            | Expr::ctg(e)
            | Expr::arcsin(e)
            | Expr::arccos(e)
            | Expr::arctg(e)
            | Expr::arcctg(e)
            | Expr::Abs(e) => Some(e),
            _ => None,
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            other => other
                .unary_child()
                .is_some_and(|inner| inner.contains_variable(var_name)),
        }
    }

    /// Sorted, de-duplicated names of every variable referenced by the expression.
    pub fn extract_variables(&self) -> Vec<String> {
        let mut found = BTreeSet::new();
        self.collect_variables(&mut found);
        found.into_iter().collect()
    }

    fn collect_variables(&self, found: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                found.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.collect_variables(found);
                right.collect_variables(found);
            }
            other => {
                if let Some(inner) = other.unary_child() {
                    inner.collect_variables(found);
                }
            }
        }
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }
}
