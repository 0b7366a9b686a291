use std::f64::consts::PI;

use crate::graphing::error::PlotError;
use crate::symbolic::symbolic_engine::Expr;

/// Compiled form of an expression: positional arguments in, one number out.
pub type LambdifiedFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions
    ///
    /// Converts the expression tree into a closure whose argument slice follows the
    /// order of `vars`. Variable positions are resolved once here, so the returned
    /// closure does no lookups per call.
    ///
    /// Numerical failures (division by zero, logarithm of a negative number, ...)
    /// are not errors at this level, they show up as NaN or infinity in the result.
    ///
    /// # Errors
    /// `PlotError::UnknownVariable` if the expression references a name absent from `vars`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x^2").unwrap();
    /// let func = f.lambdify_checked(&["x"]).unwrap();
    /// assert_eq!(func(&[3.0]), 9.0);
    /// ```
    pub fn lambdify_checked(&self, vars: &[&str]) -> Result<LambdifiedFn, PlotError> {
        let compiled: LambdifiedFn = match self {
            Expr::Var(name) => {
                let index = vars
                    .iter()
                    .position(|&x| x == name)
                    .ok_or_else(|| PlotError::UnknownVariable {
                        name: name.clone(),
                        allowed: vars.iter().map(|v| v.to_string()).collect(),
                    })?;
                Box::new(move |args| args[index])
            }
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lf = lhs.lambdify_checked(vars)?;
                let rf = rhs.lambdify_checked(vars)?;
                Box::new(move |args| lf(args) + rf(args))
            }
            Expr::Sub(lhs, rhs) => {
                let lf = lhs.lambdify_checked(vars)?;
                let rf = rhs.lambdify_checked(vars)?;
                Box::new(move |args| lf(args) - rf(args))
            }
            Expr::Mul(lhs, rhs) => {
                let lf = lhs.lambdify_checked(vars)?;
                let rf = rhs.lambdify_checked(vars)?;
                Box::new(move |args| lf(args) * rf(args))
            }
            Expr::Div(lhs, rhs) => {
                let lf = lhs.lambdify_checked(vars)?;
                let rf = rhs.lambdify_checked(vars)?;
                Box::new(move |args| lf(args) / rf(args))
            }
            Expr::Pow(base, exp) => {
                let bf = base.lambdify_checked(vars)?;
                // integer powers keep negative bases meaningful: (-2)^3 = -8, not NaN
                match exp.as_ref() {
                    Expr::Const(n) if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 => {
                        let n = *n as i32;
                        Box::new(move |args| bf(args).powi(n))
                    }
                    _ => {
                        let ef = exp.lambdify_checked(vars)?;
                        Box::new(move |args| bf(args).powf(ef(args)))
                    }
                }
            }
            Expr::Exp(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).exp())
            }
            Expr::Ln(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).ln())
            }
            Expr::sin(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).sin())
            }
            Expr::cos(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).cos())
            }
            Expr::tg(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).tan())
            }
            Expr::ctg(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| 1.0 / f(args).tan())
            }
            Expr::arcsin(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).asin())
            }
            Expr::arccos(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).acos())
            }
            Expr::arctg(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).atan())
            }
            Expr::arcctg(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| PI / 2.0 - f(args).atan())
            }
            Expr::Abs(expr) => {
                let f = expr.lambdify_checked(vars)?;
                Box::new(move |args| f(args).abs())
            }
        };
        Ok(compiled)
    }
}
