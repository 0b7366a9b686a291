#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedGraph::symbolic::symbolic_engine::Expr;
/// let input = "x^2 + 3x sin(y)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.lambdify_checked(&["x", "y"]).unwrap();
/// println!("{}, Rust function: {}  \n", input, parsed_function(&[1.0, 2.0]));
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree every equation row is parsed into
/// 1) turns a String expression into a symbolic expression
/// 2) reports which variables an expression references
/// 3) prints an expression back for diagnostics
///# Example#
/// ```
/// use RustedGraph::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("exp(x)+log(y)").unwrap();
/// let variables = parsed_expression.extract_variables();
/// assert_eq!(variables, vec!["x".to_string(), "y".to_string()]);
/// assert!(parsed_expression.contains_variable("y"));
/// ```
pub mod symbolic_engine;
/// turns a symbolic expression into a Rust closure over positional arguments
pub mod symbolic_lambdify;
