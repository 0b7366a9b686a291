//! a module turns a String expression into a symbolic expression
//!# Example
//! ```
//! use RustedGraph::symbolic::symbolic_engine::Expr;
//! let input = "x^2.3* log(x+y+y^2.6)";
//! let parsed_expression = Expr::parse_expression(input).unwrap();
//! let parsed_function = parsed_expression.lambdify_checked(&["x", "y"]).unwrap();
//! println!("{}, Rust function: {}  \n", input, parsed_function(&[1.0, 2.0]));
//! ```
//                  precedence ladder (loosest first)
//                |  expr   : term (('+' | '-') term)*                  |
//                |  term   : unary (('*' | '/') unary | power)*        |
//                |           the bare `power` arm is implicit product  |
//                |           "2x", "3(x+1)", "x sin(x)"                |
//                |  unary  : ('-' | '+') unary | power                 |
//                |  power  : atom (('^' | '**') unary)?   right assoc  |
//                |  atom   : number | call | name | '(' expr ')'      |
use std::f64::consts::{E, PI};

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{map, not, opt, recognize, value},
    error::{Error, ErrorKind, ParseError},
    multi::many0,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded, terminated},
};

use crate::graphing::error::PlotError;
use crate::symbolic::symbolic_engine::Expr;

#[derive(Clone, Copy, Debug)]
enum MulOp {
    Mul,
    Div,
}

/// wraps a parser so that surrounding whitespace is ignored
fn ws<'a, F>(inner: F) -> impl Parser<&'a str, Output = F::Output, Error = F::Error>
where
    F: Parser<&'a str>,
    F::Error: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"), tag("θ"), tag("π"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse_complete(input)
}

/// unsigned float literal; a leading sign belongs to `unary`
fn number(input: &str) -> IResult<&str, Expr> {
    not(one_of("+-")).parse_complete(input)?;
    let (rest, literal) = match recognize_float::<&str, Error<&str>>(input) {
        Ok(found) => found,
        // `2e` or `2exp(x)`: the `e` starts a name, not an exponent
        Err(nom::Err::Failure(_)) => {
            recognize(pair(digit1, opt(pair(char('.'), digit0)))).parse_complete(input)?
        }
        Err(e) => return Err(e),
    };
    let value = literal
        .parse::<f64>()
        .map_err(|_| nom::Err::Error(Error::new(input, ErrorKind::Float)))?;
    Ok((rest, Expr::Const(value)))
}

/// builds the node for a known function name
fn function_constructor(name: &str) -> Option<fn(Expr) -> Expr> {
    let ctor: fn(Expr) -> Expr = match name {
        "sin" => |e| Expr::sin(e.boxed()),
        "cos" => |e| Expr::cos(e.boxed()),
        "tan" | "tg" => |e| Expr::tg(e.boxed()),
        "cot" | "ctg" => |e| Expr::ctg(e.boxed()),
        "asin" | "arcsin" => |e| Expr::arcsin(e.boxed()),
        "acos" | "arccos" => |e| Expr::arccos(e.boxed()),
        "atan" | "arctan" | "arctg" => |e| Expr::arctg(e.boxed()),
        "acot" | "arccot" | "arcctg" => |e| Expr::arcctg(e.boxed()),
        "exp" => |e| Expr::Exp(e.boxed()),
        // natural logarithm, same as the symbolic engine always did
        "ln" | "log" => |e| Expr::Ln(e.boxed()),
        "sqrt" => |e| e.pow(Expr::Const(0.5)),
        "abs" => |e| Expr::Abs(e.boxed()),
        _ => return None,
    };
    Some(ctor)
}

fn function_call(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = identifier(input)?;
    let Some(ctor) = function_constructor(name) else {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Tag)));
    };
    let (rest, argument) =
        delimited(pair(multispace0, char('(')), ws(expr), char(')')).parse_complete(rest)?;
    Ok((rest, ctor(argument)))
}

fn name_or_constant(input: &str) -> IResult<&str, Expr> {
    map(identifier, |name: &str| match name {
        "pi" | "π" => Expr::Const(PI),
        "e" => Expr::Const(E),
        _ => Expr::Var(name.to_string()),
    })
    .parse_complete(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    alt((
        number,
        function_call,
        name_or_constant,
        delimited(char('('), ws(expr), char(')')),
    ))
    .parse_complete(input)
}

fn power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = atom(input)?;
    let (input, exponent) =
        opt(preceded(ws(alt((tag("**"), tag("^")))), unary)).parse_complete(input)?;
    Ok((
        input,
        match exponent {
            Some(exponent) => base.pow(exponent),
            None => base,
        },
    ))
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(terminated(char('-'), multispace0), unary), |e| match e {
            Expr::Const(c) => Expr::Const(-c),
            other => -other,
        }),
        preceded(terminated(char('+'), multispace0), unary),
        power,
    ))
    .parse_complete(input)
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    let mul_op = alt((
        value(MulOp::Mul, terminated(char('*'), not(char('*')))),
        value(MulOp::Div, char('/')),
    ));
    let (input, rest) = many0(alt((
        pair(ws(mul_op), unary),
        map(preceded(multispace0, power), |e| (MulOp::Mul, e)),
    )))
    .parse_complete(input)?;
    let folded = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        MulOp::Mul => acc * rhs,
        MulOp::Div => acc / rhs,
    });
    Ok((input, folded))
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(ws(one_of("+-")), term)).parse_complete(input)?;
    let folded = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => acc + rhs,
        _ => acc - rhs,
    });
    Ok((input, folded))
}

/// Parses a whole expression. Anything left after the expression is an error.
pub fn parse_expression_func(input: &str) -> Result<Expr, PlotError> {
    let source = input.trim();
    if source.is_empty() {
        return Err(PlotError::Parse {
            input: input.to_string(),
            message: "empty expression".to_string(),
        });
    }
    match ws(expr).parse_complete(source) {
        Ok(("", parsed)) => Ok(parsed),
        Ok((rest, _)) => Err(PlotError::Parse {
            input: source.to_string(),
            message: format!("unexpected input at `{}`", rest),
        }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(PlotError::Parse {
            input: source.to_string(),
            message: format!("cannot parse at `{}` ({:?})", e.input, e.code),
        }),
        Err(nom::Err::Incomplete(_)) => Err(PlotError::Parse {
            input: source.to_string(),
            message: "incomplete expression".to_string(),
        }),
    }
}
