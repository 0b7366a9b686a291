//! Decides which equation family a line of user input belongs to and compiles the
//! pieces that family needs.
//!
//! Precedence, first match wins:
//! 1. parametric  `x(t) = ..., y(t) = ...` (or `x = ...; y = ...`)
//! 2. polar       `r = ...` / `r(θ) = ...`
//! 3. inequality  one of `<`, `>`, `<=`, `>=`, `≤`, `≥`
//! 4. implicit    `lhs = rhs` that is not `y = f(x)`
//! 5. explicit    `y = f(x)`, `f(x) = ...`, or a bare expression in `x`
//!
//! The order is what keeps e.g. a parametric pair (which contains `=` twice) from
//! being read as an implicit equation.
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use strum_macros::{Display, EnumIter};

use crate::graphing::error::PlotError;
use crate::graphing::evaluator::{CompiledExpr, ExpressionEvaluator, SymbolicEvaluator};

/// Variables bound for each family.
pub const EXPLICIT_VARS: [&str; 1] = ["x"];
pub const PARAMETRIC_VARS: [&str; 1] = ["t"];
/// every polar variable name is bound to the same angle
pub const POLAR_VARS: [&str; 3] = ["theta", "θ", "t"];
pub const PLANE_VARS: [&str; 2] = ["x", "y"];

// the captured body of a declaration must not start with `=`: `r == 2` is not one
static PARAMETRIC_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([xy])\s*(?:\(\s*t\s*\))?\s*=(.*)$").expect("static regex")
});
static POLAR_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^r\s*(?:\(\s*(?:θ|theta|t)\s*\))?\s*=(.*)$").expect("static regex")
});
static EXPLICIT_LHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:y|[yf]\s*\(\s*x\s*\))$").expect("static regex"));

/// Equation category, drives which sampling strategy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Family {
    Explicit,
    Parametric,
    Polar,
    Implicit,
    Inequality,
}

/// Relational operator of an inequality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Relation {
    #[strum(to_string = "<")]
    Less,
    #[strum(to_string = ">")]
    Greater,
    #[strum(to_string = "<=")]
    LessEqual,
    #[strum(to_string = ">=")]
    GreaterEqual,
}

impl Relation {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Relation::Less => lhs < rhs,
            Relation::Greater => lhs > rhs,
            Relation::LessEqual => lhs <= rhs,
            Relation::GreaterEqual => lhs >= rhs,
        }
    }
}

/// A classified equation with the compiled callables its family needs.
#[derive(Debug)]
pub enum ClassifiedEquation {
    /// y = f(x)
    Explicit { f: Box<dyn CompiledExpr> },
    /// (x(t), y(t))
    Parametric {
        x: Box<dyn CompiledExpr>,
        y: Box<dyn CompiledExpr>,
    },
    /// r = f(θ)
    Polar { r: Box<dyn CompiledExpr> },
    /// g(x, y) = lhs - rhs, the curve is g = 0
    Implicit { g: Box<dyn CompiledExpr> },
    /// lhs(x, y) op rhs(x, y)
    Inequality {
        lhs: Box<dyn CompiledExpr>,
        rhs: Box<dyn CompiledExpr>,
        op: Relation,
    },
}

impl ClassifiedEquation {
    pub fn family(&self) -> Family {
        match self {
            ClassifiedEquation::Explicit { .. } => Family::Explicit,
            ClassifiedEquation::Parametric { .. } => Family::Parametric,
            ClassifiedEquation::Polar { .. } => Family::Polar,
            ClassifiedEquation::Implicit { .. } => Family::Implicit,
            ClassifiedEquation::Inequality { .. } => Family::Inequality,
        }
    }
}

/// Outcome of classification.
#[derive(Debug)]
pub enum Classification {
    Valid(ClassifiedEquation),
    /// `family` is the family that was being extracted when things went wrong, if any
    Invalid {
        family: Option<Family>,
        error: PlotError,
    },
}

impl Classification {
    pub fn family(&self) -> Option<Family> {
        match self {
            Classification::Valid(eq) => Some(eq.family()),
            Classification::Invalid { family, .. } => *family,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Classification::Valid(_))
    }

    pub fn equation(&self) -> Option<&ClassifiedEquation> {
        match self {
            Classification::Valid(eq) => Some(eq),
            Classification::Invalid { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&PlotError> {
        match self {
            Classification::Valid(_) => None,
            Classification::Invalid { error, .. } => Some(error),
        }
    }
}

fn classification_error(input: &str, reason: impl Into<String>) -> PlotError {
    PlotError::Classification {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Splits on any of `separators` that sits outside parentheses.
fn split_top_level<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && separators.contains(&c) => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte offset, byte length and kind of every relational operator in `text`.
fn find_relations(text: &str) -> Vec<(usize, usize, Relation)> {
    let mut found = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let followed_by_eq = matches!(chars.peek(), Some((_, '=')));
        let relation = match c {
            '<' if followed_by_eq => Some((2, Relation::LessEqual)),
            '>' if followed_by_eq => Some((2, Relation::GreaterEqual)),
            '<' => Some((1, Relation::Less)),
            '>' => Some((1, Relation::Greater)),
            '≤' => Some(('≤'.len_utf8(), Relation::LessEqual)),
            '≥' => Some(('≥'.len_utf8(), Relation::GreaterEqual)),
            _ => None,
        };
        if let Some((len, relation)) = relation {
            if len == 2 {
                chars.next();
            }
            found.push((i, len, relation));
        }
    }
    found
}

/// Body captured by a declaration pattern, possibly empty, unless it starts with `=`.
fn declaration_body<'t>(pattern: &Regex, text: &'t str, group: usize) -> Option<&'t str> {
    let body = pattern.captures(text)?.get(group)?.as_str();
    (!body.starts_with('=')).then_some(body)
}

/// Classifies equations and compiles them with the given evaluator.
pub struct EquationClassifier<'e> {
    evaluator: &'e dyn ExpressionEvaluator,
}

impl Default for EquationClassifier<'static> {
    fn default() -> Self {
        static SYMBOLIC: SymbolicEvaluator = SymbolicEvaluator;
        EquationClassifier {
            evaluator: &SYMBOLIC,
        }
    }
}

impl<'e> EquationClassifier<'e> {
    pub fn new(evaluator: &'e dyn ExpressionEvaluator) -> Self {
        Self { evaluator }
    }

    /// Classifies one line of raw input. Never fails: problems come back as
    /// [`Classification::Invalid`].
    pub fn classify(&self, raw_input: &str) -> Classification {
        let text = raw_input.trim();
        let result = if text.is_empty() {
            Classification::Invalid {
                family: None,
                error: classification_error(raw_input, "empty input"),
            }
        } else if let Some((x_expr, y_expr)) = Self::parametric_parts(text) {
            self.finish(Family::Parametric, self.parametric(x_expr, y_expr))
        } else if let Some(body) = declaration_body(&POLAR_DECL, text, 1) {
            self.finish(Family::Polar, self.polar(text, body))
        } else {
            let relations = find_relations(text);
            if !relations.is_empty() {
                self.finish(Family::Inequality, self.inequality(text, &relations))
            } else {
                self.equality_or_explicit(text)
            }
        };
        match &result {
            Classification::Valid(eq) => debug!("`{}` classified as {}", text, eq.family()),
            Classification::Invalid { family, error } => {
                debug!("`{}` rejected ({:?}): {}", text, family, error)
            }
        }
        result
    }

    fn finish(
        &self,
        family: Family,
        outcome: Result<ClassifiedEquation, PlotError>,
    ) -> Classification {
        match outcome {
            Ok(eq) => Classification::Valid(eq),
            Err(error) => Classification::Invalid {
                family: Some(family),
                error,
            },
        }
    }

    fn compile(&self, input: &str, expression: &str, vars: &[&str]) -> Result<Box<dyn CompiledExpr>, PlotError> {
        if expression.trim().is_empty() {
            return Err(classification_error(input, "missing expression"));
        }
        self.evaluator.compile(expression, vars)
    }

    /// x and y expressions when the text is exactly two `x(t)=` / `y(t)=` declarations
    fn parametric_parts(text: &str) -> Option<(&str, &str)> {
        let parts: Vec<&str> = split_top_level(text, &[';', ','])
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.len() != 2 {
            return None;
        }
        let mut x_expr = None;
        let mut y_expr = None;
        for part in parts {
            let caps = PARAMETRIC_DECL.captures(part)?;
            let body = declaration_body(&PARAMETRIC_DECL, part, 2)?;
            match caps.get(1).map(|m| m.as_str()) {
                Some("x") if x_expr.is_none() => x_expr = Some(body),
                Some("y") if y_expr.is_none() => y_expr = Some(body),
                _ => return None,
            }
        }
        Some((x_expr?, y_expr?))
    }

    fn parametric(&self, x_expr: &str, y_expr: &str) -> Result<ClassifiedEquation, PlotError> {
        Ok(ClassifiedEquation::Parametric {
            x: self.compile(x_expr, x_expr, &PARAMETRIC_VARS)?,
            y: self.compile(y_expr, y_expr, &PARAMETRIC_VARS)?,
        })
    }

    fn polar(&self, text: &str, body: &str) -> Result<ClassifiedEquation, PlotError> {
        Ok(ClassifiedEquation::Polar {
            r: self.compile(text, body, &POLAR_VARS)?,
        })
    }

    fn inequality(
        &self,
        text: &str,
        relations: &[(usize, usize, Relation)],
    ) -> Result<ClassifiedEquation, PlotError> {
        let &[(at, len, op)] = relations else {
            return Err(classification_error(
                text,
                "chained comparisons are not supported",
            ));
        };
        let (lhs, rhs) = (&text[..at], &text[at + len..]);
        if lhs.contains('=') || rhs.contains('=') {
            return Err(classification_error(text, "mixed `=` and comparison"));
        }
        Ok(ClassifiedEquation::Inequality {
            lhs: self.compile(text, lhs, &PLANE_VARS)?,
            rhs: self.compile(text, rhs, &PLANE_VARS)?,
            op,
        })
    }

    fn equality_or_explicit(&self, text: &str) -> Classification {
        let sides: Vec<&str> = text.split('=').collect();
        match sides.as_slice() {
            [body] => self.finish(
                Family::Explicit,
                self.compile(text, body, &EXPLICIT_VARS)
                    .map(|f| ClassifiedEquation::Explicit { f }),
            ),
            [lhs, rhs] => {
                if EXPLICIT_LHS.is_match(lhs.trim()) {
                    match self.compile(text, rhs, &EXPLICIT_VARS) {
                        Ok(f) => return Classification::Valid(ClassifiedEquation::Explicit { f }),
                        // `y = ... y ...` is an implicit relation after all
                        Err(PlotError::UnknownVariable { name, .. }) if name == "y" => {}
                        Err(error) => {
                            return Classification::Invalid {
                                family: Some(Family::Explicit),
                                error,
                            };
                        }
                    }
                }
                self.finish(Family::Implicit, self.implicit(text, lhs, rhs))
            }
            _ => Classification::Invalid {
                family: Some(Family::Implicit),
                error: classification_error(text, "more than one `=`"),
            },
        }
    }

    fn implicit(&self, text: &str, lhs: &str, rhs: &str) -> Result<ClassifiedEquation, PlotError> {
        if lhs.trim().is_empty() || rhs.trim().is_empty() {
            return Err(classification_error(text, "missing side of `=`"));
        }
        let difference = format!("({}) - ({})", lhs.trim(), rhs.trim());
        Ok(ClassifiedEquation::Implicit {
            g: self.compile(text, &difference, &PLANE_VARS)?,
        })
    }
}

/// Classifies with the default symbolic evaluator.
pub fn classify(raw_input: &str) -> Classification {
    EquationClassifier::default().classify(raw_input)
}
