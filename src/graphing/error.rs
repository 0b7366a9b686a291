//! Error types for the graphing core
//!
//! Every error here is recovered locally: an equation row that fails to classify or
//! compile is flagged and skipped, a sample that fails to evaluate becomes a gap.
//! Nothing is fatal to a plotting session.

/// Errors that can occur while classifying, compiling, configuring or drawing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlotError {
    /// The raw input matches no equation family, or a required piece is missing.
    #[error("cannot classify `{input}`: {reason}")]
    Classification {
        /// The offending input text
        input: String,
        /// What was missing or malformed
        reason: String,
    },

    /// An expression is syntactically invalid.
    #[error("cannot parse `{input}`: {message}")]
    Parse {
        /// The expression text handed to the parser
        input: String,
        /// Parser diagnostic
        message: String,
    },

    /// An expression references a variable the equation family does not bind.
    #[error("unknown variable `{name}`, expected one of {allowed:?}")]
    UnknownVariable {
        /// Name found in the expression
        name: String,
        /// Names bound by the family
        allowed: Vec<String>,
    },

    /// The drawing surface rejected a drawing call.
    #[error("drawing surface error: {0}")]
    Surface(String),

    /// A configuration document is malformed or holds an out-of-range value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A viewport would become degenerate (empty, inverted or beyond the extent bounds).
    #[error("degenerate viewport: {0}")]
    InvalidViewport(String),

    /// No registry entry has the given id.
    #[error("no equation with id {0}")]
    UnknownEntry(u64),
}

/// Per-sample evaluation failure. Never escapes the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The result is NaN: outside the domain of some function (ln(-1), asin(2), 0/0).
    #[error("argument outside the function domain")]
    Domain,

    /// The result is infinite (1/0, exp overflow).
    #[error("result is not finite")]
    NonFinite,
}

/// Convenience alias used throughout the graphing core
pub type Result<T> = std::result::Result<T, PlotError>;
