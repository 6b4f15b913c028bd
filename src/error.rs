//! Diagnostic error types for the knowledge base.
//!
//! Only genuinely exceptional conditions surface here: malformed input text
//! and file-loading problems. Failed unification, refused retraction, and
//! invalid queries are normal negative outcomes inside the engine and never
//! become errors (the query path reports the condition and returns an empty
//! answer set instead).

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the seshat knowledge base.
#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to read knowledge base file {path}")]
    #[diagnostic(
        code(seshat::kb::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("unbalanced parentheses in '{input}'")]
    #[diagnostic(
        code(seshat::parse::unbalanced),
        help("Every '(' must have a matching ')'.")
    )]
    Unbalanced { input: String },

    #[error("unexpected token '{token}' in '{input}'")]
    #[diagnostic(
        code(seshat::parse::unexpected_token),
        help("A statement is a parenthesized list, e.g. '(isa Fido Dog)'.")
    )]
    UnexpectedToken { token: String, input: String },

    #[error("empty statement '()' in '{input}'")]
    #[diagnostic(
        code(seshat::parse::empty_statement),
        help("A statement needs at least a predicate, e.g. '(sunny)'.")
    )]
    EmptyStatement { input: String },

    #[error("variable is missing a name in '{input}'")]
    #[diagnostic(
        code(seshat::parse::unnamed_variable),
        help("Variables are written '?' followed by a name, e.g. '?x'.")
    )]
    UnnamedVariable { input: String },

    #[error("trailing input after statement: '{rest}'")]
    #[diagnostic(
        code(seshat::parse::trailing_input),
        help("Only one statement is allowed here; remove the extra tokens.")
    )]
    TrailingInput { rest: String },

    #[error("expected a statement, got '{input}'")]
    #[diagnostic(
        code(seshat::parse::not_a_statement),
        help(
            "Facts, antecedents, and consequents must be parenthesized \
             statements, not bare atoms or variables."
        )
    )]
    NotAStatement { input: String },

    #[error("rule is missing the '->' separator: '{input}'")]
    #[diagnostic(
        code(seshat::parse::missing_arrow),
        help("A rule is written '((antecedent) ...) -> (consequent)'.")
    )]
    MissingArrow { input: String },

    #[error("line must start with 'fact:' or 'rule:': '{line}'")]
    #[diagnostic(
        code(seshat::parse::unknown_directive),
        help("Knowledge base files contain 'fact:' and 'rule:' lines; '#' starts a comment.")
    )]
    UnknownDirective { line: String },

    #[error("parse error at line {line}")]
    #[diagnostic(code(seshat::parse::at_line))]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

/// Convenience alias for functions returning seshat results.
pub type KbResult<T> = std::result::Result<T, KbError>;
