use snafu::Snafu;

use crate::object::Object;
use crate::token::Token;

/// Every error kind the pipeline can surface, plus the two non-local
/// control-flow signals (`Return`, `Break`) riding the same `Result` channel
/// — the Rust expression of "non-local control flow via exceptions" (spec
/// §9 Design Notes).
#[derive(Debug, Snafu)]
pub enum LoxError {
    #[snafu(display("[line {line}] Error {whence}: {message}"))]
    Parsing { line: usize, whence: String, message: String },

    #[snafu(display("IO error"))]
    Io { source: std::io::Error },

    #[snafu(display("Could not read source file at '{path}'"))]
    File { source: std::io::Error, path: String },

    #[snafu(display("One or more errors during parsing"))]
    Fatal,

    #[snafu(display("{expected}\n[line {}]", token.line))]
    Runtime { found: String, expected: String, token: Token },

    #[snafu(display("Internal error: {message}"))]
    Internal { message: String },

    /// Not a user-facing error: carries a `return` statement's value up to
    /// the enclosing function call. Must be caught by `LoxFunction::call`;
    /// escaping to the top level is an implementation bug.
    #[snafu(display("uncaught return (interpreter bug)"))]
    Return { value: Object },

    /// Not a user-facing error: signals a `break` up to the nearest
    /// enclosing `while`. Must be caught there; escaping to the top level is
    /// an implementation bug.
    #[snafu(display("uncaught break (interpreter bug)"))]
    Break,

    #[snafu(whatever, display("Static analysis failed: {message}, {source:?}, {loc}"))]
    Resolver {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
        #[snafu(implicit)]
        loc: snafu::Location,
    },
}

pub type Result<T> = std::result::Result<T, LoxError>;
