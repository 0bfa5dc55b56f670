use colored::Colorize;
use thiserror::Error;

use crate::object::Object;
use crate::token::{Location, Token, Type};

static mut HAD_ERROR: bool = false;
static mut HAD_RUNTIME_ERROR: bool = false;

/// Whether any diagnostic has been thrown since the last [`reset`].
pub fn did_error() -> bool {
    unsafe { HAD_ERROR || HAD_RUNTIME_ERROR }
}

/// Whether a runtime error specifically has been thrown.
pub fn did_runtime_error() -> bool {
    unsafe { HAD_RUNTIME_ERROR }
}

/// Clears the error flags. Used between REPL lines so one bad
/// expression doesn't poison the rest of the session.
pub fn reset() {
    unsafe {
        HAD_ERROR = false;
        HAD_RUNTIME_ERROR = false;
    }
}

/// The process exit code this run should terminate with: 0 on
/// success, 65 for a static (scan/parse/resolve) error, 70 for a
/// runtime error. Mirrors the usage/data-error split in `sysexits.h`.
pub fn exit_code() -> i32 {
    unsafe {
        if HAD_RUNTIME_ERROR {
            70
        } else if HAD_ERROR {
            65
        } else {
            0
        }
    }
}

/// Shared behavior for every diagnostic kind the pipeline can raise.
/// `throw` prints the diagnostic and flips the relevant process-wide
/// error flag; it is the only place that mutates that flag.
pub trait Diagnostic {
    fn throw(&self);
}

/// Raised by the scanner: unterminated strings/numbers, stray
/// characters that aren't part of any token.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl Diagnostic for ScanError {
    fn throw(&self) {
        eprintln!(
            "{}",
            format!("[line {}] Error: {}", self.location, self.message).yellow()
        );

        unsafe {
            HAD_ERROR = true;
        }
    }
}

/// Raised by the parser when a production can't be completed; the
/// parser synchronizes to the next statement boundary and keeps going.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Diagnostic for ParseError {
    fn throw(&self) {
        let location = if self.token.r#type == Type::EOF {
            format!("[line {}] Error at end: {}", self.token.location, self.message)
        } else {
            format!(
                "[line {}] Error at '{}': {}",
                self.token.location, self.token.lexeme, self.message
            )
        };

        eprintln!("{}", location.yellow());

        unsafe {
            HAD_ERROR = true;
        }
    }
}

/// Raised by the resolver: static scoping violations that are
/// syntactically valid but semantically nonsensical (`return` at top
/// level, `this` outside a class, a redeclared local, ...).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Diagnostic for ResolveError {
    fn throw(&self) {
        eprintln!(
            "{}",
            format!(
                "[line {}] Error at '{}': {}",
                self.token.location, self.token.lexeme, self.message
            )
            .magenta()
        );

        unsafe {
            HAD_ERROR = true;
        }
    }
}

/// Raised by the evaluator while walking the AST; aborts the program.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Diagnostic for RuntimeError {
    fn throw(&self) {
        eprintln!(
            "{}",
            format!(
                "[line {}] Error at '{}': {}",
                self.token.location, self.token.lexeme, self.message
            )
            .red()
        );

        unsafe {
            HAD_RUNTIME_ERROR = true;
        }
    }
}

/// Not a diagnostic: a `return` statement unwinds the evaluator by
/// propagating this variant up through the same result type ordinary
/// runtime errors travel through. Call dispatch is the only place
/// that catches it; it must never reach the top-level driver.
#[derive(Debug)]
pub struct ReturnSignal {
    pub value: Object,
}

/// Everything the evaluator can produce while walking an expression or
/// statement: either a genuine runtime error, or a `return` unwind in
/// flight. Kept separate from [`RuntimeError`] so a stray `Unwind` can
/// never be mistaken for a reportable diagnostic.
#[derive(Debug)]
pub enum Unwind {
    Error(RuntimeError),
    Return(ReturnSignal),
}

impl From<RuntimeError> for Unwind {
    fn from(value: RuntimeError) -> Self {
        Unwind::Error(value)
    }
}
