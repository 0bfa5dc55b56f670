//! Loxi is a tree-walking interpreter for Lox, the small dynamically
//! typed language from Bob Nystrom's *Crafting Interpreters*. Lox has
//! lexical scoping, first-class functions and closures, and
//! single-inheritance classes.
//!
//! A program passes through four stages, each implemented in its own
//! module and each able to stop the pipeline by raising a diagnostic:
//!
//! - [`scanner`] turns source text into a flat list of [`token::Token`]s,
//!   reporting [`error::ScanError`] for things like unterminated
//!   strings and stray characters.
//! - [`parser`] turns tokens into an AST ([`expr::Expr`] / [`stmt::Stmt`]),
//!   reporting [`error::ParseError`] and recovering at statement
//!   boundaries so more than one mistake can be reported per run.
//! - [`resolver`] walks the AST once before evaluation to bind every
//!   variable use to the number of enclosing scopes between it and its
//!   declaration, so closures get lexical rather than dynamic scoping.
//!   Reports [`error::ResolveError`] for things like reading a local in
//!   its own initializer or using `this` outside a class.
//! - [`interpreter`] walks the resolved AST and evaluates it, reporting
//!   [`error::RuntimeError`] for type mismatches, arity mismatches and
//!   the like, and aborting the program on the first one.
//!
//! [`Lox`] wires the four stages together for both one-shot script
//! execution and an interactive REPL.

use std::fs;
use std::path::Path;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info, info_span, warn};

pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

const HISTORY_FILE: &str = ".loxi_history";

/// Runs Lox source through the scanner/parser/resolver/interpreter
/// pipeline. Owns a single [`Interpreter`] across its lifetime, so a
/// REPL session's global variables, functions and classes persist from
/// one line to the next.
pub struct Lox {
    interpreter: Interpreter,
}

impl Lox {
    pub fn new() -> Self {
        Lox { interpreter: Interpreter::new() }
    }

    /// Builds a `Lox` whose `print` statements write to `output`
    /// instead of stdout. Used by the integration test harness to
    /// capture a fixture script's output in-process.
    pub fn with_output(output: Box<dyn std::io::Write>) -> Self {
        Lox { interpreter: Interpreter::with_output(output) }
    }

    /// Executes the script at `path` and returns the process exit
    /// code: `0` on success, `65` for a scan/parse/resolve error, `70`
    /// for a runtime error, `64` if the file can't be read.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> i32 {
        let path = path.as_ref();

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("Failed to read '{}': {err}", path.display());
                return 64;
            }
        };

        info!(path = %path.display(), "running script");
        self.run(&source);
        error::exit_code()
    }

    /// Runs an interactive prompt until EOF (Ctrl-D) or an interrupt
    /// (Ctrl-C). Diagnostics from one line never carry over to the
    /// next: [`error::reset`] clears the flags after every line.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("readline editor to initialize");
        let history_path = home::home_dir().map(|home| home.join(HISTORY_FILE));

        if let Some(path) = &history_path {
            if editor.load_history(path).is_err() {
                debug!("no previous REPL history to load");
            }
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    error::reset();
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => {
                    warn!(%err, "readline error, ending session");
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            if let Err(err) = editor.save_history(path) {
                warn!(%err, "failed to save REPL history");
            }
        }
    }

    fn run(&mut self, source: &str) {
        let _span = info_span!("run").entered();

        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();
        debug!(count = tokens.len(), "scanned tokens");
        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();
        debug!(count = statements.len(), "parsed statements");
        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);
        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}
