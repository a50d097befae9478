//! The four pipeline modes exposed by the CLI, over in‑memory source text.
//!
//! Each mode writes normal output to `out`, diagnostics to `err` (one per
//! line), and returns a [`Status`] that the binary maps to a process exit
//! code.  Static diagnostics from every stage are collected and reported
//! together; a program with any static error is never executed.

use std::io::{self, Write};

use log::{debug, info};

use crate::ast_printer::AstPrinter;
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// A scan, parse, or resolution error was reported.
    StaticError,
    /// Execution stopped on a runtime error.
    RuntimeError,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::StaticError => 65,
            Status::RuntimeError => 70,
        }
    }
}

/// Print every token, one per line.  Scan errors go to `err` as they are
/// met; scanning carries on past them.
pub fn tokenize<O: Write, E: Write>(
    source: &str,
    json: bool,
    out: &mut O,
    err: &mut E,
) -> Result<Status> {
    info!("Running tokenize");

    let mut status: Status = Status::Success;

    for result in Scanner::new(source) {
        match result {
            Ok(token) if json => {
                serde_json::to_writer(&mut *out, &token).map_err(io::Error::from)?;
                writeln!(out)?;
            }

            Ok(token) => writeln!(out, "{}", token)?,

            Err(e) => {
                debug!("Tokenization error: {}", e);
                writeln!(err, "{}", e)?;
                status = Status::StaticError;
            }
        }
    }

    Ok(status)
}

/// Parse a single expression and print its S‑expression form.
pub fn parse<O: Write, E: Write>(source: &str, out: &mut O, err: &mut E) -> Result<Status> {
    info!("Running parse");

    let (tokens, mut errors) = Scanner::new(source).scan_tokens();
    let parsed = Parser::new(&tokens).parse_expression();

    match parsed {
        Ok(expr) if errors.is_empty() => {
            writeln!(out, "{}", AstPrinter::print(&expr))?;
            Ok(Status::Success)
        }

        Ok(_) => report(err, &errors),

        Err(parse_errors) => {
            errors.extend(parse_errors);
            report(err, &errors)
        }
    }
}

/// Parse a single expression, evaluate it, and print the value.
pub fn evaluate<O: Write, E: Write>(source: &str, out: &mut O, err: &mut E) -> Result<Status> {
    info!("Running evaluate");

    let (tokens, mut errors) = Scanner::new(source).scan_tokens();

    let expr = match Parser::new(&tokens).parse_expression() {
        Ok(expr) => expr,
        Err(parse_errors) => {
            errors.extend(parse_errors);
            return report(err, &errors);
        }
    };

    if !errors.is_empty() {
        return report(err, &errors);
    }

    let locals = match Resolver::new().resolve_expression(&expr) {
        Ok(locals) => locals,
        Err(resolve_errors) => return report(err, &resolve_errors),
    };

    let mut interpreter = Interpreter::with_output(&mut *out);
    interpreter.resolve(locals);

    let value = match interpreter.evaluate(&expr) {
        Ok(value) => value,
        Err(e) => return runtime_failure(err, e),
    };

    drop(interpreter);
    writeln!(out, "{}", value)?;

    Ok(Status::Success)
}

/// Scan, parse, resolve, and execute a whole program.
pub fn run<O: Write, E: Write>(source: &str, out: &mut O, err: &mut E) -> Result<Status> {
    info!("Running program");

    let (tokens, mut errors) = Scanner::new(source).scan_tokens();

    let statements = match Parser::new(&tokens).parse() {
        Ok(statements) => statements,
        Err(parse_errors) => {
            errors.extend(parse_errors);
            return report(err, &errors);
        }
    };

    if !errors.is_empty() {
        return report(err, &errors);
    }

    for stmt in &statements {
        debug!("Parsed statement: {}", AstPrinter::print_stmt(stmt));
    }

    let locals = match Resolver::new().resolve(&statements) {
        Ok(locals) => locals,
        Err(resolve_errors) => return report(err, &resolve_errors),
    };

    let mut interpreter = Interpreter::with_output(&mut *out);
    interpreter.resolve(locals);

    match interpreter.interpret(&statements) {
        Ok(()) => Ok(Status::Success),
        Err(e) => runtime_failure(err, e),
    }
}

fn report<E: Write>(err: &mut E, errors: &[LoxError]) -> Result<Status> {
    debug!("Reporting {} static error(s)", errors.len());

    for e in errors {
        writeln!(err, "{}", e)?;
    }

    Ok(Status::StaticError)
}

/// Runtime errors become a diagnostic and a status; I/O failures on the
/// output stream propagate.
fn runtime_failure<E: Write>(err: &mut E, error: LoxError) -> Result<Status> {
    match error {
        LoxError::Runtime { .. } => {
            debug!("Runtime error: {}", error);
            writeln!(err, "{}", error)?;
            Ok(Status::RuntimeError)
        }
        other => Err(other),
    }
}
