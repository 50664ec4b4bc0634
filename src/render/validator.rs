//! Typst equation validation
//!
//! A static parse with `typst-syntax` catches syntax errors without
//! spawning anything; equations that parse are then compiled for real.

use serde::Serialize;
use typst_syntax::parse_math;

use crate::render::compiler::TypstCompiler;
use crate::utils::error::{ConversionError, ConversionResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Parser messages or the compiler's stderr; empty when valid.
    pub diagnostics: String,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            diagnostics: String::new(),
        }
    }

    pub fn invalid(diagnostics: impl Into<String>) -> Self {
        Self {
            valid: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// Syntax errors reported by the Typst math parser.
pub fn syntax_errors(equation: &str) -> Vec<String> {
    parse_math(strip_math_delimiters(equation))
        .errors()
        .into_iter()
        .map(|error| error.message.to_string())
        .collect()
}

/// Validate a Typst equation.
///
/// A rejected equation is a report, not an error; `Err` means validation
/// could not run at all (e.g. the compiler is missing).
pub fn validate(compiler: &TypstCompiler, equation: &str) -> ConversionResult<ValidationReport> {
    let errors = syntax_errors(equation);
    if !errors.is_empty() {
        return Ok(ValidationReport::invalid(errors.join("\n")));
    }

    match compiler.check(equation) {
        Ok(()) => Ok(ValidationReport::valid()),
        Err(ConversionError::ExternalToolFailure { diagnostics }) => {
            Ok(ValidationReport::invalid(diagnostics))
        }
        Err(other) => Err(other),
    }
}

fn strip_math_delimiters(equation: &str) -> &str {
    let trimmed = equation.trim();
    trimmed
        .strip_prefix('$')
        .and_then(|inner| inner.strip_suffix('$'))
        .unwrap_or(trimmed)
}
