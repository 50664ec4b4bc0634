//! tex2typ - bidirectional LaTeX ↔ Typst equation converter
//!
//! The forward direction (LaTeX → Typst) is a rule-ordered text rewriter:
//! symbol substitution, then structural rewrite rules by descending priority,
//! then post-processing. The inverse direction (Typst → LaTeX) balances
//! brackets so nested function-style constructs invert correctly.
//!
//! # Example
//!
//! ```
//! use tex2typ::{latex_to_typst, typst_to_latex};
//!
//! assert_eq!(latex_to_typst(r"\frac{1}{2}").unwrap(), "frac(1, 2)");
//! assert_eq!(typst_to_latex("frac(1, 2)").unwrap(), r"\frac{1}{2}");
//! ```
//!
//! Rendering and validation go through the external `typst` compiler; see
//! [`render`].

pub mod config;
pub mod core;
pub mod data;
pub mod render;
pub mod utils;

use serde::Serialize;

pub use crate::core::latex2typst::{L2TOptions, LatexConverter};
pub use crate::core::postprocess::{postprocess, PostProcessOptions};
pub use crate::core::typst2latex::{T2LOptions, TypstConverter, MAX_NESTING_DEPTH};
pub use config::Config;
pub use utils::error::{ConversionError, ConversionOutput, ConversionResult, ConversionWarning};

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    LatexToTypst,
    TypstToLatex,
}

impl Direction {
    pub fn from_reverse_flag(reverse: bool) -> Self {
        if reverse {
            Direction::TypstToLatex
        } else {
            Direction::LatexToTypst
        }
    }
}

/// Convert a LaTeX equation to Typst.
pub fn latex_to_typst(input: &str) -> ConversionResult<String> {
    latex_to_typst_with_options(input, L2TOptions::default())
}

pub fn latex_to_typst_with_options(input: &str, options: L2TOptions) -> ConversionResult<String> {
    LatexConverter::new(options)?.convert(input)
}

/// Convert a LaTeX equation, keeping warnings for commands with no mapping.
pub fn latex_to_typst_with_report(
    input: &str,
    options: L2TOptions,
) -> ConversionResult<ConversionOutput> {
    LatexConverter::new(options)?.convert_with_report(input)
}

/// Convert a Typst equation to LaTeX.
pub fn typst_to_latex(input: &str) -> ConversionResult<String> {
    TypstConverter::shared()?.convert(input)
}

pub fn typst_to_latex_with_options(input: &str, options: T2LOptions) -> ConversionResult<String> {
    TypstConverter::new(options)?.convert(input)
}

/// Convert in the given direction with default options.
pub fn convert(input: &str, direction: Direction) -> ConversionResult<String> {
    match direction {
        Direction::LatexToTypst => latex_to_typst(input),
        Direction::TypstToLatex => typst_to_latex(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_dispatches_on_direction() {
        assert_eq!(
            convert(r"\alpha", Direction::LatexToTypst).unwrap(),
            "alpha"
        );
        assert_eq!(
            convert("alpha", Direction::TypstToLatex).unwrap(),
            r"\alpha"
        );
    }

    #[test]
    fn test_direction_serializes_kebab_case() {
        let json = serde_json::to_string(&Direction::TypstToLatex).unwrap();
        assert_eq!(json, "\"typst-to-latex\"");
        assert_eq!(
            Direction::from_reverse_flag(false),
            Direction::LatexToTypst
        );
    }
}
