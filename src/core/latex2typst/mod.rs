//! LaTeX to Typst converter
//!
//! This module implements the rule-based forward converter. Conversion runs
//! in three phases over the plain equation text:
//!
//! 1. symbol substitution (one whole-token scan over `\commands`)
//! 2. structural rewrite rules, highest priority first
//! 3. post-processing (overline artifacts, delimiters, whitespace)
//!
//! Malformed input is converted best-effort unless [`L2TOptions::strict`]
//! asks for a brace check up front.

pub mod math;

use log::debug;

use crate::core::postprocess::{postprocess, PostProcessOptions};
use crate::data::rules::{RuleSet, LATEX_RULES};
use crate::data::symbols::{SymbolTable, SYMBOL_TABLE};
use crate::utils::error::{ConversionOutput, ConversionResult};

/// Options for LaTeX → Typst conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2TOptions {
    /// Fail on unbalanced braces instead of converting best-effort.
    pub strict: bool,
    /// Strip `$` delimiters from the result.
    pub strip_delimiters: bool,
}

/// Forward converter over a symbol table and a rule set.
#[derive(Debug, Clone)]
pub struct LatexConverter<'a> {
    symbols: &'a SymbolTable,
    rules: &'a RuleSet,
    options: L2TOptions,
}

impl LatexConverter<'static> {
    /// Converter over the built-in tables.
    pub fn new(options: L2TOptions) -> ConversionResult<Self> {
        let symbols = SYMBOL_TABLE.as_ref().map_err(Clone::clone)?;
        Ok(Self::with_tables(symbols, &LATEX_RULES, options))
    }
}

impl<'a> LatexConverter<'a> {
    pub fn with_tables(symbols: &'a SymbolTable, rules: &'a RuleSet, options: L2TOptions) -> Self {
        Self {
            symbols,
            rules,
            options,
        }
    }

    pub fn options(&self) -> L2TOptions {
        self.options
    }

    /// Convert one equation.
    pub fn convert(&self, input: &str) -> ConversionResult<String> {
        self.convert_with_report(input).map(|output| output.content)
    }

    /// Convert one equation, collecting warnings for commands passed through.
    pub fn convert_with_report(&self, input: &str) -> ConversionResult<ConversionOutput> {
        if self.options.strict {
            math::check_braces(input)?;
        }

        let mut warnings = Vec::new();
        let substituted = math::substitute_symbols(input, self.symbols, &mut warnings);
        let rewritten = math::apply_rules(&substituted, self.rules);
        let content = postprocess(
            &rewritten,
            &PostProcessOptions {
                strip_delimiters: self.options.strip_delimiters,
            },
        );

        debug!(
            "latex2typst: {:?} -> {:?} ({} warnings)",
            input,
            content,
            warnings.len()
        );
        Ok(ConversionOutput::with_warnings(content, warnings))
    }
}
