//! Typst to LaTeX converter
//!
//! The inverse converter mirrors the forward one: an inverted symbol table
//! runs first, then structure is rebuilt. Typst's function-call syntax is
//! not inverted with regexes; a bracket-balancing scanner matches each call
//! so nested constructs come back intact, up to [`MAX_NESTING_DEPTH`]
//! parenthesised levels.

pub mod math;

use lazy_static::lazy_static;
use log::debug;

use crate::core::postprocess::normalize_whitespace;
use crate::data::rules::FUNCTION_FORMS;
use crate::data::symbols::{SymbolTable, SYMBOL_TABLE};
use crate::utils::error::{ConversionError, ConversionResult};

use self::math::{substitute_symbols, MathScanner};

/// Deepest supported nesting of parenthesised constructs.
pub const MAX_NESTING_DEPTH: usize = 8;

/// Options for Typst → LaTeX conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct T2LOptions {
    /// Turn an input wrapped in `$ … $` into an `equation` environment.
    pub wrap_equation: bool,
}

impl Default for T2LOptions {
    fn default() -> Self {
        Self {
            wrap_equation: true,
        }
    }
}

/// Inverse converter owning the inverted symbol table.
#[derive(Debug, Clone)]
pub struct TypstConverter {
    symbols: SymbolTable,
    options: T2LOptions,
}

lazy_static! {
    static ref DEFAULT_CONVERTER: ConversionResult<TypstConverter> = SYMBOL_TABLE
        .as_ref()
        .map_err(Clone::clone)
        .and_then(|table| TypstConverter::from_forward_table(table, T2LOptions::default()));
}

impl TypstConverter {
    /// Converter over the built-in table.
    pub fn new(options: T2LOptions) -> ConversionResult<Self> {
        let mut converter = DEFAULT_CONVERTER.as_ref().map_err(Clone::clone)?.clone();
        converter.options = options;
        Ok(converter)
    }

    /// Shared converter with default options; built once.
    pub fn shared() -> ConversionResult<&'static TypstConverter> {
        DEFAULT_CONVERTER.as_ref().map_err(Clone::clone)
    }

    /// Invert a forward table. Fails fast if the inverse is ill-defined.
    pub fn from_forward_table(
        forward: &SymbolTable,
        options: T2LOptions,
    ) -> ConversionResult<Self> {
        let symbols = forward.inverted()?;
        let shadowed = symbols
            .iter()
            .find(|(ident, _)| FUNCTION_FORMS.contains_key(*ident));
        if let Some((ident, _)) = shadowed {
            return Err(ConversionError::invalid_table(format!(
                "'{}' is both a symbol and a function form",
                ident
            )));
        }
        Ok(Self { symbols, options })
    }

    pub fn options(&self) -> T2LOptions {
        self.options
    }

    /// Convert one equation.
    pub fn convert(&self, input: &str) -> ConversionResult<String> {
        let trimmed = input.trim();
        let (body, wrapped) = match unwrap_delimiters(trimmed) {
            Some(inner) if self.options.wrap_equation => (inner, true),
            _ => (trimmed, false),
        };

        let substituted = substitute_symbols(body, &self.symbols);
        let converted = MathScanner::new(&substituted).convert()?;
        let converted = normalize_whitespace(&converted);

        let result = if wrapped {
            format!(r"\begin{{equation}} {} \end{{equation}}", converted)
        } else {
            converted
        };

        debug!("typst2latex: {:?} -> {:?}", input, result);
        Ok(result)
    }
}

/// Inner text of `$ … $`, if the whole input is one delimited equation.
fn unwrap_delimiters(input: &str) -> Option<&str> {
    let inner = input.strip_prefix('$')?.strip_suffix('$')?;
    if inner.contains('$') {
        return None;
    }
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::symbols::Notation;
    use pretty_assertions::assert_eq;

    fn convert(input: &str) -> ConversionResult<String> {
        TypstConverter::shared().unwrap().convert(input)
    }

    #[test]
    fn test_fraction() {
        assert_eq!(convert("frac(1, 2)").unwrap(), r"\frac{1}{2}");
    }

    #[test]
    fn test_symbols_and_structure() {
        assert_eq!(
            convert("sum_(i=1)^n alpha_i times beta").unwrap(),
            r"\sum_{i=1}^n \alpha_i \times \beta"
        );
        assert_eq!(
            convert("frac(diff f, diff x)").unwrap(),
            r"\frac{\partial f}{\partial x}"
        );
        assert_eq!(
            convert("frac(partial f, partial x)").unwrap(),
            r"\frac{partial f}{partial x}"
        );
    }

    #[test]
    fn test_superscripts() {
        assert_eq!(convert("x^2 + y^2 = z^2").unwrap(), "x^2 + y^2 = z^2");
    }

    #[test]
    fn test_equation_wrapping() {
        assert_eq!(
            convert("$ E = m c^2 $").unwrap(),
            r"\begin{equation} E = m c^2 \end{equation}"
        );
        let bare = TypstConverter::new(T2LOptions {
            wrap_equation: false,
        })
        .unwrap();
        assert_eq!(bare.convert("$ x $").unwrap(), "$ x $");
    }

    #[test]
    fn test_errors_are_typed() {
        assert!(matches!(
            convert("frac(a, b"),
            Err(ConversionError::MalformedInput { .. })
        ));
        let depth = MAX_NESTING_DEPTH + 1;
        let deep = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(
            convert(&deep),
            Err(ConversionError::AmbiguousInverse { .. })
        ));
    }

    #[test]
    fn test_non_injective_table_fails_fast() {
        let forward = SymbolTable::new(
            &[(r"\le", "lt.eq"), (r"\leq", "lt.eq")],
            Notation::Latex,
            Notation::Typst,
        )
        .unwrap();
        let err = TypstConverter::from_forward_table(&forward, T2LOptions::default()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidTable { .. }));
    }

    #[test]
    fn test_symbol_shadowing_function_form_is_rejected() {
        let forward =
            SymbolTable::new(&[(r"\frac", "frac")], Notation::Latex, Notation::Typst).unwrap();
        assert!(TypstConverter::from_forward_table(&forward, T2LOptions::default()).is_err());
    }
}
