//! Static conversion data: the symbol table and the rewrite rules.

pub mod rules;
pub mod symbols;

pub use rules::{FunctionForm, RewriteRule, RuleSet, FUNCTION_FORMS, LATEX_RULES};
pub use symbols::{Notation, SymbolTable, LATEX_TO_TYPST, SYMBOL_TABLE};
