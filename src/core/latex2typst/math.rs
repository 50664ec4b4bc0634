//! Symbol and rule passes for LaTeX to Typst conversion

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

use crate::data::rules::{RuleSet, RULE_COMMANDS};
use crate::data::symbols::SymbolTable;
use crate::utils::error::{ConversionError, ConversionResult, ConversionWarning};

lazy_static! {
    /// `\\` (line break), `\letters`, or a spacing command.
    static ref LATEX_TOKEN: Regex = Regex::new(r"\\\\|\\[A-Za-z]+|\\[,:;]").unwrap();
}

/// Replace every known command in a single left-to-right scan.
///
/// A single space is inserted around a replacement when it would otherwise
/// touch a letter or digit, since `\alpha\beta` must not become `alphabeta`.
pub fn substitute_symbols(
    input: &str,
    symbols: &SymbolTable,
    warnings: &mut Vec<ConversionWarning>,
) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for m in LATEX_TOKEN.find_iter(input) {
        out.push_str(&input[last..m.start()]);
        last = m.end();
        let token = m.as_str();

        let Some(target) = symbols.get(token) else {
            if token != r"\\" && !RULE_COMMANDS.contains(&token) {
                warnings.push(ConversionWarning::passthrough(token, m.start()));
            }
            out.push_str(token);
            continue;
        };

        if out.chars().last().is_some_and(|c| c.is_alphanumeric()) {
            out.push(' ');
        }
        out.push_str(target);
        if needs_separator(&input[m.end()..]) {
            out.push(' ');
        }
    }

    out.push_str(&input[last..]);
    out
}

fn needs_separator(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_alphanumeric() => true,
        Some('\\') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// Apply every rule globally, highest priority first.
pub fn apply_rules(input: &str, rules: &RuleSet) -> String {
    let mut current = input.to_string();
    for rule in rules.iter() {
        let replaced = rule.pattern.replace_all(&current, rule.replacement);
        if let std::borrow::Cow::Owned(next) = replaced {
            trace!(
                "rule {:?} (priority {}) rewrote equation",
                rule.pattern.as_str(),
                rule.priority
            );
            current = next;
        }
    }
    current
}

/// Check that `{` and `}` pair up, ignoring escaped braces.
pub fn check_braces(input: &str) -> ConversionResult<()> {
    let mut open: Vec<usize> = Vec::new();
    let mut escaped = false;

    for (i, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' => open.push(i),
            '}' => {
                if open.pop().is_none() {
                    return Err(ConversionError::malformed_at("unexpected '}'", i));
                }
            }
            _ => {}
        }
    }

    match open.pop() {
        Some(pos) => Err(ConversionError::malformed_at("unclosed '{'", pos)),
        None => Ok(()),
    }
}
