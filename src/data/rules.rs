//! Structural rewrite rules
//!
//! Forward rules are regex rewrites applied globally in descending priority.
//! Environment and fraction rules fire before decorations, which fire before
//! the generic sub/superscript brace stripping; running the script rules
//! first would break the braces inside `\frac{}{}` arguments.
//!
//! The inverse direction does not use regexes. Typst function calls are
//! matched by a bracket-balancing scanner and expanded through
//! [`FUNCTION_FORMS`].

use std::cmp::Reverse;

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;

/// A pattern → template rewrite with a priority.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub pattern: Regex,
    /// Replacement template, `${n}` refers to capture group `n`.
    pub replacement: &'static str,
    pub priority: i32,
}

impl RewriteRule {
    pub fn new(pattern: Regex, replacement: &'static str, priority: i32) -> Self {
        Self {
            pattern,
            replacement,
            priority,
        }
    }
}

/// Rules sorted once by descending priority; ties keep declaration order.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    pub fn new(mut rules: Vec<RewriteRule>) -> Self {
        rules.sort_by_key(|rule| Reverse(rule.priority));
        Self { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn rule(pattern: &str, replacement: &'static str, priority: i32) -> RewriteRule {
    RewriteRule::new(Regex::new(pattern).unwrap(), replacement, priority)
}

lazy_static! {
    pub static ref LATEX_RULES: RuleSet = RuleSet::new(vec![
        rule(
            r"(?s)\\begin\{equation\*?\}(.*?)\\end\{equation\*?\}",
            "$$ ${1} $$",
            100,
        ),
        rule(r"\\frac\{(.*?)\}\{(.*?)\}", " frac(${1}, ${2}) ", 100),
        rule(r"\\text\{(.*?)\}", "\"${1}\"", 95),
        rule(r"\\boldsymbol\{(.*?)\}", "bold(${1})", 90),
        rule(r"\\bar\{(.*?)\}", "overline(${1})", 80),
        rule(r"\\hat\{(.*?)\}", "hat(${1})", 80),
        rule(r"\\tilde\{(.*?)\}", "tilde(${1})", 80),
        rule(r"\\vec\{(.*?)\}", "arrow(${1})", 80),
        rule(r"\\dot\{(.*?)\}", "dot(${1})", 80),
        rule(r"\\sqrt\[(.*?)\]\{(.*?)\}", "root(${1}, ${2})", 75),
        rule(r"\\sqrt\{(.*?)\}", "sqrt(${1})", 70),
        rule(r"_\{(.*?)\}", "_(${1})", 20),
        rule(r"\^\{(.*?)\}", "^(${1})", 20),
    ]);
}

/// Commands consumed by [`LATEX_RULES`]; not reported as unrecognized.
pub const RULE_COMMANDS: &[&str] = &[
    r"\begin",
    r"\end",
    r"\frac",
    r"\text",
    r"\boldsymbol",
    r"\bar",
    r"\hat",
    r"\tilde",
    r"\vec",
    r"\dot",
    r"\sqrt",
];

/// A Typst call with a fixed LaTeX template. `$1`, `$2` are the arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionForm {
    pub arity: usize,
    pub template: &'static str,
}

/// Inverse of the structural forward rules, keyed by Typst function name.
pub static FUNCTION_FORMS: phf::Map<&'static str, FunctionForm> = phf_map! {
    "frac" => FunctionForm { arity: 2, template: r"\frac{$1}{$2}" },
    "bold" => FunctionForm { arity: 1, template: r"\boldsymbol{$1}" },
    "overline" => FunctionForm { arity: 1, template: r"\bar{$1}" },
    "hat" => FunctionForm { arity: 1, template: r"\hat{$1}" },
    "tilde" => FunctionForm { arity: 1, template: r"\tilde{$1}" },
    "arrow" => FunctionForm { arity: 1, template: r"\vec{$1}" },
    "dot" => FunctionForm { arity: 1, template: r"\dot{$1}" },
    "root" => FunctionForm { arity: 2, template: r"\sqrt[$1]{$2}" },
    "sqrt" => FunctionForm { arity: 1, template: r"\sqrt{$1}" },
};

impl FunctionForm {
    /// Substitute `$n` placeholders in one pass, so argument text is never rescanned.
    pub fn expand(&self, args: &[String]) -> String {
        let capacity = self.template.len() + args.iter().map(String::len).sum::<usize>();
        let mut out = String::with_capacity(capacity);
        let mut chars = self.template.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '$' {
                if let Some(index) = chars.peek().and_then(|d| d.to_digit(10)) {
                    chars.next();
                    let slot = (index as usize).checked_sub(1);
                    if let Some(arg) = slot.and_then(|i| args.get(i)) {
                        out.push_str(arg);
                    }
                    continue;
                }
            }
            out.push(c);
        }
        out
    }
}
