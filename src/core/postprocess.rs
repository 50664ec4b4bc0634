//! Cosmetic cleanup applied after the rewrite rules
//!
//! Every pass here is idempotent, and so is the composition: delimiter
//! stripping runs first because removing a `$` can place a token right
//! next to a caret, which the overline fix then has to see.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `x^(¯)` and friends: a token followed by a superscripted overline glyph.
    static ref OVERLINE_ARTIFACT: Regex =
        Regex::new(r"(\w+)\^\((?:\x{00AF}|\x{203E}|\x{0305}|macron)\)").unwrap();
    static ref HORIZONTAL_SPACE_RUN: Regex = Regex::new(r"[ \t]{2,}").unwrap();
}

/// Options for [`postprocess`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostProcessOptions {
    /// Remove `$` math delimiters to return a bare expression.
    pub strip_delimiters: bool,
}

/// Run all post-processing passes.
pub fn postprocess(input: &str, options: &PostProcessOptions) -> String {
    let stripped;
    let text = if options.strip_delimiters {
        stripped = strip_unescaped_dollars(input);
        stripped.as_str()
    } else {
        input
    };
    let fixed = fix_overline_artifacts(text);
    normalize_whitespace(&fixed)
}

/// Rewrite `token^(¯)` to `overline(token)`.
pub fn fix_overline_artifacts(input: &str) -> String {
    OVERLINE_ARTIFACT
        .replace_all(input, "overline(${1})")
        .into_owned()
}

/// Drop every `$` not preceded by an odd number of backslashes.
pub fn strip_unescaped_dollars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut backslashes = 0usize;

    for ch in input.chars() {
        if ch == '\\' {
            backslashes += 1;
            out.push(ch);
            continue;
        }

        if ch == '$' && backslashes % 2 == 0 {
            backslashes = 0;
            continue;
        }

        out.push(ch);
        backslashes = 0;
    }

    out
}

/// Collapse runs of spaces and tabs, then trim.
pub fn normalize_whitespace(input: &str) -> String {
    HORIZONTAL_SPACE_RUN
        .replace_all(input, " ")
        .trim()
        .to_string()
}
