//! Bracket-balancing scanner for Typst math
//!
//! Function-style constructs are matched by balancing parentheses rather
//! than by regex, so `frac(overline(x), frac(a, b))` inverts correctly.
//! Every parenthesised group counts as one nesting level; inputs deeper than
//! [`MAX_NESTING_DEPTH`] are rejected as ambiguous rather than guessed at.

use crate::data::rules::FUNCTION_FORMS;
use crate::data::symbols::{SymbolTable, TYPST_SHORTHANDS};
use crate::utils::error::{ConversionError, ConversionResult};

use super::MAX_NESTING_DEPTH;

/// Replace known identifiers and shorthands with LaTeX commands.
///
/// Identifiers are maximal dotted names (`arrow.r.double`), so `eta` is never
/// found inside `beta`. String literals and escapes are copied untouched.
pub fn substitute_symbols(input: &str, symbols: &SymbolTable) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 2);
    let mut i = 0;

    while i < input.len() {
        let rest = &input[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch == '"' {
            let end = string_end(input, i).unwrap_or(input.len());
            out.push_str(&input[i..end]);
            i = end;
            continue;
        }

        if ch == '\\' {
            let len = escape_len(rest);
            out.push_str(&rest[..len]);
            i += len;
            continue;
        }

        if ch.is_ascii_alphabetic() {
            let len = identifier_len(rest);
            let ident = &rest[..len];
            match symbols.get(ident) {
                Some(latex) => push_command(&mut out, latex, &rest[len..]),
                None => out.push_str(ident),
            }
            i += len;
            continue;
        }

        if let Some((short, latex)) = TYPST_SHORTHANDS
            .iter()
            .find(|(short, _)| rest.starts_with(short))
        {
            push_command(&mut out, latex, &rest[short.len()..]);
            i += short.len();
            continue;
        }

        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

fn push_command(out: &mut String, latex: &str, rest: &str) {
    out.push_str(latex);
    if latex.ends_with(|c: char| c.is_ascii_alphabetic())
        && rest.starts_with(|c: char| c.is_ascii_alphabetic())
    {
        out.push(' ');
    }
}

/// Byte length of the escape at the start of `s`: a backslash followed by a
/// run of letters (`\beta`) or by any single character (`\,`).
fn escape_len(s: &str) -> usize {
    let rest = &s[1..];
    let letters = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if letters > 0 {
        1 + letters
    } else {
        1 + rest.chars().next().map_or(0, char::len_utf8)
    }
}

/// Byte length of the dotted identifier at the start of `s`.
fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    loop {
        while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
            end += 1;
        }
        if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_alphabetic() {
            end += 1;
            continue;
        }
        return end;
    }
}

/// Byte offset just past the closing quote of the string starting at `start`.
fn string_end(input: &str, start: usize) -> Option<usize> {
    let mut escaped = false;
    for (offset, ch) in input[start + 1..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return Some(start + 1 + offset + 1),
            _ => {}
        }
    }
    None
}

/// Where a nested sequence stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// End of input
    End,
    /// The `)` closing a group
    Paren,
    /// A top-level `,` or the closing `)` of a call
    Argument,
}

/// Recursive scanner turning Typst structure into LaTeX.
pub struct MathScanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> MathScanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Convert the whole input.
    pub fn convert(mut self) -> ConversionResult<String> {
        self.sequence(0, Stop::End)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn sequence(&mut self, depth: usize, stop: Stop) -> ConversionResult<String> {
        let mut out = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                ')' => {
                    if stop == Stop::End {
                        return Err(ConversionError::malformed_at("unexpected ')'", self.pos));
                    }
                    return Ok(out);
                }
                ',' if stop == Stop::Argument => return Ok(out),
                '"' => out.push_str(&self.text()?),
                '\\' => self.escape(&mut out),
                '^' | '_' => {
                    self.bump();
                    out.push(ch);
                    self.script(depth, &mut out)?;
                }
                '(' => {
                    let inner = self.group(depth, "(")?;
                    out.push('(');
                    out.push_str(&inner);
                    out.push(')');
                }
                c if c.is_ascii_alphabetic() => self.identifier(depth, &mut out)?,
                _ => {
                    self.bump();
                    out.push(ch);
                }
            }
        }

        Ok(out)
    }

    /// `\cmd`, `\,` or an escaped character, copied verbatim.
    fn escape(&mut self, out: &mut String) {
        let start = self.pos;
        self.pos += escape_len(&self.src[start..]);
        out.push_str(&self.src[start..self.pos]);
    }

    /// `"text"` becomes `\text{text}`.
    fn text(&mut self) -> ConversionResult<String> {
        let start = self.pos;
        let end = string_end(self.src, start)
            .ok_or_else(|| ConversionError::malformed_at("unterminated string", start))?;
        self.pos = end;
        Ok(format!(r"\text{{{}}}", &self.src[start + 1..end - 1]))
    }

    /// The operand after `^` or `_`.
    ///
    /// Groups are always braced; any other operand is braced once it
    /// renders to more than one character.
    fn script(&mut self, depth: usize, out: &mut String) -> ConversionResult<()> {
        let operand = match self.peek() {
            Some('(') => {
                let inner = self.group(depth, "^(")?;
                out.push('{');
                out.push_str(inner.trim());
                out.push('}');
                return Ok(());
            }
            Some('"') => self.text()?,
            Some('\\') => {
                let mut escaped = String::new();
                self.escape(&mut escaped);
                escaped
            }
            Some(c) if c.is_ascii_digit() => self.number().to_string(),
            Some(c) if c.is_ascii_alphabetic() => {
                let mut converted = String::new();
                self.identifier(depth, &mut converted)?;
                converted
            }
            _ => return Ok(()),
        };

        if operand.chars().count() > 1 {
            out.push('{');
            out.push_str(&operand);
            out.push('}');
        } else {
            out.push_str(&operand);
        }
        Ok(())
    }

    /// Digits with an optional decimal part, e.g. `12` or `1.5`.
    fn number(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        self.skip_digits();
        if src[self.pos..].starts_with('.')
            && src[self.pos + 1..].starts_with(|c: char| c.is_ascii_digit())
        {
            self.bump();
            self.skip_digits();
        }
        &src[start..self.pos]
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    /// A balanced `( … )` group; returns the converted inside.
    fn group(&mut self, depth: usize, construct: &str) -> ConversionResult<String> {
        let open = self.enter(depth, construct)?;
        let inner = self.sequence(depth + 1, Stop::Paren)?;
        self.close(open)?;
        Ok(inner)
    }

    fn identifier(&mut self, depth: usize, out: &mut String) -> ConversionResult<()> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let name = &self.src[start..self.pos];

        let form = match FUNCTION_FORMS.get(name) {
            Some(form) if self.peek() == Some('(') => form,
            _ => {
                out.push_str(name);
                return Ok(());
            }
        };

        let open = self.enter(depth, name)?;
        let mut args = Vec::with_capacity(form.arity);
        loop {
            let arg = self.sequence(depth + 1, Stop::Argument)?;
            args.push(arg.trim().to_string());
            match self.bump() {
                Some(',') => continue,
                Some(')') => break,
                _ => return Err(ConversionError::malformed_at("unclosed '('", open)),
            }
        }

        if args.len() != form.arity {
            return Err(ConversionError::malformed_at(
                format!(
                    "{} expects {} argument{}, found {}",
                    name,
                    form.arity,
                    if form.arity == 1 { "" } else { "s" },
                    args.len()
                ),
                start,
            ));
        }

        out.push_str(&form.expand(&args));
        Ok(())
    }

    /// Consume `(` and enforce the nesting limit; returns the offset of `(`.
    fn enter(&mut self, depth: usize, construct: &str) -> ConversionResult<usize> {
        if depth + 1 > MAX_NESTING_DEPTH {
            return Err(ConversionError::ambiguous(construct, depth + 1));
        }
        let open = self.pos;
        self.bump();
        Ok(open)
    }

    fn close(&mut self, open: usize) -> ConversionResult<()> {
        match self.bump() {
            Some(')') => Ok(()),
            _ => Err(ConversionError::malformed_at("unclosed '('", open)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(input: &str) -> ConversionResult<String> {
        MathScanner::new(input).convert()
    }

    fn inverse_table() -> SymbolTable {
        SymbolTable::latex_to_typst().unwrap().inverted().unwrap()
    }

    #[test]
    fn symbols_match_whole_identifiers() {
        let table = inverse_table();
        assert_eq!(substitute_symbols("beta + zeta", &table), r"\beta + \zeta");
        assert_eq!(substitute_symbols("x in A", &table), r"x \in A");
        assert_eq!(substitute_symbols("arrow.r.double", &table), r"\Rightarrow");
        assert_eq!(substitute_symbols("arrow.r.long", &table), "arrow.r.long");
    }

    #[test]
    fn strings_are_not_substituted() {
        let table = inverse_table();
        assert_eq!(
            substitute_symbols(r#"x "if alpha" alpha"#, &table),
            r#"x "if alpha" \alpha"#
        );
    }

    #[test]
    fn escaped_commands_are_not_substituted() {
        let table = inverse_table();
        assert_eq!(substitute_symbols(r"\beta + beta", &table), r"\beta + \beta");
        assert_eq!(substitute_symbols(r"\, eta", &table), r"\, \eta");
    }

    #[test]
    fn shorthands_are_substituted() {
        let table = inverse_table();
        assert_eq!(substitute_symbols("a <= b", &table), r"a \leq b");
        assert_eq!(substitute_symbols("x->y", &table), r"x\rightarrow y");
        assert_eq!(substitute_symbols("p <=> q", &table), r"p \Leftrightarrow q");
    }

    #[test]
    fn function_forms() {
        assert_eq!(scan("frac(a, b)").unwrap(), r"\frac{a}{b}");
        assert_eq!(scan("overline(x)").unwrap(), r"\bar{x}");
        assert_eq!(scan("root(3, x + 1)").unwrap(), r"\sqrt[3]{x + 1}");
    }

    #[test]
    fn nested_function_forms() {
        assert_eq!(
            scan("frac(overline(x), frac(a, b))").unwrap(),
            r"\frac{\bar{x}}{\frac{a}{b}}"
        );
        assert_eq!(scan("overline(frac(1, 2))").unwrap(), r"\bar{\frac{1}{2}}");
    }

    #[test]
    fn plain_groups_and_calls_keep_parentheses() {
        assert_eq!(scan("f(a, b) (x + y)").unwrap(), "f(a, b) (x + y)");
        assert_eq!(scan("frac((a + b), c)").unwrap(), r"\frac{(a + b)}{c}");
    }

    #[test]
    fn scripts() {
        assert_eq!(scan("x^(a + b)").unwrap(), "x^{a + b}");
        assert_eq!(scan("x_(i)^2").unwrap(), "x_{i}^2");
        assert_eq!(scan("x^12").unwrap(), "x^{12}");
        assert_eq!(scan("x^n + y_1").unwrap(), "x^n + y_1");
        assert_eq!(scan("x^alpha").unwrap(), "x^{alpha}");
    }

    #[test]
    fn compound_script_operands_are_braced() {
        assert_eq!(scan("x^1.5").unwrap(), "x^{1.5}");
        assert_eq!(scan("x^2.").unwrap(), "x^2.");
        assert_eq!(scan("x^sqrt(2)").unwrap(), r"x^{\sqrt{2}}");
        assert_eq!(scan("e^frac(1, 2)").unwrap(), r"e^{\frac{1}{2}}");
        assert_eq!(scan(r"e^\pi").unwrap(), r"e^{\pi}");
        assert_eq!(scan(r#"x_"max""#).unwrap(), r"x_{\text{max}}");
    }

    #[test]
    fn strings_become_text() {
        assert_eq!(scan(r#"x_("max")"#).unwrap(), r"x_{\text{max}}");
    }

    #[test]
    fn latex_commands_are_copied() {
        assert_eq!(
            scan(r"\alpha + \, frac(\pi, 2)").unwrap(),
            r"\alpha + \, \frac{\pi}{2}"
        );
    }

    #[test]
    fn unbalanced_parentheses() {
        assert_eq!(
            scan("frac(a, b"),
            Err(ConversionError::malformed_at("unclosed '('", 4))
        );
        assert_eq!(
            scan("(x"),
            Err(ConversionError::malformed_at("unclosed '('", 0))
        );
        assert_eq!(
            scan("x)"),
            Err(ConversionError::malformed_at("unexpected ')'", 1))
        );
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            scan(r#"x "abc"#),
            Err(ConversionError::malformed_at("unterminated string", 2))
        );
    }

    #[test]
    fn wrong_arity() {
        let err = scan("frac(a)").unwrap_err();
        assert!(err.to_string().contains("frac expects 2 arguments, found 1"));
    }

    #[test]
    fn nesting_limit() {
        let within = format!(
            "{}x{}",
            "sqrt(".repeat(MAX_NESTING_DEPTH),
            ")".repeat(MAX_NESTING_DEPTH)
        );
        assert!(scan(&within).is_ok());

        let beyond = format!(
            "{}x{}",
            "sqrt(".repeat(MAX_NESTING_DEPTH + 1),
            ")".repeat(MAX_NESTING_DEPTH + 1)
        );
        assert_eq!(
            scan(&beyond),
            Err(ConversionError::ambiguous("sqrt", MAX_NESTING_DEPTH + 1))
        );
    }
}
