//! LaTeX ↔ Typst symbol tables
//!
//! The forward table maps atomic LaTeX commands to Typst symbol names. Tokens
//! are matched as whole tokens by the converters (maximal `\letters` commands
//! on the LaTeX side, maximal dotted identifiers on the Typst side), so the
//! table is order independent. The inverse table is derived by swapping each
//! entry, which is only sound when the forward table is injective.

use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::utils::error::{ConversionError, ConversionResult};

/// Forward entries, LaTeX command → Typst symbol.
pub const LATEX_TO_TYPST: &[(&str, &str)] = &[
    // === Greek (lowercase) ===
    (r"\alpha", "alpha"),
    (r"\beta", "beta"),
    (r"\gamma", "gamma"),
    (r"\delta", "delta"),
    (r"\epsilon", "epsilon"),
    (r"\varepsilon", "epsilon.alt"),
    (r"\zeta", "zeta"),
    (r"\eta", "eta"),
    (r"\theta", "theta"),
    (r"\vartheta", "theta.alt"),
    (r"\iota", "iota"),
    (r"\kappa", "kappa"),
    (r"\lambda", "lambda"),
    (r"\mu", "mu"),
    (r"\nu", "nu"),
    (r"\xi", "xi"),
    (r"\pi", "pi"),
    (r"\rho", "rho"),
    (r"\sigma", "sigma"),
    (r"\tau", "tau"),
    (r"\upsilon", "upsilon"),
    (r"\phi", "phi"),
    (r"\varphi", "phi.alt"),
    (r"\chi", "chi"),
    (r"\psi", "psi"),
    (r"\omega", "omega"),
    // === Greek (uppercase) ===
    (r"\Gamma", "Gamma"),
    (r"\Delta", "Delta"),
    (r"\Theta", "Theta"),
    (r"\Lambda", "Lambda"),
    (r"\Xi", "Xi"),
    (r"\Pi", "Pi"),
    (r"\Sigma", "Sigma"),
    (r"\Upsilon", "Upsilon"),
    (r"\Phi", "Phi"),
    (r"\Psi", "Psi"),
    (r"\Omega", "Omega"),
    // === Special symbols ===
    (r"\infty", "infinity"),
    (r"\partial", "diff"),
    (r"\nabla", "nabla"),
    (r"\ell", "ell"),
    (r"\emptyset", "emptyset"),
    (r"\angle", "angle"),
    // === Binary operators ===
    (r"\times", "times"),
    (r"\cdot", "dot.op"),
    (r"\pm", "plus.minus"),
    (r"\mp", "minus.plus"),
    (r"\div", "div"),
    (r"\cup", "union"),
    (r"\cap", "sect"),
    (r"\land", "and"),
    (r"\lor", "or"),
    (r"\neg", "not"),
    // === Relations ===
    (r"\leq", "lt.eq"),
    (r"\geq", "gt.eq"),
    (r"\neq", "eq.not"),
    (r"\approx", "approx"),
    (r"\equiv", "equiv"),
    (r"\sim", "tilde.op"),
    (r"\propto", "prop"),
    (r"\in", "in"),
    (r"\notin", "in.not"),
    (r"\subset", "subset"),
    (r"\supset", "supset"),
    (r"\subseteq", "subset.eq"),
    (r"\supseteq", "supset.eq"),
    (r"\perp", "perp"),
    (r"\parallel", "parallel"),
    (r"\forall", "forall"),
    (r"\exists", "exists"),
    // === Arrows ===
    (r"\rightarrow", "arrow.r"),
    (r"\leftarrow", "arrow.l"),
    (r"\leftrightarrow", "arrow.l.r"),
    (r"\Rightarrow", "arrow.r.double"),
    (r"\Leftarrow", "arrow.l.double"),
    (r"\Leftrightarrow", "arrow.l.r.double"),
    (r"\mapsto", "arrow.r.bar"),
    // === Big operators ===
    (r"\sum", "sum"),
    (r"\prod", "product"),
    (r"\int", "integral"),
    (r"\oint", "integral.cont"),
    // === Named functions ===
    (r"\lim", "lim"),
    (r"\sin", "sin"),
    (r"\cos", "cos"),
    (r"\tan", "tan"),
    (r"\log", "log"),
    (r"\ln", "ln"),
    (r"\exp", "exp"),
    (r"\max", "max"),
    (r"\min", "min"),
    // === Dots and spacing ===
    (r"\ldots", "dots.h"),
    (r"\cdots", "dots.h.c"),
    (r"\quad", "quad"),
    (r"\qquad", "wide"),
    (r"\,", "thin"),
    (r"\:", "med"),
    (r"\;", "thick"),
];

/// Typst shorthands with no identifier form, Typst → LaTeX. Longest first.
pub const TYPST_SHORTHANDS: &[(&str, &str)] = &[
    ("<=>", r"\Leftrightarrow"),
    ("...", r"\ldots"),
    ("->", r"\rightarrow"),
    ("<-", r"\leftarrow"),
    ("=>", r"\Rightarrow"),
    ("<=", r"\leq"),
    (">=", r"\geq"),
    ("!=", r"\neq"),
];

/// Insertion-ordered token map.
pub type TokenMap = IndexMap<&'static str, &'static str, FxBuildHasher>;

/// Which side of a table a token lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Latex,
    Typst,
}

impl Notation {
    /// Whether `token` has the shape the converters can match as one token.
    pub fn accepts(self, token: &str) -> bool {
        match self {
            Notation::Latex => is_latex_command(token),
            Notation::Typst => is_typst_identifier(token),
        }
    }
}

/// A validated, immutable token → token table.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    source: Notation,
    target: Notation,
    map: TokenMap,
}

impl SymbolTable {
    /// Build a table, rejecting duplicate sources and tokens of the wrong shape.
    pub fn new(
        entries: &[(&'static str, &'static str)],
        source: Notation,
        target: Notation,
    ) -> ConversionResult<Self> {
        let mut map = TokenMap::with_capacity_and_hasher(entries.len(), FxBuildHasher::default());
        for &(from, to) in entries {
            if !source.accepts(from) {
                return Err(ConversionError::invalid_table(format!(
                    "'{}' is not a valid {:?} token",
                    from, source
                )));
            }
            if !target.accepts(to) {
                return Err(ConversionError::invalid_table(format!(
                    "'{}' is not a valid {:?} token",
                    to, target
                )));
            }
            if let Some(previous) = map.insert(from, to) {
                return Err(ConversionError::invalid_table(format!(
                    "duplicate source token '{}' (maps to both '{}' and '{}')",
                    from, previous, to
                )));
            }
        }
        Ok(Self {
            source,
            target,
            map,
        })
    }

    /// The built-in LaTeX → Typst table.
    pub fn latex_to_typst() -> ConversionResult<Self> {
        Self::new(LATEX_TO_TYPST, Notation::Latex, Notation::Typst)
    }

    /// Swap every entry. Fails if two sources share a target.
    pub fn inverted(&self) -> ConversionResult<Self> {
        let mut map = TokenMap::with_capacity_and_hasher(self.map.len(), FxBuildHasher::default());
        for (&from, &to) in &self.map {
            if let Some(previous) = map.insert(to, from) {
                return Err(ConversionError::invalid_table(format!(
                    "'{}' is the target of both '{}' and '{}'; the inverse is ambiguous",
                    to, previous, from
                )));
            }
        }
        Ok(Self {
            source: self.target,
            target: self.source,
            map,
        })
    }

    pub fn get(&self, token: &str) -> Option<&'static str> {
        self.map.get(token).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.map.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn source(&self) -> Notation {
        self.source
    }

    pub fn target(&self) -> Notation {
        self.target
    }
}

lazy_static! {
    /// The built-in forward table, validated once.
    pub static ref SYMBOL_TABLE: ConversionResult<SymbolTable> = SymbolTable::latex_to_typst();
}

/// `\letters` or a single-character spacing command (`\,` `\:` `\;`).
pub fn is_latex_command(token: &str) -> bool {
    let Some(name) = token.strip_prefix('\\') else {
        return false;
    };
    match name {
        "," | ":" | ";" => true,
        _ => !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()),
    }
}

/// `letters(.letters)*`, e.g. `alpha` or `arrow.r.double`.
pub fn is_typst_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphabetic()))
}
