//! Conversion core
//!
//! - `latex2typst`: rule-based LaTeX → Typst rewriter
//! - `typst2latex`: bracket-balancing Typst → LaTeX scanner
//! - `postprocess`: idempotent cleanup of forward output

pub mod latex2typst;
pub mod postprocess;
pub mod typst2latex;
