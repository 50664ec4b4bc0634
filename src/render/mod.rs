//! Rendering pipeline around the external `typst` compiler
//!
//! - `compiler`: subprocess driver with timeout and scoped temp files
//! - `validator`: static parse plus compile check
//! - `image`: PNG rendering and saving
//! - `clipboard`: copy text or images with platform tools

pub mod clipboard;
pub mod compiler;
pub mod image;
pub mod validator;

pub use clipboard::{copy_png, copy_text};
pub use compiler::{wrap_math, TypstCompiler, DEFAULT_TEMPLATE, EQUATION_PLACEHOLDER};
pub use image::RenderedImage;
pub use validator::{syntax_errors, validate, ValidationReport};
