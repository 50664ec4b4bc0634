//! Utility modules
//!
//! Error types and result types shared by the converters and the renderer.

pub mod error;

pub use error::{ConversionError, ConversionOutput, ConversionResult, ConversionWarning};
