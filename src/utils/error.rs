//! Error handling for tex2typ conversions
//!
//! This module provides a unified error type and result type for the
//! conversion core and for the rendering pipeline built around it.

use std::fmt;

use serde::Serialize;

/// Conversion error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Input could not be scanned meaningfully (e.g. unbalanced brackets)
    MalformedInput {
        message: String,
        position: Option<usize>,
    },
    /// The inverse mapping is not well-defined for this input
    AmbiguousInverse { construct: String, depth: usize },
    /// A symbol table violates its uniqueness, injectivity or shape invariants
    InvalidTable { message: String },
    /// The external typesetting compiler is not installed
    ExternalToolUnavailable { tool: String },
    /// The external compiler ran but rejected the input
    ExternalToolFailure { diagnostics: String },
    /// IO error (temp files, clipboard, save path)
    IoError { message: String },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::MalformedInput { message, position } => {
                if let Some(pos) = position {
                    write!(f, "Malformed input at offset {}: {}", pos, message)
                } else {
                    write!(f, "Malformed input: {}", message)
                }
            }
            ConversionError::AmbiguousInverse { construct, depth } => {
                write!(
                    f,
                    "Ambiguous inverse: '{}' is nested {} levels deep (supported depth is {})",
                    construct,
                    depth,
                    crate::core::typst2latex::MAX_NESTING_DEPTH
                )
            }
            ConversionError::InvalidTable { message } => {
                write!(f, "Invalid symbol table: {}", message)
            }
            ConversionError::ExternalToolUnavailable { tool } => {
                write!(
                    f,
                    "{} compiler not found. Please install {} to enable validation and rendering.",
                    tool, tool
                )
            }
            ConversionError::ExternalToolFailure { diagnostics } => {
                write!(f, "{}", diagnostics)
            }
            ConversionError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Conversion warnings (non-fatal issues)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionWarning {
    pub message: String,
    pub offset: Option<usize>,
    pub suggestion: Option<String>,
}

impl ConversionWarning {
    /// Warning for a command that has no mapping and was copied verbatim.
    pub fn passthrough(token: &str, offset: usize) -> Self {
        Self {
            message: format!("unrecognized '{}' passed through unchanged", token),
            offset: Some(offset),
            suggestion: None,
        }
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(o) = self.offset {
            write!(f, "Warning at offset {}: {}", o, self.message)?;
        } else {
            write!(f, "Warning: {}", self.message)?;
        }
        if let Some(ref sug) = self.suggestion {
            write!(f, " ({})", sug)?;
        }
        Ok(())
    }
}

/// Conversion output with optional warnings
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// The converted content
    pub content: String,
    /// Any warnings generated during conversion
    pub warnings: Vec<ConversionWarning>,
}

impl ConversionOutput {
    pub fn new(content: String) -> Self {
        Self {
            content,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(content: String, warnings: Vec<ConversionWarning>) -> Self {
        Self { content, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// Convenience constructors for errors
impl ConversionError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ConversionError::MalformedInput {
            message: message.into(),
            position: None,
        }
    }

    pub fn malformed_at(message: impl Into<String>, position: usize) -> Self {
        ConversionError::MalformedInput {
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn ambiguous(construct: impl Into<String>, depth: usize) -> Self {
        ConversionError::AmbiguousInverse {
            construct: construct.into(),
            depth,
        }
    }

    pub fn invalid_table(message: impl Into<String>) -> Self {
        ConversionError::InvalidTable {
            message: message.into(),
        }
    }

    pub fn tool_unavailable(tool: impl Into<String>) -> Self {
        ConversionError::ExternalToolUnavailable { tool: tool.into() }
    }

    pub fn tool_failure(diagnostics: impl Into<String>) -> Self {
        ConversionError::ExternalToolFailure {
            diagnostics: diagnostics.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        ConversionError::IoError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = ConversionError::malformed("unbalanced parentheses");
        assert!(err.to_string().contains("Malformed input"));
        assert!(err.to_string().contains("unbalanced parentheses"));
    }

    #[test]
    fn test_malformed_with_position() {
        let err = ConversionError::malformed_at("unexpected ')'", 7);
        assert!(err.to_string().contains("offset 7"));
    }

    #[test]
    fn test_ambiguous_mentions_depth() {
        let err = ConversionError::ambiguous("frac", 9);
        let msg = err.to_string();
        assert!(msg.contains("frac"));
        assert!(msg.contains("9 levels"));
    }

    #[test]
    fn test_tool_failure_is_verbatim() {
        let err = ConversionError::tool_failure("error: unknown variable: foo");
        assert_eq!(err.to_string(), "error: unknown variable: foo");
    }

    #[test]
    fn test_unavailable_is_actionable() {
        let msg = ConversionError::tool_unavailable("typst").to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("install typst"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConversionError = io.into();
        assert!(matches!(err, ConversionError::IoError { .. }));
    }

    #[test]
    fn test_conversion_output() {
        let output = ConversionOutput::new("alpha".to_string());
        assert!(!output.has_warnings());

        let output_with_warn = ConversionOutput::with_warnings(
            "foo".to_string(),
            vec![ConversionWarning::passthrough("\\foo", 0)],
        );
        assert!(output_with_warn.has_warnings());
        assert!(output_with_warn.warnings[0].to_string().contains("\\foo"));
    }
}
