//! PNG rendering of Typst equations.

use std::fs;
use std::path::Path;

use log::info;

use crate::render::compiler::TypstCompiler;
use crate::utils::error::{ConversionError, ConversionResult};

/// A rendered equation image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    png: Vec<u8>,
    dpi: u32,
}

impl RenderedImage {
    pub fn render(compiler: &TypstCompiler, equation: &str, dpi: u32) -> ConversionResult<Self> {
        let png = compiler.compile_png(equation, dpi)?;
        info!("rendered {} bytes at {} dpi", png.len(), dpi);
        Ok(Self { png, dpi })
    }

    pub fn from_png(png: Vec<u8>, dpi: u32) -> Self {
        Self { png, dpi }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Write the PNG to `path`, creating missing parent directories.
    pub fn save(&self, path: &Path) -> ConversionResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ConversionError::io(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(path, &self.png)
            .map_err(|e| ConversionError::io(format!("cannot write {}: {}", path.display(), e)))
    }
}
