//! Clipboard copy through platform tools
//!
//! macOS uses `pbcopy` for text and `osascript` for images, Linux uses
//! `wl-copy` or `xclip`, Windows uses `clip` (text only).

use std::io::{self, Write};
use std::process::{Command, Stdio};

use log::debug;

use crate::utils::error::{ConversionError, ConversionResult};

/// A clipboard program and the arguments that make it read stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardTool {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl ClipboardTool {
    fn new(program: &'static str, args: &[&str]) -> Self {
        Self {
            program,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Candidates for text, in preference order.
pub fn text_tools() -> Vec<ClipboardTool> {
    if cfg!(target_os = "macos") {
        vec![ClipboardTool::new("pbcopy", &[])]
    } else if cfg!(windows) {
        vec![ClipboardTool::new("clip", &[])]
    } else {
        vec![
            ClipboardTool::new("wl-copy", &[]),
            ClipboardTool::new("xclip", &["-selection", "clipboard"]),
        ]
    }
}

/// Candidates for PNG data, in preference order.
pub fn image_tools() -> Vec<ClipboardTool> {
    if cfg!(target_os = "macos") || cfg!(windows) {
        Vec::new()
    } else {
        vec![
            ClipboardTool::new("wl-copy", &["--type", "image/png"]),
            ClipboardTool::new("xclip", &["-selection", "clipboard", "-t", "image/png"]),
        ]
    }
}

pub fn copy_text(text: &str) -> ConversionResult<()> {
    let tool = first_available(&text_tools())?;
    pipe_to(&tool, text.as_bytes())
}

pub fn copy_png(png: &[u8]) -> ConversionResult<()> {
    if cfg!(target_os = "macos") {
        return copy_png_macos(png);
    }
    let tools = image_tools();
    if tools.is_empty() {
        return Err(ConversionError::tool_unavailable("clipboard image support"));
    }
    let tool = first_available(&tools)?;
    pipe_to(&tool, png)
}

/// `osascript` can only read the image from a file.
fn copy_png_macos(png: &[u8]) -> ConversionResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("equation.png");
    std::fs::write(&path, png)?;

    let script = format!(
        "set the clipboard to (read (POSIX file \"{}\") as «class PNGf»)",
        path.display()
    );
    let tool = ClipboardTool {
        program: "osascript",
        args: vec!["-e".to_string(), script],
    };
    pipe_to(&tool, &[])
}

fn first_available(tools: &[ClipboardTool]) -> ConversionResult<ClipboardTool> {
    tools
        .iter()
        .find(|tool| which::which(tool.program).is_ok())
        .cloned()
        .ok_or_else(|| {
            let names: Vec<&str> = tools.iter().map(|t| t.program).collect();
            ConversionError::tool_unavailable(names.join(" or "))
        })
}

/// Run `tool` with `data` on stdin.
pub fn pipe_to(tool: &ClipboardTool, data: &[u8]) -> ConversionResult<()> {
    debug!("copying {} bytes via {}", data.len(), tool.program);
    let mut child = Command::new(tool.program)
        .args(&tool.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(data) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Err(e) => return Err(e.into()),
        }
    }

    let output = child.wait_with_output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(ConversionError::tool_failure(format!(
            "{} failed: {}",
            tool.program,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}
