//! Driver for the external `typst` compiler
//!
//! Each compile writes the equation into a page template inside a scoped
//! temporary directory and runs `typst compile` there. The temporary
//! directory is removed when the call returns, whatever the outcome.

use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::config::Config;
use crate::utils::error::{ConversionError, ConversionResult};

/// Marker in a page template replaced by the math-delimited equation.
pub const EQUATION_PLACEHOLDER: &str = "${EQUATION}";

/// Page sized to the equation, with a small margin.
pub const DEFAULT_TEMPLATE: &str = "#set page(width: auto, height: auto, margin: 10pt)
#set text(size: 14pt)

${EQUATION}
";

const SOURCE_FILE: &str = "equation.typ";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct TypstCompiler {
    program: String,
    timeout: Duration,
    template: String,
}

impl TypstCompiler {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Compiler as configured, reading the template file if one is set.
    pub fn from_config(config: &Config) -> ConversionResult<Self> {
        let compiler = Self::new(config.typst.compiler.clone(), config.timeout());
        match &config.typst.template {
            Some(path) => {
                let template = fs::read_to_string(path).map_err(|e| {
                    ConversionError::io(format!(
                        "failed to read template {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                compiler.with_template(template)
            }
            None => Ok(compiler),
        }
    }

    /// Replace the page template. It must contain [`EQUATION_PLACEHOLDER`].
    pub fn with_template(mut self, template: String) -> ConversionResult<Self> {
        if !template.contains(EQUATION_PLACEHOLDER) {
            return Err(ConversionError::io(format!(
                "template has no {} placeholder",
                EQUATION_PLACEHOLDER
            )));
        }
        self.template = template;
        Ok(self)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_available(&self) -> bool {
        self.locate().is_ok()
    }

    fn locate(&self) -> ConversionResult<PathBuf> {
        which::which(&self.program).map_err(|_| ConversionError::tool_unavailable(&self.program))
    }

    /// Full Typst source for one equation.
    pub fn document(&self, equation: &str) -> String {
        self.template
            .replace(EQUATION_PLACEHOLDER, &wrap_math(equation))
    }

    /// Compile to PNG at `dpi` and return the image bytes.
    pub fn compile_png(&self, equation: &str, dpi: u32) -> ConversionResult<Vec<u8>> {
        if dpi == 0 {
            return Err(ConversionError::malformed("dpi must be a positive integer"));
        }
        let dpi = dpi.to_string();
        self.compile(equation, "equation.png", &["--ppi", dpi.as_str()])
    }

    /// Compile without keeping any output; succeeds iff typst accepts the
    /// equation.
    pub fn check(&self, equation: &str) -> ConversionResult<()> {
        self.compile(equation, "equation.pdf", &[]).map(|_| ())
    }

    fn compile(&self, equation: &str, output: &str, extra: &[&str]) -> ConversionResult<Vec<u8>> {
        let program = self.locate()?;
        let workdir = tempfile::tempdir()?;
        fs::write(workdir.path().join(SOURCE_FILE), self.document(equation))?;

        let mut args: Vec<OsString> = vec!["compile".into(), SOURCE_FILE.into(), output.into()];
        args.extend(extra.iter().map(OsString::from));
        self.run(&program, &args, workdir.path())?;

        fs::read(workdir.path().join(output)).map_err(|e| {
            ConversionError::tool_failure(format!(
                "{} reported success but produced no output: {}",
                self.program, e
            ))
        })
    }

    /// Run the compiler in `cwd`, killing it once the timeout elapses.
    fn run(&self, program: &Path, args: &[OsString], cwd: &Path) -> ConversionResult<()> {
        debug!("running {} {:?}", program.display(), args);
        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take();
        let reader = thread::spawn(move || {
            let mut buf = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut buf);
            }
            buf
        });

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                warn!("{} killed after {:?}", self.program, self.timeout);
                return Err(ConversionError::tool_failure(format!(
                    "{} timed out after {:.1}s",
                    self.program,
                    self.timeout.as_secs_f64()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let diagnostics = reader.join().unwrap_or_default();
        if status.success() {
            return Ok(());
        }
        if diagnostics.trim().is_empty() {
            Err(ConversionError::tool_failure(format!(
                "{} exited with {}",
                self.program, status
            )))
        } else {
            Err(ConversionError::tool_failure(diagnostics))
        }
    }
}

impl Default for TypstCompiler {
    fn default() -> Self {
        let config = Config::default();
        let timeout = config.timeout();
        Self::new(config.typst.compiler, timeout)
    }
}

/// Wrap in `$ … $` unless already delimited.
pub fn wrap_math(equation: &str) -> String {
    let trimmed = equation.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('$') && trimmed.ends_with('$') {
        trimmed.to_string()
    } else {
        format!("$ {} $", trimmed)
    }
}
