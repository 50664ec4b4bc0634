//! tex2typ CLI - convert equations between LaTeX and Typst

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use env_logger::Env;
#[cfg(feature = "cli")]
use log::{debug, warn};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::io::{self, IsTerminal, Read};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use tex2typ::{
    config::Config,
    latex_to_typst_with_report,
    render::{self, RenderedImage, TypstCompiler, ValidationReport},
    typst_to_latex, ConversionError, ConversionWarning, Direction, L2TOptions,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tex2typ")]
#[command(version)]
#[command(about = "Convert equations between LaTeX and Typst", long_about = None)]
struct Cli {
    /// Equation to convert (reads stdin if omitted)
    equation: Option<String>,

    /// Copy the result (or the image, with --image) to the clipboard
    #[arg(short, long)]
    copy: bool,

    /// Convert Typst to LaTeX instead
    #[arg(short, long)]
    reverse: bool,

    /// Report the conversion time
    #[arg(short, long)]
    time: bool,

    /// Only check that the Typst equation compiles
    #[arg(long)]
    validate: bool,

    /// Render the Typst equation to a PNG image
    #[arg(short, long)]
    image: bool,

    /// Save the rendered image to this path
    #[arg(short, long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Image resolution
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: Option<u32>,

    /// Strip `$` delimiters from Typst output
    #[arg(long)]
    strip_delimiters: bool,

    /// Reject LaTeX with unbalanced braces instead of converting best-effort
    #[arg(long)]
    strict: bool,

    /// Print a JSON result instead of plain text
    #[arg(long)]
    json: bool,

    /// Configuration file (defaults to ./tex2typ.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Serialize, Default)]
struct JsonReport {
    direction: Option<Direction>,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<ConversionWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = match cli.equation {
        Some(ref equation) => equation.clone(),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                eprintln!("Usage: tex2typ [OPTIONS] <EQUATION>  (or pipe an equation on stdin)");
                std::process::exit(2);
            }
            let mut buffer = String::new();
            stdin.lock().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let input = input.trim().to_string();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&cli, JsonReport::default(), e),
    };
    if let Some(dpi) = cli.dpi {
        config.output.dpi = dpi;
    }
    if cli.strip_delimiters {
        config.output.strip_delimiters = true;
    }
    debug!("configuration: {:?}", config);

    let mut report = JsonReport {
        input: input.clone(),
        ..Default::default()
    };

    let direction = Direction::from_reverse_flag(cli.reverse);
    report.direction = Some(direction);
    let l2t_options = L2TOptions {
        strict: cli.strict,
        strip_delimiters: config.output.strip_delimiters,
    };

    // Validation always checks Typst: the input with -r, else its conversion.
    if cli.validate {
        let typst_source = match direction {
            Direction::TypstToLatex => input.clone(),
            Direction::LatexToTypst => match latex_to_typst_with_report(&input, l2t_options) {
                Ok(converted) => converted.content,
                Err(e) => fail(&cli, report, e),
            },
        };
        report.output = Some(typst_source.clone());
        let compiler = match TypstCompiler::from_config(&config) {
            Ok(compiler) => compiler,
            Err(e) => fail(&cli, report, e),
        };
        let code = run_validate(&cli, &compiler, &typst_source, report);
        std::process::exit(code);
    }

    let started = Instant::now();
    let converted = match direction {
        Direction::LatexToTypst => latex_to_typst_with_report(&input, l2t_options)
            .map(|output| (output.content, output.warnings)),
        Direction::TypstToLatex => typst_to_latex(&input).map(|latex| (latex, Vec::new())),
    };
    let elapsed = started.elapsed();

    let (output, warnings) = match converted {
        Ok(result) => result,
        Err(e) => fail(&cli, report, e),
    };
    for warning in &warnings {
        warn!("{}", warning);
    }
    if cli.time {
        report.elapsed_ms = Some(elapsed.as_secs_f64() * 1000.0);
    }
    report.output = Some(output.clone());
    report.warnings = warnings;

    if !cli.json {
        println!("{}", output);
        if let Some(ms) = report.elapsed_ms {
            println!("Converted in {:.3} ms", ms);
        }
    }

    // Images are always rendered from the Typst side of the conversion.
    let typst_source = match direction {
        Direction::LatexToTypst => output.as_str(),
        Direction::TypstToLatex => input.as_str(),
    };

    let wants_image = cli.image || cli.save.is_some();
    let mut image = None;
    if wants_image {
        // A bad template only fails this stage.
        let rendered = TypstCompiler::from_config(&config).and_then(|compiler| {
            debug!("rendering with {}", compiler.program());
            RenderedImage::render(&compiler, typst_source, config.output.dpi)
        });
        match rendered {
            Ok(rendered) => {
                report.image_bytes = Some(rendered.as_bytes().len());
                image = Some(rendered);
            }
            Err(e) => notice(&cli, &mut report, format!("Image generation failed: {}", e)),
        }
    }

    if let (Some(path), Some(rendered)) = (cli.save.as_ref(), image.as_ref()) {
        match rendered.save(path) {
            Ok(()) => {
                report.saved_to = Some(path.clone());
                notice(&cli, &mut report, format!("Image saved to {}", path.display()));
            }
            Err(e) => notice(&cli, &mut report, format!("Failed to save image: {}", e)),
        }
    }

    if cli.copy {
        let copied = match image.as_ref() {
            Some(rendered) if cli.image => render::copy_png(rendered.as_bytes())
                .map(|_| "Image copied to clipboard!"),
            _ => render::copy_text(&output).map(|_| "Result copied to clipboard!"),
        };
        match copied {
            Ok(message) => notice(&cli, &mut report, message.to_string()),
            Err(e) => notice(&cli, &mut report, format!("Clipboard copy failed: {}", e)),
        }
    }

    if cli.json {
        print_json(&report);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run_validate(cli: &Cli, compiler: &TypstCompiler, input: &str, mut report: JsonReport) -> i32 {
    let validation = match render::validate(compiler, input) {
        Ok(validation) => validation,
        Err(e) => return fail(cli, report, e),
    };
    let code = if validation.valid { 0 } else { 1 };

    if cli.json {
        report.validation = Some(validation);
        print_json(&report);
    } else if validation.valid {
        println!("Valid Typst equation");
    } else {
        println!("Invalid Typst equation:");
        println!("{}", validation.diagnostics.trim_end());
    }
    code
}

/// Report a fatal error and exit with status 1.
#[cfg(feature = "cli")]
fn fail(cli: &Cli, mut report: JsonReport, error: ConversionError) -> ! {
    if cli.json {
        report.error = Some(error.to_string());
        print_json(&report);
    } else {
        println!("Error: {}", error);
    }
    std::process::exit(1);
}

/// Soft outcome of an optional stage; never changes the exit status.
#[cfg(feature = "cli")]
fn notice(cli: &Cli, report: &mut JsonReport, message: String) {
    if cli.json {
        report.notices.push(message);
    } else {
        println!("{}", message);
    }
}

#[cfg(feature = "cli")]
fn print_json(report: &JsonReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("Error: failed to serialize result: {}", e),
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if verbose > 0 {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).init();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install tex2typ --features cli");
    eprintln!("  tex2typ [OPTIONS] <EQUATION>");
}
