//! Command-line tests for the tex2typ binary

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn tex2typ() -> Command {
    let mut cmd = cargo_bin_cmd!("tex2typ");
    // Keep the host's configuration out of the tests.
    for var in [
        "TEX2TYP_TYPST",
        "TEX2TYP_TIMEOUT_SECS",
        "TEX2TYP_DPI",
        "TEX2TYP_TEMPLATE",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn converts_latex_to_typst() {
    tex2typ()
        .arg(r"\frac{\bar{x}}{y}")
        .assert()
        .success()
        .stdout("frac(overline(x), y)\n");
}

#[test]
fn converts_typst_to_latex_with_reverse() {
    tex2typ()
        .args(["-r", "frac(alpha, 2)"])
        .assert()
        .success()
        .stdout("\\frac{\\alpha}{2}\n");
}

#[test]
fn reads_equation_from_stdin() {
    tex2typ()
        .write_stdin("x^{2} + \\beta\n")
        .assert()
        .success()
        .stdout("x^(2) + beta\n");
}

#[test]
fn failed_conversion_exits_with_status_one() {
    tex2typ()
        .args(["--reverse", "frac(a, b"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("Error: Malformed input"));
}

#[test]
fn strict_mode_rejects_unbalanced_braces() {
    tex2typ().arg(r"\frac{a}{b").assert().success();
    tex2typ()
        .args(["--strict", r"\frac{a}{b"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unclosed '{'"));
}

#[test]
fn strip_delimiters_flag() {
    tex2typ()
        .args(["--strip-delimiters", r"\begin{equation}\alpha\end{equation}"])
        .assert()
        .success()
        .stdout("alpha\n");
}

#[test]
fn time_flag_reports_elapsed() {
    tex2typ()
        .args(["-t", r"\alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted in").and(predicate::str::starts_with("alpha\n")));
}

#[test]
fn json_output() {
    let output = tex2typ()
        .args(["--json", r"\foo + \pi"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["direction"], "latex-to-typst");
    assert_eq!(value["output"], r"\foo + pi");
    assert_eq!(value["warnings"].as_array().map(Vec::len), Some(1));
}

#[test]
fn json_reports_errors() {
    let output = tex2typ()
        .args(["--json", "-r", "x)"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["error"].as_str().unwrap().contains("unexpected ')'"));
}

#[test]
fn validate_rejects_syntax_errors_without_compiler() {
    tex2typ()
        .env("TEX2TYP_TYPST", "tex2typ-no-such-typst")
        .args(["--validate", "-r", "x + \"abc"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("Invalid Typst equation"));
}

#[test]
fn validate_without_compiler_is_an_error() {
    tex2typ()
        .env("TEX2TYP_TYPST", "tex2typ-no-such-typst")
        .args(["--validate", "-r", "x + 1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("compiler not found"));
}

#[test]
fn image_failure_is_soft() {
    tex2typ()
        .env("TEX2TYP_TYPST", "tex2typ-no-such-typst")
        .args(["-i", r"\alpha"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("alpha\n").and(predicate::str::contains(
            "Image generation failed",
        )));
}

#[test]
fn bad_template_only_fails_the_image_stage() {
    tex2typ()
        .env("TEX2TYP_TEMPLATE", "/nonexistent/page.typ")
        .arg(r"\alpha")
        .assert()
        .success()
        .stdout("alpha\n");

    tex2typ()
        .env("TEX2TYP_TEMPLATE", "/nonexistent/page.typ")
        .args(["-i", r"\alpha"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("alpha\n").and(predicate::str::contains(
            "Image generation failed: IO error: failed to read template",
        )));
}

#[cfg(unix)]
#[test]
fn clipboard_failure_does_not_block_save() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    let typst = bin.join("typst");
    std::fs::write(&typst, "#!/bin/sh\nprintf 'PNG' > \"$3\"\n").unwrap();
    std::fs::set_permissions(&typst, std::fs::Permissions::from_mode(0o755)).unwrap();

    let target = dir.path().join("nested").join("eq.png");
    tex2typ()
        .env("TEX2TYP_TYPST", &typst)
        // No clipboard tool is reachable from here.
        .env("PATH", &bin)
        .args(["-c", "-s"])
        .arg(&target)
        .arg(r"\frac{1}{2}")
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("frac(1, 2)\n")
                .and(predicate::str::contains("Image saved to"))
                .and(predicate::str::contains("Clipboard copy failed")),
        );
    assert_eq!(std::fs::read(&target).unwrap(), b"PNG");
}

#[test]
fn rejects_zero_dpi() {
    tex2typ().args(["--dpi", "0", "x"]).assert().failure();
}

#[test]
fn config_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tex2typ.toml");
    std::fs::write(&config, "[output]\nstrip_delimiters = true\n").unwrap();

    tex2typ()
        .arg("--config")
        .arg(&config)
        .arg(r"\begin{equation}x\end{equation}")
        .assert()
        .success()
        .stdout("x\n");
}

#[test]
fn unreadable_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    tex2typ()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .arg("x")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("Error: IO error"));
}
