//! Exit-status tests for the `csv2img` binary.

#![cfg(feature = "cli")]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::process::{Command, Output};

fn png_b64() -> String {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 200, 0])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    STANDARD.encode(buf)
}

fn run(csv: &Path, output: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_csv2img"))
        .arg("--csv")
        .arg(csv)
        .arg("--output")
        .arg(output)
        .arg("--no-progress")
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("binary runs")
}

#[test]
fn successful_run_exits_zero_even_with_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("in.csv");
    std::fs::write(&csv, format!("good,{}\nbad,not-valid-base64!!\n", png_b64())).unwrap();
    let out = dir.path().join("out");

    let result = run(&csv, &out, &[]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    assert!(out.join("good.png").exists());
    assert_eq!(std::fs::read_to_string(out.join("bad.txt")).unwrap(), "not-valid-base64!!\n");

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Done!"), "stdout: {stdout}");
}

#[test]
fn malformed_row_exits_nonzero_with_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("in.csv");
    std::fs::write(&csv, format!("good,{}\na,b,c\n", png_b64())).unwrap();
    let out = dir.path().join("out");

    let result = run(&csv, &out, &[]);
    assert!(!result.status.success());
    assert!(!out.exists());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Malformed row"), "stderr: {stderr}");
}

#[test]
fn missing_input_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let result = run(&dir.path().join("nope.csv"), &dir.path().join("out"), &[]);
    assert!(!result.status.success());
}

#[test]
fn json_output_is_structured() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("in.csv");
    std::fs::write(&csv, format!("g,{}\n", png_b64())).unwrap();

    let result = run(&csv, &dir.path().join("out"), &["--json"]);
    assert!(result.status.success());
    let json: serde_json::Value = serde_json::from_slice(&result.stdout).expect("valid JSON");
    assert_eq!(json["stats"]["png_written"], 1);
    assert_eq!(json["records"][0]["id"], "g");
    assert_eq!(json["records"][0]["outcome"]["status"], "converted");
}

#[test]
fn inspect_only_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("in.csv");
    std::fs::write(&csv, format!("g,{}\n", png_b64())).unwrap();
    let out = dir.path().join("out");

    let result = run(&csv, &out, &["--inspect-only"]);
    assert!(result.status.success());
    assert!(!out.exists());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("png"), "stdout: {stdout}");
    assert!(stdout.contains("4x4"), "stdout: {stdout}");
}
