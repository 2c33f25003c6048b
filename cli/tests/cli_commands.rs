use std::path::PathBuf;
use std::process::{Command, Output};

use assert_cmd::prelude::*;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples").join(name)
}

fn sil2cast(args: &[&str]) -> Output {
    Command::cargo_bin("sil2cast")
        .expect("binary built")
        .env_remove("SIL2CAST_OUTPUT")
        .env_remove("SIL2CAST_PRINT")
        .env_remove("SIL2CAST_ENGINE_DIR")
        .env_remove("SIL2CAST_LOG")
        .args(args)
        .output()
        .expect("run sil2cast")
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

#[test]
fn lowers_a_sample_module() {
    let counter = sample("counter.json");
    let out = sil2cast(&["lower", counter.to_str().expect("utf-8 path")]);
    let stdout = text(&out.stdout);
    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    assert!(stdout.contains("counter"), "{}", stdout);
    assert!(stdout.contains("lowered 1 module(s)"), "{}", stdout);
}

#[test]
fn writes_the_graph_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("graph.json");
    let counter = sample("counter.json");
    let out = sil2cast(&[
        "lower",
        counter.to_str().expect("utf-8 path"),
        "--output",
        target.to_str().expect("utf-8 path"),
    ]);
    assert!(out.status.success(), "stderr: {}", text(&out.stderr));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&target).expect("graph written")).expect("valid json");
    assert_eq!(json["module"], "counter");
    assert!(json["nodes"].as_array().is_some_and(|nodes| !nodes.is_empty()));
}

#[test]
fn several_inputs_get_indexed_outputs_and_dumps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dumps = dir.path().join("dumps");
    std::fs::create_dir(&dumps).expect("dump dir");
    let target = dir.path().join("out.json");
    let counter = sample("counter.json");
    let optional = sample("optional.json");
    let out = sil2cast(&[
        "lower",
        counter.to_str().expect("utf-8 path"),
        optional.to_str().expect("utf-8 path"),
        "--dump-dir",
        dumps.to_str().expect("utf-8 path"),
        "-o",
        target.to_str().expect("utf-8 path"),
    ]);
    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    assert!(text(&out.stdout).contains("lowered 2 module(s)"));
    assert!(dir.path().join("out_0.json").is_file());
    assert!(dir.path().join("out_1.json").is_file());
    assert!(!target.exists());
    assert!(dumps.join("test_counter.swift.txt").is_file());
    assert_eq!(std::fs::read_dir(&dumps).expect("dumps").count(), 2);
}

#[test]
fn malformed_module_fails_the_run() {
    let broken = sample("broken.json");
    let out = sil2cast(&["lower", broken.to_str().expect("utf-8 path")]);
    assert!(!out.status.success());
    let stderr = text(&out.stderr);
    assert!(stderr.contains("SIL2CAST | ERROR"), "{}", stderr);
    assert!(stderr.contains("1 of 1 module(s) failed"), "{}", stderr);
}

#[test]
fn unsupported_instructions_are_warnings() {
    let optional = sample("optional.json");
    let out = sil2cast(&["lower", optional.to_str().expect("utf-8 path")]);
    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    let stderr = text(&out.stderr);
    assert!(stderr.contains("SIL2CAST | WARNING"), "{}", stderr);
    assert!(stderr.contains("hop_to_executor"), "{}", stderr);
}

#[test]
fn inspect_prints_listing_and_breakdown() {
    let counter = sample("counter.json");
    let out = sil2cast(&["inspect", counter.to_str().expect("utf-8 path")]);
    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    let stdout = text(&out.stdout);
    assert!(stdout.contains("module counter"), "{}", stdout);
    assert!(stdout.contains("sil @increment"), "{}", stdout);
    assert!(stdout.contains("cond_br"), "{}", stdout);
}

#[test]
fn engines_reports_an_empty_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = sil2cast(&["engines", "--engine-dir", dir.path().to_str().expect("utf-8 path")]);
    assert!(out.status.success());
    assert!(text(&out.stdout).contains("no engines found"));
}

#[test]
fn unknown_engine_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let counter = sample("counter.json");
    let out = sil2cast(&[
        "lower",
        counter.to_str().expect("utf-8 path"),
        "--engine",
        "nonexistent",
        "--engine-dir",
        dir.path().to_str().expect("utf-8 path"),
    ]);
    assert!(!out.status.success());
    assert!(text(&out.stderr).contains("no engine named 'nonexistent'"));
}

#[test]
fn missing_subcommand_fails() {
    let out = sil2cast(&[]);
    assert!(!out.status.success());
}
