use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    tmp.write_all(contents.as_bytes()).expect("write temp file");
    tmp
}

fn triangle_model() -> NamedTempFile {
    write_temp(
        ".obj",
        "o Cell\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
    )
}

#[test]
fn headless_run_prints_scene_summary() {
    let model = triangle_model();
    let mut cmd = Command::cargo_bin("bloodstream").expect("binary exists");
    cmd.arg("--model")
        .arg(model.path())
        .args(["--summary-only", "--frames", "10", "--seed", "7"]);
    cmd.assert()
        .success()
        .stdout(contains("Path length: "))
        .stdout(contains("Path samples: 1001"))
        .stdout(contains("Loaded model with 3 vertices (1 triangles)"))
        .stdout(contains("Particles: 1001"))
        .stdout(contains("Camera pos=("))
        .stdout(contains("Cursor: (0.000, 0.000)"));
}

#[test]
fn missing_model_leaves_the_vessel_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.obj");
    let mut cmd = Command::cargo_bin("bloodstream").expect("binary exists");
    cmd.arg("--model").arg(&missing).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Model unavailable:"))
        .stdout(contains("Particles: 0"));
}

#[test]
fn config_file_overrides_defaults() {
    let model = triangle_model();
    let config = write_temp(".toml", "[path]\nsamples = 10\n");
    let mut cmd = Command::cargo_bin("bloodstream").expect("binary exists");
    cmd.arg("--model")
        .arg(model.path())
        .arg("--config")
        .arg(config.path())
        .args(["--summary-only", "--frames", "1"]);
    cmd.assert()
        .success()
        .stdout(contains("Path samples: 11"))
        .stdout(contains("Particles: 11"));
}

#[test]
fn invalid_config_is_rejected() {
    let config = write_temp(".toml", "[camera]\nloop_period = 0.0\n");
    let mut cmd = Command::cargo_bin("bloodstream").expect("binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("camera.loop_period must be positive"));
}

#[test]
fn scrolled_headless_run_hides_heading() {
    let model = triangle_model();
    let mut cmd = Command::cargo_bin("bloodstream").expect("binary exists");
    cmd.arg("--model")
        .arg(model.path())
        .args(["--summary-only", "--frames", "400", "--scroll", "20000", "--seed", "1"]);
    cmd.assert()
        .success()
        .stdout(contains("Heading: "))
        .stdout(contains("Heading: BLOODSTREAM").not())
        .stdout(contains("Camera pos=(0.163, 0.452, 0.056)").not());
}

#[test]
fn unscrolled_headless_run_reveals_heading() {
    let model = triangle_model();
    let mut cmd = Command::cargo_bin("bloodstream").expect("binary exists");
    cmd.arg("--model")
        .arg(model.path())
        .args(["--summary-only", "--frames", "400"]);
    cmd.assert()
        .success()
        .stdout(contains("Heading: BLOODSTREAM"));
}

#[test]
fn verbose_flag_enables_info_logging() {
    let model = triangle_model();
    let mut cmd = Command::cargo_bin("bloodstream").expect("binary exists");
    cmd.env_remove("RUST_LOG")
        .arg("--model")
        .arg(model.path())
        .args(["--summary-only", "--frames", "1", "-v"]);
    cmd.assert().success().stderr(contains("path length"));

    let mut quiet = Command::cargo_bin("bloodstream").expect("binary exists");
    quiet
        .env_remove("RUST_LOG")
        .arg("--model")
        .arg(model.path())
        .args(["--summary-only", "--frames", "1"]);
    quiet
        .assert()
        .success()
        .stderr(contains("path length").not());
}
