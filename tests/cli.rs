use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const DATA: &str = "North,A,30\nNorth,B,70\nSouth,A,50\nSouth,B,50\n";

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("mekko").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("mekko"))
        .stdout(predicate::str::contains("draw"));
}

#[test]
fn draw_writes_svg() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, DATA).unwrap();
    let out_dir = dir.path().join("charts");

    let mut cmd = Command::cargo_bin("mekko").unwrap();
    cmd.args(["draw", "--font", "default", "--title", "Regional mix", "--dpi", "72"])
        .arg("--input")
        .arg(&csv)
        .arg("--out-dir")
        .arg(&out_dir)
        .args(["--file-name", "mix.svg"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("mix.svg"));

    let svg = fs::read_to_string(out_dir.join("mix.svg")).unwrap();
    assert!(svg.contains("Regional mix"));
}

#[test]
fn draw_reads_config_and_colors() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, DATA).unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        format!(
            r#"{{"font":"default","title":"From config","dpi":72,"output_directory":{:?},"output_filename":"c.svg"}}"#,
            dir.path().display().to_string()
        ),
    )
    .unwrap();
    let colors = dir.path().join("colors.json");
    fs::write(&colors, r##"{"B":"#00ff00"}"##).unwrap();

    let mut cmd = Command::cargo_bin("mekko").unwrap();
    cmd.arg("draw")
        .arg("--input")
        .arg(&csv)
        .arg("--config")
        .arg(&config)
        .arg("--colors")
        .arg(&colors);
    cmd.assert().success();

    let svg = fs::read_to_string(dir.path().join("c.svg"))
        .unwrap()
        .to_lowercase();
    assert!(svg.contains("from config"));
    assert!(svg.contains("#00ff00"));
}

#[test]
fn draw_rejects_out_of_range_dpi() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, DATA).unwrap();

    let mut cmd = Command::cargo_bin("mekko").unwrap();
    cmd.args(["draw", "--dpi", "20000", "--file-name", "big.png"])
        .arg("--input")
        .arg(&csv)
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("20000"));
    assert!(!dir.path().join("big.png").exists());

    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"dpi": 50000, "output_filename": "big.svg"}"#).unwrap();
    let mut cmd = Command::cargo_bin("mekko").unwrap();
    cmd.arg("draw")
        .arg("--input")
        .arg(&csv)
        .arg("--config")
        .arg(&config)
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("dpi must be between 1 and 2400"));
    assert!(!dir.path().join("big.svg").exists());
}

#[test]
fn draw_fails_on_empty_input() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("empty.csv");
    fs::write(&csv, "").unwrap();

    let mut cmd = Command::cargo_bin("mekko").unwrap();
    cmd.arg("draw")
        .arg("--input")
        .arg(&csv)
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no rows"));
}

#[test]
fn draw_fails_on_missing_input() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("mekko").unwrap();
    cmd.arg("draw")
        .arg("--input")
        .arg(dir.path().join("missing.csv"))
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing.csv"));
}

#[test]
fn palette_prints_json() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, DATA).unwrap();

    let out = Command::cargo_bin("mekko")
        .unwrap()
        .arg("palette")
        .arg("--input")
        .arg(&csv)
        .output()
        .unwrap();
    assert!(out.status.success());
    let map: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(map["A"], "#1f77b4");
    assert!(map["B"].is_string());
}

#[test]
fn layout_prints_rectangles() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, DATA).unwrap();

    let out = Command::cargo_bin("mekko")
        .unwrap()
        .arg("layout")
        .arg("--input")
        .arg(&csv)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["grand_total"], 200.0);
    assert_eq!(v["rectangles"].as_array().unwrap().len(), 4);
    assert_eq!(v["partition"][0]["group"], "North");
    assert_eq!(v["rectangles"][0]["display_text"], "A\n(30.0%)");
}
