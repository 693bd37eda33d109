mod common;

use std::fs;

use assert_cmd::Command;

fn write_mussels(dir: &std::path::Path) -> std::path::PathBuf {
    let mut body = String::from("stratum,group,allele_94,other\n");
    for (label, a, b, c, d) in common::MUSSELS {
        body.push_str(&format!("{label},marine,{a},{b}\n{label},estuary,{c},{d}\n"));
    }
    let path = dir.join("mussels.csv");
    fs::write(&path, body).expect("write csv");
    path
}

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("strata-scope").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn analyze_prints_json_and_writes_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_mussels(dir.path());
    let outputs = dir.path().join("outputs");

    let output = Command::cargo_bin("strata-scope")
        .expect("binary exists")
        .current_dir(dir.path())
        .env("OUTPUTS_DIR", &outputs)
        .args(["analyze", "--json", "--pass", "other", "--input"])
        .arg(&input)
        .output()
        .expect("run analyze");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    let common = report["common_odds_ratio"].as_f64().unwrap();
    assert!((common - 1.317_485).abs() < 1e-5);
    let cmh = report["cmh"]["statistic"].as_f64().unwrap();
    assert!((cmh - 5.320_928).abs() < 1e-5);
    assert_eq!(report["strata"].as_array().unwrap().len(), 4);

    let csv = fs::read_to_string(outputs.join("strata_report.csv")).expect("report csv");
    assert!(csv.starts_with("label,pass0,fail0,pass1,fail1,total"));
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn analyze_fails_on_unknown_pass_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_mussels(dir.path());

    Command::cargo_bin("strata-scope")
        .expect("binary exists")
        .current_dir(dir.path())
        .env("OUTPUTS_DIR", dir.path().join("outputs"))
        .args(["analyze", "--pass", "nope", "--input"])
        .arg(&input)
        .assert()
        .failure();
}
