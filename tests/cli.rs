//! Integration tests for the command-line flow.
use rstest::rstest;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const FIXTURE: &str = "\
date_mise_en_service,puissance_nominale,nbre_pdc,nom_operateur,consolidated_commune,commune,prise_type_2,prise_type_combo_ccs,gratuit,paiement_cb,reservation
2021-04-01,22,2,Izivia,Paris,Paris 1er,true,false,false,true,false
2022-06-15,150,4,Power Dot,Lyon,,1,1,0,yes,TRUE
2023-09-30,7.4,1,Izivia,,Nantes,yes,0,no,true,0
garbage,n/a,,,,,maybe,,,,
";

fn run_report(data: &Path, out: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_irve_report"))
        .arg("--data")
        .arg(data)
        .arg("--output-dir")
        .arg(out)
        .args(extra)
        .env("RUST_LOG", "info")
        .output()
        .unwrap()
}

/// Test a full non-interactive run over every section
#[test]
fn check_all_sections() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("stations.csv");
    fs::write(&data, FIXTURE).unwrap();
    let out = dir.path().join("reports");

    let output = run_report(&data, &out, &["--section", "all"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("I / The State of French EV Today"));
    assert!(stdout.contains("VII / Closing the Infrastructure Gap"));
    assert!(stdout.contains("Shortfall: "));
    assert!(stdout.contains("IX / Data Sources & Methodology"));
    assert!(stdout.contains("Source: stations.csv"));
    assert!(stdout.contains("Total records: 4"));

    for file in [
        "section1_overview.csv",
        "section2_yearly_growth.csv",
        "section3_top_locations.csv",
        "section3_top_operators.csv",
        "section4_charging_speed.csv",
        "section5_connectors.csv",
        "section6_payments.csv",
        "section7_projection.csv",
        "summary.json",
        "section9_data_sources.csv",
    ] {
        assert!(out.join(file).exists(), "missing {file}");
    }

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["total_stations"], 4);
    assert_eq!(summary["total_charge_points"], 7.0);
    assert_eq!(summary["unparsed_cells"]["unparsed_dates"], 1);

    // The consolidated column is the only commune source when present
    let locations = fs::read_to_string(out.join("section3_top_locations.csv")).unwrap();
    assert!(locations.contains("Paris"));
    assert!(!locations.contains("Nantes"));

    let preview = fs::read_to_string(out.join("section9_data_sources.csv")).unwrap();
    assert_eq!(preview.lines().count(), 5);
}

/// Test that the projection table spans the configured window
#[test]
fn check_scenario_window() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("stations.csv");
    fs::write(&data, FIXTURE).unwrap();

    let output = run_report(
        &data,
        dir.path(),
        &["--section", "VII", "--growth-rate", "50", "--base-year", "2025", "--target-year", "2027"],
    );
    assert!(output.status.success(), "{output:?}");

    let csv = fs::read_to_string(dir.path().join("section7_projection.csv")).unwrap();
    let years: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(years, ["2025", "2026", "2027"]);
}

/// Test that load and configuration failures halt with a message
#[rstest]
#[case(&["--section", "I"], "absent.csv", "file not found")]
#[case(&["--section", "I", "--growth-rate", "70"], "stations.csv", "outside 10..=60%")]
#[case(&["--section", "I", "--growth-rate", "33"], "stations.csv", "not a multiple of 5%")]
#[case(&["--section", "I", "--target", "0"], "stations.csv", "must be a positive number")]
#[case(&["--section", "I", "--target=-5"], "stations.csv", "must be a positive number")]
fn check_failures(#[case] args: &[&str], #[case] file: &str, #[case] message: &str) {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("stations.csv"), FIXTURE).unwrap();

    let output = run_report(&dir.path().join(file), dir.path(), args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(message), "{stderr}");
    assert!(!dir.path().join("section1_overview.csv").exists());
}

/// Test that an invalid section is rejected by the argument parser
#[test]
fn check_unknown_section() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("stations.csv");
    fs::write(&data, FIXTURE).unwrap();

    let output = run_report(&data, dir.path(), &["--section", "VIII"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown section"));
}

/// Test that the menu exits cleanly at end of input
#[test]
fn check_menu_quits_on_eof() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("stations.csv");
    fs::write(&data, FIXTURE).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_irve_report"))
        .arg("--data")
        .arg(&data)
        .arg("--output-dir")
        .arg(dir.path())
        .stdin(std::process::Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Exiting the program."));
}
