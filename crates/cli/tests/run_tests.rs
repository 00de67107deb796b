// End-to-end tests for `skucheck run` and friends.
// Run with: cargo test -p skucheck-cli --test run_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Data, Reader};
use httpmock::prelude::*;

const ID1: &str = "6F81-5844-456A";
const ID2: &str = "9431-7B4F-6AA0";
const ID3: &str = "C3BE-24A5-0975";

fn skucheck() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_skucheck"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    skucheck().args(args).output().expect("failed to run skucheck")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {code}, got {:?}\nstderr: {}",
        output.status.code(),
        stderr(output),
    );
}

/// Two reference pages: `compute-engine` lists ID1, `cloud-storage` lists ID2.
fn serve_pages(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/skus/compute-engine");
        then.status(200)
            .header("content-type", "text/html")
            .body(format!("<table><tr><td>{ID1}</td><td>N1 Core</td></tr></table>"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/skus/cloud-storage");
        then.status(200)
            .header("content-type", "text/html")
            .body(format!("<table><tr><td>{ID2}</td><td>Standard</td></tr></table>"));
    });
}

/// Writes billing.csv and config.yaml into `dir`, returns the config path.
fn write_project(dir: &Path, urls: &[String], mode: bool) -> PathBuf {
    std::fs::write(
        dir.join("billing.csv"),
        format!(
            "SKU ID,SKU description,Subtotal ($)\n\
             {ID1},N1 Core,120.5\n\
             {ID2},Standard Storage,45\n\
             {ID3},Egress,9.99\n"
        ),
    )
    .unwrap();

    let mut yaml = String::from("config:\n  urls:\n");
    for url in urls {
        yaml.push_str(&format!("    - {url}\n"));
    }
    yaml.push_str(&format!("  filename: billing.csv\n  mode: {mode}\n"));

    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

fn read_report(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook = open_workbook_auto(path).expect("report should open");
    let range = workbook
        .worksheet_range("SKU Report")
        .expect("sheet 'SKU Report' should exist");
    range.rows().map(|r| r.to_vec()).collect()
}

fn text(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        other => panic!("expected string cell, got {other:?}"),
    }
}

#[test]
fn found_mode_writes_matched_skus_with_groups() {
    let server = MockServer::start();
    serve_pages(&server);
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(
        dir.path(),
        &[server.url("/skus/compute-engine"), server.url("/skus/cloud-storage")],
        true,
    );

    let output = run(&["run", config.to_str().unwrap(), "--quiet"]);
    assert_code(&output, 0);

    let rows = read_report(&dir.path().join("SKU_Report/found_skus_report.xlsx"));
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0].iter().map(text).collect::<Vec<_>>(),
        vec!["Service ID", "SKU description", "Cost ($)", "SKU Group"]
    );
    // Sorted by group: cloud-storage before compute-engine
    assert_eq!(text(&rows[1][0]), ID2);
    assert_eq!(text(&rows[1][3]), "cloud-storage");
    assert_eq!(text(&rows[2][0]), ID1);
    assert_eq!(rows[2][2], Data::Float(120.5));
    assert_eq!(text(&rows[2][3]), "compute-engine");

    assert!(!dir.path().join("SKU_Report/not_found_skus_report.xlsx").exists());
}

#[test]
fn not_found_mode_writes_unmatched_skus() {
    let server = MockServer::start();
    serve_pages(&server);
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(
        dir.path(),
        &[server.url("/skus/compute-engine"), server.url("/skus/cloud-storage")],
        false,
    );

    let output = run(&["run", config.to_str().unwrap(), "--quiet"]);
    assert_code(&output, 0);

    let rows = read_report(&dir.path().join("SKU_Report/not_found_skus_report.xlsx"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 3);
    assert_eq!(text(&rows[1][0]), ID3);
}

#[test]
fn failed_fetch_is_skipped_and_run_succeeds() {
    let server = MockServer::start();
    serve_pages(&server);
    server.mock(|when, then| {
        when.method(GET).path("/skus/retired");
        then.status(500);
    });
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(
        dir.path(),
        &[server.url("/skus/retired"), server.url("/skus/compute-engine")],
        true,
    );

    let output = run(&["run", config.to_str().unwrap()]);
    assert_code(&output, 0);
    let err = stderr(&output);
    assert!(err.contains("HTTP 500"), "stderr: {err}");

    let rows = read_report(&dir.path().join("SKU_Report/found_skus_report.xlsx"));
    assert_eq!(rows.len(), 2);
    assert_eq!(text(&rows[1][0]), ID1);
}

#[test]
fn duplicate_sku_across_pages_warns() {
    let server = MockServer::start();
    serve_pages(&server);
    server.mock(|when, then| {
        when.method(GET).path("/skus/networking");
        then.status(200).body(format!("<td>{ID1}</td>"));
    });
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(
        dir.path(),
        &[server.url("/skus/compute-engine"), server.url("/skus/networking")],
        true,
    );

    let output = run(&["run", config.to_str().unwrap(), "--quiet"]);
    assert_code(&output, 0);
    let err = stderr(&output);
    assert!(
        err.contains(&format!("SKU {ID1} found in both compute-engine and networking")),
        "stderr: {err}"
    );

    // Later page wins by default
    let rows = read_report(&dir.path().join("SKU_Report/found_skus_report.xlsx"));
    assert_eq!(text(&rows[1][3]), "networking");
}

#[test]
fn json_summary_and_mode_override() {
    let server = MockServer::start();
    serve_pages(&server);
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(
        dir.path(),
        &[server.url("/skus/compute-engine"), server.url("/skus/cloud-storage")],
        true,
    );

    let output = run(&["run", config.to_str().unwrap(), "--not-found", "--json", "--quiet"]);
    assert_code(&output, 0);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["meta"]["selection"], "not_found");
    assert_eq!(json["meta"]["duplicate_policy"], "last_wins");
    assert_eq!(json["summary"]["input_records"], 3);
    assert_eq!(json["summary"]["found"], 2);
    assert_eq!(json["summary"]["not_found"], 1);
    assert!(json["report_path"]
        .as_str()
        .unwrap()
        .ends_with("not_found_skus_report.xlsx"));
}

#[test]
fn missing_column_exits_4_and_lists_columns() {
    let server = MockServer::start();
    serve_pages(&server);
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(dir.path(), &[server.url("/skus/compute-engine")], true);
    std::fs::write(
        dir.path().join("billing.csv"),
        "SKU ID,Description,Subtotal ($)\nX,Y,1\n",
    )
    .unwrap();

    let output = run(&["run", config.to_str().unwrap(), "--quiet"]);
    assert_code(&output, 4);
    let err = stderr(&output);
    assert!(err.contains("column 'SKU description' not found"), "stderr: {err}");
    assert!(err.contains("'SKU ID', 'Description', 'Subtotal ($)'"), "stderr: {err}");
    assert!(!dir.path().join("SKU_Report").exists());
}

#[test]
fn unreadable_cost_drops_row_and_run_succeeds() {
    let server = MockServer::start();
    serve_pages(&server);
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(
        dir.path(),
        &[server.url("/skus/compute-engine"), server.url("/skus/cloud-storage")],
        true,
    );
    std::fs::write(
        dir.path().join("billing.csv"),
        format!(
            "SKU ID,SKU description,Subtotal ($)\n\
             {ID1},N1 Core,120.5\n\
             {ID2},Standard Storage,\"1,234.56\"\n"
        ),
    )
    .unwrap();

    let output = run(&["run", config.to_str().unwrap(), "--quiet"]);
    assert_code(&output, 0);
    let err = stderr(&output);
    assert!(err.contains(&format!("row 3 (SKU '{ID2}')")), "stderr: {err}");

    let rows = read_report(&dir.path().join("SKU_Report/found_skus_report.xlsx"));
    assert_eq!(rows.len(), 2);
    assert_eq!(text(&rows[1][0]), ID1);
}

#[test]
fn missing_config_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("config.yaml");
    let output = run(&["run", missing.to_str().unwrap()]);
    assert_code(&output, 3);
}

#[test]
fn invalid_config_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "config:\n  urls: []\n  filename: billing.csv\n  mode: true\n").unwrap();

    let output = run(&["validate", path.to_str().unwrap()]);
    assert_code(&output, 3);
    assert!(stderr(&output).contains("at least one url is required"));
}

#[test]
fn validate_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(dir.path(), &["https://cloud.example.com/skus/a".into()], true);

    let output = run(&["validate", config.to_str().unwrap()]);
    assert_code(&output, 0);
    assert!(stderr(&output).contains("found_skus_report.xlsx"));

    std::fs::remove_file(dir.path().join("billing.csv")).unwrap();
    let output = run(&["validate", config.to_str().unwrap()]);
    assert_code(&output, 4);
}

#[test]
fn extract_prints_sorted_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    std::fs::write(&page, format!("<td>{ID2}</td> text {ID1} <td>{ID2}</td>")).unwrap();

    let output = run(&["extract", page.to_str().unwrap()]);
    assert_code(&output, 0);
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{ID1}\n{ID2}\n"));
}

#[test]
fn group_prints_last_path_segment() {
    let output = run(&["group", "https://cloud.example.com/skus/compute-engine/"]);
    assert_code(&output, 0);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "compute-engine");
}

#[test]
fn convert_csv_to_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &["https://cloud.example.com/skus/a".into()], true);
    let input = dir.path().join("billing.csv");

    let output = run(&["convert", input.to_str().unwrap()]);
    assert_code(&output, 0);

    let mut workbook = open_workbook_auto(dir.path().join("billing.xlsx")).unwrap();
    let sheet = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&sheet).unwrap();
    assert_eq!(range.rows().count(), 4);
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = run(&["frobnicate"]);
    assert_code(&output, 2);
}
