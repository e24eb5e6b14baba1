//! End-to-end tests for the geoframe binary

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const TRACTS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"GEOID": "001", "pop": 1200},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[100,0],[100,100],[0,100],[0,0]]]}},
    {"type": "Feature", "properties": {"GEOID": "002", "pop": 800},
     "geometry": {"type": "Polygon", "coordinates": [[[100,0],[200,0],[200,100],[100,100],[100,0]]]}},
    {"type": "Feature", "properties": {"GEOID": "003", "pop": 300},
     "geometry": {"type": "Polygon", "coordinates": [[[200,0],[300,0],[300,100],[200,100],[200,0]]]}}
  ]
}"#;

const SCHOOLS: &str = "name,X,Y\nOak,10,10\nElm,50,50\nAsh,150,50\nFir,500,500\n";

const INCOME: &str = "GEOID,income\n001,52000\n";

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("tracts.geojson"), TRACTS).unwrap();
    std::fs::write(dir.path().join("schools.csv"), SCHOOLS).unwrap();
    std::fs::write(dir.path().join("income.csv"), INCOME).unwrap();
    dir
}

fn geoframe(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_geoframe"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute geoframe")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "geoframe failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Output should be valid JSON")
}

#[test]
fn test_sjoin_writes_geojson() {
    let dir = workspace();
    let output = geoframe(
        dir.path(),
        &[
            "--json", "sjoin", "schools.csv", "tracts.geojson", "--x", "X", "--y", "Y", "--crs",
            "26910", "--right-crs", "26910", "--predicate", "within", "--how", "inner", "-o",
            "joined.geojson",
        ],
    );

    let parsed = json_stdout(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["rows"], 3);
    assert_eq!(parsed["data"]["crs"], 26910);
    assert_eq!(parsed["data"]["steps"][0]["rows_out"], 3);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("joined.geojson")).unwrap()).unwrap();
    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);
    assert_eq!(features[0]["properties"]["name"], "Oak");
    assert_eq!(features[0]["properties"]["GEOID"], "001");
}

#[test]
fn test_left_crs_does_not_tag_right_input() {
    let dir = workspace();
    let output = geoframe(
        dir.path(),
        &["sjoin", "schools.csv", "tracts.geojson", "--x", "X", "--y", "Y", "--crs", "26910"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No CRS set"));
}

#[test]
fn test_dwithin_requires_distance() {
    let dir = workspace();
    let output = geoframe(
        dir.path(),
        &[
            "sjoin", "schools.csv", "tracts.geojson", "--x", "X", "--y", "Y", "--crs", "26910",
            "--right-crs", "26910", "--predicate", "dwithin",
        ],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--distance"));
}

#[test]
fn test_join_key_types_must_agree() {
    let dir = workspace();

    let inferred = geoframe(
        dir.path(),
        &["--json", "join", "tracts.geojson", "income.csv", "--left-on", "GEOID", "--how", "inner"],
    );
    assert_eq!(json_stdout(&inferred)["data"]["rows"], 0);

    let as_text = geoframe(
        dir.path(),
        &[
            "--json", "join", "tracts.geojson", "income.csv", "--left-on", "GEOID", "--how", "inner",
            "--dtype", "GEOID=text",
        ],
    );
    assert_eq!(json_stdout(&as_text)["data"]["rows"], 1);
}

#[test]
fn test_groupby_prints_counts() {
    let dir = workspace();
    let output = geoframe(dir.path(), &["--json", "groupby", "tracts.geojson", "--by", "GEOID"]);

    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["columns"], serde_json::json!(["GEOID", "count"]));
    assert_eq!(parsed["data"]["rows"].as_array().unwrap().len(), 3);
}

#[test]
fn test_config_reports_cli_source() {
    let dir = workspace();
    let output = geoframe(dir.path(), &["--json", "--match-policy", "first", "config"]);

    let parsed = json_stdout(&output);
    let values = parsed["data"]["values"].as_array().unwrap();
    let policy = values.iter().find(|v| v["key"] == "match_policy").unwrap();
    assert_eq!(policy["value"], "first");
    assert_eq!(policy["source"], "Cli");
}
