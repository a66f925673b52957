use std::{
    env,
    fs,
    path::PathBuf,
    process::Command,
};

const RANKLIST: &str = r#"{
  "contest": { "title": "Demo Contest", "duration": [60, "min"] },
  "problems": [{ "alias": "A" }, { "alias": "B" }],
  "series": [{
    "title": "R#",
    "segments": [{ "title": "Gold", "style": "gold" }],
    "rule": { "preset": "ICPC", "options": { "count": { "value": [1], "noTied": true } } }
  }],
  "rows": [
    { "user": { "id": "team1", "name": "Team One" }, "statuses": [
      { "result": "FB", "time": [10, "min"], "tries": 1 }, {}
    ] },
    { "user": { "id": "team2", "name": "Team Two" }, "statuses": [
      { "result": "AC", "time": [20, "min"], "tries": 1 },
      { "result": "FB", "time": [30, "min"], "tries": 1 }
    ] }
  ]
}"#;

fn norm_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "")
}

fn write_fixture(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("ranktime_cli_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("contest.json");
    fs::write(&input, RANKLIST).unwrap();
    input
}

/// Table cells of every line after the `---` separator.
fn table_rows(stdout: &str) -> Vec<Vec<String>> {
    stdout
        .lines()
        .skip_while(|l| !l.starts_with("---"))
        .skip(1)
        .filter(|l| l.contains('|'))
        .map(|l| l.split('|').map(|c| c.trim().to_string()).collect())
        .collect()
}

#[test]
fn compute_writes_default_output_json() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("compute_default");
    let expected = input.with_file_name("contest.ranktime.json");
    let _ = fs::remove_file(&expected);

    let out = Command::new(exe)
        .args(["compute", input.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(out.status.success());
    let json = fs::read_to_string(&expected).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["unit"], "min");
    assert_eq!(v["timePoints"].as_array().unwrap().len(), 61);
    assert_eq!(v["totalUsers"], 2);

    let view = &v["views"][0];
    assert_eq!(view["title"], "R#");
    assert_eq!(view["userRankTimePoints"]["team1"][0]["rank"], 1);
    assert_eq!(view["userSolvedEventPoints"]["team1"][0]["fb"], true);
    assert_eq!(view["userSolvedEventPoints"]["team2"][1]["problemAlias"], "B");
    assert_eq!(view["segments"][0]["resolvedColor"], "#f8bf29");
}

#[test]
fn compute_with_explicit_unit_and_output() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("compute_unit");
    let output_path = input.with_file_name("out.json");

    let out = Command::new(exe)
        .args([
            "compute",
            input.to_str().unwrap(),
            "--unit",
            "15min",
            "-o",
            output_path.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(v["timePoints"], serde_json::json!([0.0, 15.0, 30.0, 45.0, 60.0]));
}

#[test]
fn compute_error_output_format_is_stable() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("compute_error");

    let output = Command::new(exe)
        .args(["compute", input.to_str().unwrap(), "--unit", "0min"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("Error: compute failed: "));
    assert!(stderr.contains("Caused by:"));
    assert!(stderr.contains("E2001: bucket unit must be > 0"));
}

#[test]
fn invalid_unit_is_rejected_by_argument_parsing() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("bad_unit");

    let output = Command::new(exe)
        .args(["compute", input.to_str().unwrap(), "--unit", "5 fortnights"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("unknown time unit: fortnights"));
}

#[test]
fn compute_missing_input_file_is_reported() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");

    let missing = env::temp_dir().join(format!("ranktime_cli_missing_input_{}.json", std::process::id()));
    let _ = fs::remove_file(&missing);

    let output = Command::new(exe)
        .args(["compute", missing.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    // OS ごとに I/O error の本文は変わるため prefix だけ固定
    assert!(stderr.contains("Error: failed to read ranklist: "));
    assert!(stderr.contains("Caused by:"));
}

#[test]
fn timeline_prints_rank_changes() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("timeline");

    let output = Command::new(exe)
        .args(["timeline", input.to_str().unwrap(), "--user", "team1", "--unit", "10min"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.starts_with("Timeline of team1 (2 users, view 0)"));

    let rows = table_rows(&stdout);
    assert_eq!(rows, vec![vec!["10", "1", "1", "Gold", "A (FB)"], vec!["30", "2", "1", "-", ""]]);
}

#[test]
fn timeline_unknown_user_is_an_error() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("timeline_unknown");

    let output = Command::new(exe)
        .args(["timeline", input.to_str().unwrap(), "--user", "ghost"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("Error: unknown user: ghost"));
}

#[test]
fn timeline_with_foreign_marker_finds_no_view() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("timeline_marker");

    let output = Command::new(exe)
        .args(["timeline", input.to_str().unwrap(), "--user", "team1", "--marker", "girls"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("Error: no ranking view for user: team1"));
}

#[test]
fn standings_at_time_skips_unranked_users() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");
    let input = write_fixture("standings");

    let output = Command::new(exe)
        .args(["standings", input.to_str().unwrap(), "--at", "15min"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.starts_with("Standings at 15min"));
    assert!(stdout.contains("[0] R#"));

    let rows = table_rows(&stdout);
    assert_eq!(rows, vec![vec!["1", "1", "Gold", "Team One"]]);
}

#[test]
fn help_mentions_subcommands() {
    let exe = env!("CARGO_BIN_EXE_ranktime_cli");

    let output = Command::new(exe).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));

    // clap のヘルプ文言は変わり得るので存在確認だけ
    assert!(stdout.contains("compute"));
    assert!(stdout.contains("timeline"));
    assert!(stdout.contains("standings"));
}
