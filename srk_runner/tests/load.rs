use std::{env, fs};

use srk_schema::{SolutionResult, TimeDuration, TimeUnit};

const RANKLIST: &str = r#"{
  "contest": { "title": "Demo", "duration": [5, "h"] },
  "problems": [{ "alias": "A" }],
  "series": [{ "title": "R#", "rule": { "preset": "ICPC", "options": { "count": { "value": [1] } } } }],
  "rows": [{ "user": { "id": "team1", "name": "Team 1" }, "statuses": [{ "result": "FB", "time": [12, "min"], "tries": 1 }] }]
}"#;

#[test]
fn loads_ranklist_from_str() {
    let ranklist = srk_runner::load_ranklist_json_from_str(RANKLIST).unwrap();
    assert_eq!(ranklist.contest.duration, TimeDuration(5.0, TimeUnit::H));
    assert_eq!(ranklist.rows[0].user.name(), "Team 1");
    assert_eq!(ranklist.icpc_series().count(), 1);
}

#[test]
fn loads_ranklist_from_path() {
    let tmp = env::temp_dir().join(format!("srk_runner_ranklist_{}.json", std::process::id()));
    fs::write(&tmp, RANKLIST).unwrap();

    let ranklist = srk_runner::load_ranklist_json_from_path(&tmp).unwrap();
    assert_eq!(ranklist.rows[0].statuses[0].result, Some(SolutionResult::FirstBlood));
}

#[test]
fn missing_file_reports_path() {
    let missing = env::temp_dir().join(format!("srk_runner_missing_{}.json", std::process::id()));
    let _ = fs::remove_file(&missing);

    let err = srk_runner::load_ranklist_json_from_path(&missing).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.starts_with("failed to read ranklist: "));
    assert!(msg.contains("srk_runner_missing_"));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = srk_runner::load_ranklist_json_from_str("{\"rows\": []}").unwrap_err();
    assert_eq!(err.to_string(), "failed to parse ranklist json");
}

#[test]
fn loads_solution_log() {
    let tmp = env::temp_dir().join(format!("srk_runner_solutions_{}.json", std::process::id()));
    fs::write(
        &tmp,
        r#"[{ "userId": "team1", "problemIndex": 0, "result": "WA", "time": [3, "min"] }]"#,
    )
    .unwrap();

    let solutions = srk_runner::load_solutions_json_from_path(&tmp).unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0].result, SolutionResult::Other("WA".to_string()));
}
