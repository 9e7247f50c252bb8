use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;

// Two items finished on consecutive days give a constant velocity of one
// item per day, so the last open item finishes on the first simulated day.
const SPRINT_YAML: &str = r#"
sprints:
  - name: Sprint 1
    status: closed
    start_date: 2026-02-16
    end_date: 2026-02-27
  - name: Sprint 2
    status: in_progress
    start_date: 2026-03-02
    end_date: 2026-03-13
    assignments:
      - id: W-1
        status: Done
        assignee: Kim
        done_date: 2026-03-02
      - id: W-2
        status: Done
        assignee: Kim
        done_date: 2026-03-03
      - id: W-3
        assignee: Lee
"#;

fn sprint_file() -> assert_fs::NamedTempFile {
    let input = assert_fs::NamedTempFile::new("sprint.yaml").unwrap();
    input.write_str(SPRINT_YAML).unwrap();
    input
}

#[test]
fn forecast_prints_a_text_report() {
    let input = sprint_file();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["forecast", "-i"])
        .arg(input.path())
        .args(["--today", "2026-03-04", "-n", "200", "--seed", "7"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("Sprint Forecast Report"))
        .stdout(predicate::str::contains("Items: 3 total, 2 completed, 1 remaining"))
        .stdout(predicate::str::contains("Most likely completion: 2026-03-05 (-8 days)"))
        .stdout(predicate::str::contains("On-time probability: 100.0%"))
        .stdout(predicate::str::contains("Risk: likely on time"));
}

#[test]
fn forecast_writes_json_with_parallel_workers() {
    let input = sprint_file();
    let output = assert_fs::NamedTempFile::new("forecast.json").unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["forecast", "-i"])
        .arg(input.path())
        .args(["--today", "2026-03-04", "-n", "300", "--workers", "3", "--format", "json", "-o"])
        .arg(output.path());
    cmd.assert().success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.path()).unwrap()).unwrap();
    assert_eq!(json["outcome"], "simulated");
    assert_eq!(json["variant"], "sprint");
    assert_eq!(json["converged_runs"], 300);
    assert_eq!(json["most_likely_date"], "2026-03-05");
    assert_eq!(json["delay"], "ahead_of_schedule");
}

#[test]
fn project_forecast_with_config_file() {
    let input = sprint_file();
    let config = assert_fs::NamedTempFile::new("forecast.yaml").unwrap();
    // Wednesday is a holiday, so the open item finishes on Thursday.
    config
        .write_str("simulations: 50\nseed: 3\nfree_date_ranges:\n  - start_date: 2026-03-04\n    end_date: 2026-03-04\n")
        .unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["forecast", "--project", "-i"])
        .arg(input.path())
        .args(["--today", "2026-03-04", "--format", "yaml", "-c"])
        .arg(config.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("variant: project"))
        .stdout(predicate::str::contains("simulations: 50"))
        .stdout(predicate::str::contains("most_likely_date: 2026-03-06"));
}

#[test]
fn forecast_of_an_empty_sprint_reports_insufficient_data() {
    let input = sprint_file();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["forecast", "-i"])
        .arg(input.path())
        .args(["--sprint", "Sprint 1", "--today", "2026-03-04", "--format", "markdown"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# Sprint Forecast"))
        .stdout(predicate::str::contains("No items to forecast"));
}

#[test]
fn forecast_rejects_a_bad_today_value() {
    let input = sprint_file();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["forecast", "-i"])
        .arg(input.path())
        .args(["--today", "04.03.2026"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("04.03.2026"));
}
