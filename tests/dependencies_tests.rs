use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;

const SPRINT_YAML: &str = r#"
name: Sprint 4
status: in_progress
start_date: 2026-03-02
end_date: 2026-03-13
assignments:
  - id: API-1
    title: Define schema
    status: Done
    assignee: Kim
    done_date: 2026-03-03
  - id: API-2
    title: Implement endpoint
    assignee: Lee
    dependencies: [API-1]
  - id: API-3
    title: Wire cache
    assignee: Park
    dependencies:
      - { id: OPS-7, title: Provision cache, status: In Progress }
"#;

#[test]
fn dependencies_writes_markdown_report() {
    let input = assert_fs::NamedTempFile::new("sprint.yaml").unwrap();
    input.write_str(SPRINT_YAML).unwrap();
    let output = assert_fs::NamedTempFile::new("deps.md").unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["dependencies", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let markdown = fs::read_to_string(output.path()).unwrap();
    assert!(markdown.starts_with("# Sprint Dependencies\n```mermaid\nflowchart TD"));
    assert!(markdown.contains("API_2d_1 --> API_2d_2"));
    assert!(markdown.contains("OPS_2d_7 -.-> API_2d_3"));
    assert!(markdown.contains("No circular dependencies detected."));
    assert!(markdown.contains("| 1 | API-1 | Define schema | Kim | DONE | - |"));
    assert!(markdown.contains("| 2 | API-3 | Wire cache | Park | TODO | OPS-7 ⚠ |"));
    assert!(markdown.contains("| 3 | API-2 | Implement endpoint | Lee | TODO | API-1 ✓ |"));
}

#[test]
fn dependencies_reports_cycles_on_stdout() {
    let yaml = r#"
name: Sprint 5
start_date: 2026-03-16
end_date: 2026-03-27
assignments:
  - id: A
    assignee: Kim
    dependencies: [B]
  - id: B
    assignee: Lee
    dependencies: [A]
"#;
    let input = assert_fs::NamedTempFile::new("sprint.yaml").unwrap();
    input.write_str(yaml).unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["dependencies", "-i"]).arg(input.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 circular dependency chain(s) found:"))
        .stdout(predicate::str::contains("- A → B → A"))
        .stdout(predicate::str::contains("| - | A |"));
}

#[test]
fn dependencies_rejects_assignments_without_assignee() {
    let yaml = "name: S\nstart_date: 2026-03-02\nend_date: 2026-03-13\nassignments:\n  - id: A\n";
    let input = assert_fs::NamedTempFile::new("sprint.yaml").unwrap();
    input.write_str(yaml).unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("sprint-analytics");
    cmd.args(["dependencies", "-i"]).arg(input.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("issue A has no assignee name"));
}
