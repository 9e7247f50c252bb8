use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::assignment::{Assignee, Assignment};
use crate::domain::timebox::{TimeBox, TimeBoxStatus};
use crate::domain::work_item::{DependencyRef, ItemStatus, WorkItem};
use crate::services::date_parsing::{DateParseError, parse_date, parse_date_opt};

#[derive(Error, Debug)]
pub enum SprintYamlError {
    #[error("failed to read sprint yaml {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse sprint yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Date(#[from] DateParseError),
    #[error("issue {issue} has a dependency without an id")]
    MissingDependencyId { issue: String },
    #[error("invalid sprint status value: {0}")]
    InvalidStatus(String),
    #[error("sprint yaml contains no sprints")]
    Empty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SprintFileRecord {
    Many { sprints: Vec<SprintRecord> },
    One(SprintRecord),
}

#[derive(Deserialize)]
struct SprintRecord {
    name: String,
    status: Option<String>,
    start_date: String,
    end_date: String,
    #[serde(default)]
    assignments: Vec<AssignmentRecord>,
}

#[derive(Deserialize)]
struct AssignmentRecord {
    id: String,
    title: Option<String>,
    status: Option<String>,
    assignee: Option<AssigneeRecord>,
    start_date: Option<String>,
    due_date: Option<String>,
    done_date: Option<String>,
    #[serde(default)]
    dependencies: Vec<DependencyRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssigneeRecord {
    Name(String),
    Full { id: Option<String>, name: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DependencyRecord {
    Id(String),
    Full {
        id: String,
        title: Option<String>,
        status: Option<String>,
    },
}

pub fn load_sprints_from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Vec<TimeBox>, SprintYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| SprintYamlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_sprints_from_yaml_str(&contents)
}

/// Accepts either a single sprint document or a `sprints:` list.
pub fn deserialize_sprints_from_yaml_str(input: &str) -> Result<Vec<TimeBox>, SprintYamlError> {
    let records = match serde_yaml::from_str::<SprintFileRecord>(input)? {
        SprintFileRecord::Many { sprints } => sprints,
        SprintFileRecord::One(sprint) => vec![sprint],
    };
    if records.is_empty() {
        return Err(SprintYamlError::Empty);
    }
    records.into_iter().map(timebox_from_record).collect()
}

fn timebox_from_record(record: SprintRecord) -> Result<TimeBox, SprintYamlError> {
    let assignments = record
        .assignments
        .into_iter()
        .map(assignment_from_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TimeBox {
        name: record.name,
        status: parse_timebox_status(record.status.as_deref())?,
        start_date: parse_date(&record.start_date)?,
        end_date: parse_date(&record.end_date)?,
        assignments,
    })
}

fn assignment_from_record(record: AssignmentRecord) -> Result<Assignment, SprintYamlError> {
    let mut item = WorkItem::new(&record.id, record.title.as_deref().unwrap_or_default());
    if let Some(status) = record.status.as_deref() {
        item.status = ItemStatus::parse(status);
    }
    item.start_date = parse_date_opt(record.start_date.as_deref())?;
    item.due_date = parse_date_opt(record.due_date.as_deref())?;
    item.done_date = parse_date_opt(record.done_date.as_deref())?;
    item.dependencies = record
        .dependencies
        .into_iter()
        .map(|dependency| dependency_from_record(&record.id, dependency))
        .collect::<Result<Vec<_>, _>>()?;

    let assignee = match record.assignee {
        Some(AssigneeRecord::Name(name)) => Assignee {
            id: name.clone(),
            name,
        },
        Some(AssigneeRecord::Full { id, name }) => Assignee {
            id: id.unwrap_or_else(|| name.clone()),
            name,
        },
        None => Assignee::default(),
    };

    Ok(Assignment::new(item, assignee))
}

fn dependency_from_record(
    issue: &str,
    record: DependencyRecord,
) -> Result<DependencyRef, SprintYamlError> {
    let dependency = match record {
        DependencyRecord::Id(id) => DependencyRef::new(id.trim()),
        DependencyRecord::Full { id, title, status } => DependencyRef {
            id: id.trim().to_string(),
            title,
            status: status.as_deref().map(ItemStatus::parse),
        },
    };
    if dependency.id.is_empty() {
        return Err(SprintYamlError::MissingDependencyId {
            issue: issue.to_string(),
        });
    }
    Ok(dependency)
}

fn parse_timebox_status(value: Option<&str>) -> Result<TimeBoxStatus, SprintYamlError> {
    let Some(text) = value else {
        return Ok(TimeBoxStatus::Planned);
    };
    let normalized = text.trim().to_lowercase().replace(['-', '_'], " ");
    match normalized.as_str() {
        "planned" => Ok(TimeBoxStatus::Planned),
        "in progress" | "inprogress" | "active" => Ok(TimeBoxStatus::InProgress),
        "closed" => Ok(TimeBoxStatus::Closed),
        _ => Err(SprintYamlError::InvalidStatus(text.to_string())),
    }
}
