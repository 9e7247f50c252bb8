use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Workflow state of a work item. Issue trackers use many spellings for the
/// same state, so parsing is alias tolerant and unknown values are kept
/// verbatim instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ItemStatus {
    ToDo,
    InProgress,
    Done,
    Other(String),
}

/// Status given to dependencies that point outside the analyzed collection
/// and carry no status of their own.
pub const EXTERNAL_STATUS: &str = "EXTERNAL";

impl ItemStatus {
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "todo" | "to do" | "open" | "backlog" => ItemStatus::ToDo,
            "in progress" | "inprogress" | "doing" => ItemStatus::InProgress,
            "done" | "completed" | "complete" | "resolved" | "完了" => ItemStatus::Done,
            _ => ItemStatus::Other(value.trim().to_string()),
        }
    }

    pub fn external() -> Self {
        ItemStatus::Other(EXTERNAL_STATUS.to_string())
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ItemStatus::Done)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::ToDo => write!(f, "TODO"),
            ItemStatus::InProgress => write!(f, "IN_PROGRESS"),
            ItemStatus::Done => write!(f, "DONE"),
            ItemStatus::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Reference from one work item to another it depends on. The target may
/// live outside the analyzed collection; title and status are whatever the
/// issue source cached for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<ItemStatus>,
}

impl DependencyRef {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub status: ItemStatus,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub done_date: Option<NaiveDate>,
    pub dependencies: Vec<DependencyRef>,
}

impl WorkItem {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status: ItemStatus::ToDo,
            start_date: None,
            due_date: None,
            done_date: None,
            dependencies: Vec::new(),
        }
    }
}
