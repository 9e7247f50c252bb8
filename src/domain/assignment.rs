use chrono::NaiveDate;

use super::work_item::{ItemStatus, WorkItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignee {
    pub id: String,
    pub name: String,
}

/// A work item as it was planned into one sprint. Status and dates are the
/// sprint-scoped values and take precedence over the ones on the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub item: WorkItem,
    pub assignee: Assignee,
    pub status: ItemStatus,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub done_date: Option<NaiveDate>,
}

impl Assignment {
    /// Wraps `item`, seeding the sprint-scoped fields from the item itself.
    pub fn new(item: WorkItem, assignee: Assignee) -> Self {
        Self {
            status: item.status.clone(),
            start_date: item.start_date,
            due_date: item.due_date,
            done_date: item.done_date,
            item,
            assignee,
        }
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }
}
