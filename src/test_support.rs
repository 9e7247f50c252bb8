use chrono::NaiveDate;

use crate::domain::assignment::{Assignee, Assignment};
use crate::domain::work_item::{DependencyRef, ItemStatus, WorkItem};

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn build_assignment(id: &str, deps: &[&str]) -> Assignment {
    let mut item = WorkItem::new(id, &format!("Title {id}"));
    item.status = ItemStatus::ToDo;
    item.dependencies = deps.iter().map(|dep| DependencyRef::new(dep)).collect();
    Assignment::new(
        item,
        Assignee {
            id: format!("u-{id}"),
            name: format!("Dev {id}"),
        },
    )
}

pub fn build_done_assignment(id: &str, done: NaiveDate) -> Assignment {
    let mut assignment = build_assignment(id, &[]);
    assignment.status = ItemStatus::Done;
    assignment.item.status = ItemStatus::Done;
    assignment.done_date = Some(done);
    assignment.item.done_date = Some(done);
    assignment
}
