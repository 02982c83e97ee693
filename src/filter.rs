//! Client-side task list filtering and dashboard statistics
//!
//! Pure and synchronous: a filter is a conjunction of independent
//! predicates, so applying them in any order yields the same result set.
//! Role visibility is re-checked here even though the fetch query already
//! enforces it.

use chrono::{DateTime, Utc};

use crate::model::{Role, Task, TaskPriority, TaskStatus};
use crate::policy::Actor;

/// Active list filters; empty/`None` fields match every task
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring over title and description
    pub search: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<String>,
    /// Case-insensitive substring over the assignee email
    pub assigned_to: String,
}

impl TaskFilter {
    /// Whether `task` passes every active predicate
    pub fn matches(&self, task: &Task) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || task.title.to_lowercase().contains(&search)
            || task.description.to_lowercase().contains(&search);
        let matches_status = self.status.map_or(true, |status| task.status == status);
        let matches_priority = self
            .priority
            .map_or(true, |priority| task.priority == priority);
        let matches_project = self
            .project_id
            .as_deref()
            .map_or(true, |id| task.project_id.as_deref() == Some(id));
        let assigned = self.assigned_to.to_lowercase();
        let matches_assigned =
            assigned.is_empty() || task.assigned_to.to_lowercase().contains(&assigned);

        matches_search && matches_status && matches_priority && matches_project && matches_assigned
    }
}

/// Role visibility rule: admins see every fetched row, users only rows
/// assigned to their own email
pub fn visible_to(task: &Task, actor: &Actor) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::User => task.assigned_to == actor.email,
    }
}

/// Apply visibility and the active filters to a task list
pub fn apply<'a>(tasks: &'a [Task], filter: &TaskFilter, actor: &Actor) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| visible_to(task, actor) && filter.matches(task))
        .collect()
}

/// Aggregates shown on the dashboard, computed over the filtered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Past their due date and not completed
    pub overdue: usize,
    /// Completed share of the total, as a rounded percentage
    pub completion_rate: u32,
}

impl TaskStats {
    pub fn compute<'a, I>(tasks: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut total = 0;
        let mut completed = 0;
        let mut in_progress = 0;
        let mut overdue = 0;

        for task in tasks {
            total += 1;
            match task.status {
                TaskStatus::Completed => completed += 1,
                TaskStatus::InProgress => in_progress += 1,
                TaskStatus::Todo => {}
            }
            if let Some(due_date) = task.due_date {
                if due_date < now && task.status != TaskStatus::Completed {
                    overdue += 1;
                }
            }
        }

        let completion_rate = if total > 0 {
            (completed as f64 * 100.0 / total as f64).round() as u32
        } else {
            0
        };

        Self {
            total,
            completed,
            in_progress,
            overdue,
            completion_rate,
        }
    }
}
