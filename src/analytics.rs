//! Count-by-category aggregation over project and task snapshots.
//!
//! Every function here is a single pass over a caller-supplied slice and returns a
//! freshly built report. Nothing reads the clock: `now` is always a parameter.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::debug;

use crate::fields::{ProjectStatus, TaskPriority, TaskStatus};
use crate::project::Project;
use crate::task::Task;

/// Counts grouped by a categorical key plus scalar totals.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AggregateReport<K: Ord> {
    pub counts: BTreeMap<K, usize>,
    pub total: usize,
    pub overdue: usize,
}

/// Summary across all projects in a snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectAnalytics {
    pub total_projects: usize,
    pub projects_by_status: BTreeMap<ProjectStatus, usize>,
    pub projects_by_month: BTreeMap<String, usize>,
    /// Mean planned duration in days of completed projects.
    pub average_completion_time: Option<f64>,
}

/// Summary across a set of tasks.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskAnalytics {
    pub total_tasks: usize,
    pub tasks_by_status: BTreeMap<TaskStatus, usize>,
    pub tasks_by_priority: BTreeMap<TaskPriority, usize>,
    pub tasks_by_month: BTreeMap<String, usize>,
    pub overdue_tasks: usize,
}

/// Group `items` by the key `key_fn` extracts and count each group.
///
/// Items for which `key_fn` returns `None` are left out of the mapping. Only keys
/// that occur in the input appear in the result.
pub fn aggregate<T, K, F>(items: &[T], key_fn: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&T) -> Option<K>,
{
    let mut counts = BTreeMap::new();
    for key in items.iter().filter_map(key_fn) {
        *counts.entry(key).or_default() += 1;
    }
    counts
}

pub fn total_count<T>(items: &[T]) -> usize {
    items.len()
}

/// Number of tasks due strictly before `now` that are not done.
pub fn overdue_count(tasks: &[Task], now: DateTime<Utc>) -> usize {
    tasks.iter().filter(|t| t.is_overdue(now)).count()
}

/// Format a timestamp as its `YYYY-MM` month key.
pub fn month_key(ts: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", ts.year(), ts.month())
}

/// Group `items` by the calendar month of the timestamp `date_fn` extracts.
pub fn by_month<T, F>(items: &[T], date_fn: F) -> BTreeMap<String, usize>
where
    F: Fn(&T) -> Option<DateTime<Utc>>,
{
    aggregate(items, |item| date_fn(item).map(month_key))
}

/// Grouped task counts with total and overdue figures attached.
pub fn task_report<K, F>(tasks: &[Task], key_fn: F, now: DateTime<Utc>) -> AggregateReport<K>
where
    K: Ord,
    F: Fn(&Task) -> Option<K>,
{
    AggregateReport {
        counts: aggregate(tasks, key_fn),
        total: total_count(tasks),
        overdue: overdue_count(tasks, now),
    }
}

pub fn project_analytics(projects: &[Project]) -> ProjectAnalytics {
    let report = ProjectAnalytics {
        total_projects: total_count(projects),
        projects_by_status: aggregate(projects, |p| Some(p.status)),
        projects_by_month: by_month(projects, |p| p.created_at),
        average_completion_time: average_completion_days(projects),
    };
    debug!(total = report.total_projects, "aggregated project analytics");
    report
}

pub fn task_analytics(tasks: &[Task], now: DateTime<Utc>) -> TaskAnalytics {
    let report = TaskAnalytics {
        total_tasks: total_count(tasks),
        tasks_by_status: aggregate(tasks, |t| Some(t.status)),
        tasks_by_priority: aggregate(tasks, |t| Some(t.priority)),
        tasks_by_month: by_month(tasks, |t| t.created_at),
        overdue_tasks: overdue_count(tasks, now),
    };
    debug!(
        total = report.total_tasks,
        overdue = report.overdue_tasks,
        "aggregated task analytics"
    );
    report
}

/// Open tasks per assignee. Unassigned tasks are not counted.
pub fn workload(tasks: &[Task]) -> BTreeMap<String, usize> {
    aggregate(tasks, |t| {
        if t.is_done() {
            None
        } else {
            t.assignee_id.clone()
        }
    })
}

/// Mean of `end_date - start_date` in days over completed projects with both dates.
fn average_completion_days(projects: &[Project]) -> Option<f64> {
    let durations: Vec<i64> = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Completed)
        .filter_map(Project::planned_days)
        .collect();
    if durations.is_empty() {
        return None;
    }
    Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn task(id: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        let mut t = Task::new(id, id, "p1");
        t.status = status;
        t.priority = priority;
        t
    }

    #[test]
    fn test_empty_input() {
        let tasks: Vec<Task> = Vec::new();
        assert!(aggregate(&tasks, |t| Some(t.status)).is_empty());
        assert!(by_month(&tasks, |t| t.created_at).is_empty());
        assert_eq!(total_count(&tasks), 0);
        assert_eq!(overdue_count(&tasks, now()), 0);

        let report = task_analytics(&tasks, now());
        assert_eq!(report.total_tasks, 0);
        assert!(report.tasks_by_status.is_empty());

        let projects = project_analytics(&[]);
        assert_eq!(projects.total_projects, 0);
        assert_eq!(projects.average_completion_time, None);
    }

    #[test]
    fn test_aggregate_keeps_singletons_and_invents_nothing() {
        let tasks = vec![
            task("a", TaskStatus::Todo, TaskPriority::Low),
            task("b", TaskStatus::Todo, TaskPriority::Low),
            task("c", TaskStatus::Review, TaskPriority::Critical),
        ];
        let by_status = aggregate(&tasks, |t| Some(t.status));
        assert_eq!(by_status.len(), 2);
        assert_eq!(by_status[&TaskStatus::Todo], 2);
        assert_eq!(by_status[&TaskStatus::Review], 1);
        assert!(!by_status.contains_key(&TaskStatus::Done));
    }

    #[test]
    fn test_missing_keys_excluded_but_counted_in_total() {
        let mut tasks = vec![
            task("a", TaskStatus::Todo, TaskPriority::Low),
            task("b", TaskStatus::Todo, TaskPriority::Low),
        ];
        tasks[0].assignee_id = Some("u1".into());
        let by_assignee = aggregate(&tasks, |t| t.assignee_id.clone());
        assert_eq!(by_assignee.values().sum::<usize>(), 1);
        assert_eq!(total_count(&tasks), 2);
    }

    #[test]
    fn test_overdue_boundary() {
        let mut t = task("a", TaskStatus::Todo, TaskPriority::Medium);
        t.due_date = Some(now() - Duration::days(1));
        assert_eq!(overdue_count(std::slice::from_ref(&t), now()), 1);

        t.status = TaskStatus::Done;
        assert_eq!(overdue_count(&[t], now()), 0);
    }

    #[test]
    fn test_by_month_keys_are_sortable() {
        let mut a = task("a", TaskStatus::Todo, TaskPriority::Low);
        a.created_at = Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 0).unwrap());
        let mut b = task("b", TaskStatus::Todo, TaskPriority::Low);
        b.created_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let c = task("c", TaskStatus::Todo, TaskPriority::Low);

        let months = by_month(&[b, a, c], |t| t.created_at);
        let keys: Vec<&str> = months.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2023-12", "2024-02"]);
    }

    #[test]
    fn test_task_report_totals() {
        let mut late = task("a", TaskStatus::InProgress, TaskPriority::High);
        late.due_date = Some(now() - Duration::hours(2));
        let tasks = vec![late, task("b", TaskStatus::Done, TaskPriority::High)];

        let report = task_report(&tasks, |t| Some(t.priority), now());
        assert_eq!(report.counts[&TaskPriority::High], 2);
        assert_eq!(report.total, 2);
        assert_eq!(report.overdue, 1);
    }

    #[test]
    fn test_workload_counts_open_assigned_tasks() {
        let mut a = task("a", TaskStatus::Todo, TaskPriority::Low);
        a.assignee_id = Some("u1".into());
        let mut b = task("b", TaskStatus::Done, TaskPriority::Low);
        b.assignee_id = Some("u1".into());
        let mut c = task("c", TaskStatus::Review, TaskPriority::Low);
        c.assignee_id = Some("u2".into());

        let load = workload(&[a, b, c]);
        assert_eq!(load["u1"], 1);
        assert_eq!(load["u2"], 1);
    }

    #[test]
    fn test_average_completion_time() {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        let mut done = Project::new("p1", "A", "u1");
        done.status = ProjectStatus::Completed;
        done.start_date = Some(d(1, 1));
        done.end_date = Some(d(1, 11));
        let mut done2 = done.clone();
        done2.id = "p2".into();
        done2.end_date = Some(d(1, 21));
        let mut open = Project::new("p3", "C", "u1");
        open.start_date = Some(d(1, 1));
        open.end_date = Some(d(3, 1));

        let report = project_analytics(&[done, done2, open]);
        assert_eq!(report.average_completion_time, Some(15.0));
        assert_eq!(report.projects_by_status[&ProjectStatus::Completed], 2);
        assert_eq!(report.projects_by_status[&ProjectStatus::Planning], 1);
    }

    #[test]
    fn test_report_serializes_enum_keys() {
        let tasks = vec![task("a", TaskStatus::InProgress, TaskPriority::Low)];
        let json = serde_json::to_value(task_analytics(&tasks, now())).unwrap();
        assert_eq!(json["tasks_by_status"]["in_progress"], 1);
        assert_eq!(json["overdue_tasks"], 0);
    }

    fn arb_task() -> impl Strategy<Value = Task> {
        (
            0usize..4,
            proptest::option::of(0u32..3),
            proptest::option::of(-5i64..5),
        )
            .prop_map(|(status, assignee, due_offset)| {
                let status = [
                    TaskStatus::Todo,
                    TaskStatus::InProgress,
                    TaskStatus::Review,
                    TaskStatus::Done,
                ][status];
                let mut t = task("t", status, TaskPriority::Medium);
                t.assignee_id = assignee.map(|u| format!("u{u}"));
                t.due_date = due_offset.map(|d| now() + Duration::days(d));
                t
            })
    }

    proptest! {
        #[test]
        fn prop_grouped_plus_excluded_equals_total(
            tasks in proptest::collection::vec(arb_task(), 0..40),
        ) {
            let by_assignee = aggregate(&tasks, |t| t.assignee_id.clone());
            let excluded = tasks.iter().filter(|t| t.assignee_id.is_none()).count();
            prop_assert_eq!(by_assignee.values().sum::<usize>() + excluded, total_count(&tasks));

            let by_status = aggregate(&tasks, |t| Some(t.status));
            prop_assert_eq!(by_status.values().sum::<usize>(), total_count(&tasks));
            prop_assert!(by_status.values().all(|&c| c > 0));
        }

        #[test]
        fn prop_overdue_never_exceeds_open(tasks in proptest::collection::vec(arb_task(), 0..40)) {
            let open = tasks.iter().filter(|t| !t.is_done()).count();
            prop_assert!(overdue_count(&tasks, now()) <= open);
        }
    }
}
