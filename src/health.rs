//! Project health scoring.
//!
//! `assess` turns one project and its tasks into a qualitative label, a list of
//! risk factors, a list of recommendations and a completion forecast. The label is
//! derived from a single score so that more completed work or fewer overdue tasks
//! can never make it worse. Risk factors and recommendations come from the
//! [`RULES`] table, evaluated top to bottom; each rule looks at the shared
//! [`HealthContext`] on its own and either contributes one message or stays silent.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analytics::overdue_count;
use crate::error::ValidationError;
use crate::fields::{ProjectStatus, TaskPriority, TaskStatus};
use crate::project::Project;
use crate::task::Task;

/// Overdue share above which overdue work is flagged as a risk.
const OVERDUE_RISK_RATIO: f64 = 0.10;
/// How far elapsed schedule may run ahead of completion before it is flagged.
const SCHEDULE_SLIP: f64 = 0.25;
/// Logged hours over estimate that count as an overrun.
const EFFORT_OVERRUN: f64 = 1.20;
/// Percentage points recorded progress may drift from task completion.
const PROGRESS_DRIFT: f64 = 20.0;
const REVIEW_BACKLOG: usize = 3;

/// Overall health, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HealthLabel {
    Critical,
    #[serde(rename = "At Risk")]
    AtRisk,
    Good,
    Excellent,
}

impl HealthLabel {
    /// Map a score in `[-1, 1]` onto a label. Higher scores never map lower.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            HealthLabel::Excellent
        } else if score >= 0.40 {
            HealthLabel::Good
        } else if score >= 0.0 {
            HealthLabel::AtRisk
        } else {
            HealthLabel::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthLabel::Critical => "Critical",
            HealthLabel::AtRisk => "At Risk",
            HealthLabel::Good => "Good",
            HealthLabel::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The derived judgement for a single project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAssessment {
    pub health_label: HealthLabel,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    pub predicted_completion: String,
}

/// Ratios the label and the rules are computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthMetrics {
    pub total_tasks: usize,
    pub done_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_ratio: f64,
    pub overdue_ratio: f64,
    /// Elapsed share of the planned schedule, `None` without both dates.
    pub schedule_position: Option<f64>,
}

impl HealthMetrics {
    pub fn compute(project: &Project, tasks: &[Task], now: DateTime<Utc>) -> Self {
        let total_tasks = tasks.len();
        let done_tasks = tasks.iter().filter(|t| t.is_done()).count();
        let overdue_tasks = overdue_count(tasks, now);
        HealthMetrics {
            total_tasks,
            done_tasks,
            overdue_tasks,
            completion_ratio: ratio(done_tasks, total_tasks),
            overdue_ratio: ratio(overdue_tasks, total_tasks),
            schedule_position: schedule_position(project, now),
        }
    }

    /// Completion minus overdue share, in `[-1, 1]`.
    pub fn score(&self) -> f64 {
        self.completion_ratio - self.overdue_ratio
    }

    pub fn label(&self) -> HealthLabel {
        HealthLabel::from_score(self.score())
    }

    pub fn remaining_tasks(&self) -> usize {
        self.total_tasks - self.done_tasks
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn schedule_position(project: &Project, now: DateTime<Utc>) -> Option<f64> {
    let (start, end) = (project.start_date?, project.end_date?);
    let span = (end - start).num_days();
    if span <= 0 {
        return None;
    }
    let elapsed = (now.date_naive() - start).num_days();
    Some((elapsed as f64 / span as f64).clamp(0.0, 1.0))
}

/// Everything a rule may look at.
pub struct HealthContext<'a> {
    pub project: &'a Project,
    pub tasks: &'a [Task],
    pub metrics: HealthMetrics,
    pub now: DateTime<Utc>,
}

impl<'a> HealthContext<'a> {
    fn open_tasks(&self) -> impl Iterator<Item = &'a Task> {
        self.tasks.iter().filter(|t| !t.is_done())
    }
}

/// Which list a rule's message lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Risk,
    Recommendation,
}

/// A named, independently evaluable check.
pub struct HealthRule {
    pub name: &'static str,
    pub kind: RuleKind,
    pub check: fn(&HealthContext<'_>) -> Option<String>,
}

/// Rules in evaluation order.
pub static RULES: &[HealthRule] = &[
    HealthRule {
        name: "overdue-tasks",
        kind: RuleKind::Risk,
        check: risk_overdue,
    },
    HealthRule {
        name: "behind-schedule",
        kind: RuleKind::Risk,
        check: risk_behind_schedule,
    },
    HealthRule {
        name: "past-end-date",
        kind: RuleKind::Risk,
        check: risk_past_end_date,
    },
    HealthRule {
        name: "open-critical",
        kind: RuleKind::Risk,
        check: risk_open_critical,
    },
    HealthRule {
        name: "effort-overrun",
        kind: RuleKind::Risk,
        check: risk_effort_overrun,
    },
    HealthRule {
        name: "on-hold",
        kind: RuleKind::Risk,
        check: risk_on_hold,
    },
    HealthRule {
        name: "no-tasks",
        kind: RuleKind::Recommendation,
        check: rec_no_tasks,
    },
    HealthRule {
        name: "reschedule-overdue",
        kind: RuleKind::Recommendation,
        check: rec_reschedule_overdue,
    },
    HealthRule {
        name: "assign-tasks",
        kind: RuleKind::Recommendation,
        check: rec_assign_tasks,
    },
    HealthRule {
        name: "add-team",
        kind: RuleKind::Recommendation,
        check: rec_add_team,
    },
    HealthRule {
        name: "set-schedule",
        kind: RuleKind::Recommendation,
        check: rec_set_schedule,
    },
    HealthRule {
        name: "review-backlog",
        kind: RuleKind::Recommendation,
        check: rec_review_backlog,
    },
    HealthRule {
        name: "add-estimates",
        kind: RuleKind::Recommendation,
        check: rec_add_estimates,
    },
    HealthRule {
        name: "refresh-progress",
        kind: RuleKind::Recommendation,
        check: rec_refresh_progress,
    },
];

fn pct(r: f64) -> String {
    format!("{:.0}%", r * 100.0)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn risk_overdue(ctx: &HealthContext<'_>) -> Option<String> {
    let m = &ctx.metrics;
    (m.overdue_tasks > 0 && m.overdue_ratio > OVERDUE_RISK_RATIO).then(|| {
        format!(
            "{} of {} are overdue ({})",
            m.overdue_tasks,
            plural(m.total_tasks, "task"),
            pct(m.overdue_ratio)
        )
    })
}

fn risk_behind_schedule(ctx: &HealthContext<'_>) -> Option<String> {
    let elapsed = ctx.metrics.schedule_position?;
    let done = ctx.metrics.completion_ratio;
    (ctx.metrics.total_tasks > 0 && elapsed - done >= SCHEDULE_SLIP).then(|| {
        format!(
            "Behind schedule: {} of the timeline has elapsed but only {} of tasks are done",
            pct(elapsed),
            pct(done)
        )
    })
}

fn risk_past_end_date(ctx: &HealthContext<'_>) -> Option<String> {
    let end = ctx.project.end_date?;
    let late_by = (ctx.now.date_naive() - end).num_days();
    (late_by > 0 && ctx.project.status.is_open() && ctx.metrics.remaining_tasks() > 0).then(|| {
        format!(
            "Planned end date {end} passed {} ago with {} still open",
            plural(late_by as usize, "day"),
            plural(ctx.metrics.remaining_tasks(), "task")
        )
    })
}

fn risk_open_critical(ctx: &HealthContext<'_>) -> Option<String> {
    let n = ctx
        .open_tasks()
        .filter(|t| t.priority == TaskPriority::Critical)
        .count();
    (n > 0).then(|| format!("{} still open", plural(n, "critical-priority task")))
}

fn risk_effort_overrun(ctx: &HealthContext<'_>) -> Option<String> {
    let (estimated, actual) = ctx
        .tasks
        .iter()
        .filter_map(|t| Some((t.estimated_hours?, t.actual_hours?)))
        .fold((0.0, 0.0), |(e, a), (te, ta)| (e + te, a + ta));
    if estimated <= 0.0 {
        return None;
    }
    (actual > estimated * EFFORT_OVERRUN).then(|| {
        format!(
            "Logged effort exceeds estimates by {} ({actual:.1}h vs {estimated:.1}h)",
            pct(actual / estimated - 1.0)
        )
    })
}

fn risk_on_hold(ctx: &HealthContext<'_>) -> Option<String> {
    (ctx.project.status == ProjectStatus::OnHold)
        .then(|| "Project is on hold; open work is not progressing".to_string())
}

fn rec_no_tasks(ctx: &HealthContext<'_>) -> Option<String> {
    (ctx.metrics.total_tasks == 0)
        .then(|| "Break the project down into tasks so progress can be tracked".to_string())
}

fn rec_reschedule_overdue(ctx: &HealthContext<'_>) -> Option<String> {
    let n = ctx.metrics.overdue_tasks;
    (n > 0).then(|| format!("Reschedule or reprioritise the {}", plural(n, "late task")))
}

fn rec_assign_tasks(ctx: &HealthContext<'_>) -> Option<String> {
    let n = ctx.open_tasks().filter(|t| t.assignee_id.is_none()).count();
    (n > 0).then(|| format!("Assign owners to {}", plural(n, "unassigned task")))
}

fn rec_add_team(ctx: &HealthContext<'_>) -> Option<String> {
    (ctx.project.team_members.is_empty() && ctx.project.status.is_open())
        .then(|| "Add team members to share the workload".to_string())
}

fn rec_set_schedule(ctx: &HealthContext<'_>) -> Option<String> {
    (ctx.project.start_date.is_none() || ctx.project.end_date.is_none())
        .then(|| "Set start and end dates to enable schedule tracking".to_string())
}

fn rec_review_backlog(ctx: &HealthContext<'_>) -> Option<String> {
    let in_review = ctx.tasks.iter().filter(|t| t.status == TaskStatus::Review).count();
    (in_review >= REVIEW_BACKLOG).then(|| {
        format!("Clear the review queue: {} awaiting review", plural(in_review, "task"))
    })
}

fn rec_add_estimates(ctx: &HealthContext<'_>) -> Option<String> {
    let n = ctx.open_tasks().filter(|t| t.estimated_hours.is_none()).count();
    (n > 0).then(|| format!("Add effort estimates to {}", plural(n, "open task")))
}

fn rec_refresh_progress(ctx: &HealthContext<'_>) -> Option<String> {
    if ctx.metrics.total_tasks == 0 {
        return None;
    }
    let from_tasks = ctx.metrics.completion_ratio * 100.0;
    ((ctx.project.progress - from_tasks).abs() > PROGRESS_DRIFT).then(|| {
        format!(
            "Recorded progress ({:.0}%) differs from task completion ({from_tasks:.0}%); \
             update the project progress",
            ctx.project.progress
        )
    })
}

/// Textual forecast from the remaining task count and weekly throughput so far.
fn predict_completion(ctx: &HealthContext<'_>) -> String {
    let m = &ctx.metrics;
    if m.total_tasks == 0 {
        return "Insufficient data: no tasks recorded".to_string();
    }
    let remaining = m.remaining_tasks();
    if remaining == 0 {
        return "All tasks are complete".to_string();
    }

    let tracking_start = ctx
        .project
        .start_date
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .or_else(|| ctx.tasks.iter().filter_map(|t| t.created_at).min());
    let Some(start) = tracking_start else {
        warn!(project = %ctx.project.id, "no start date or task timestamps; skipping velocity");
        return format!("Insufficient data to estimate; {} remaining", plural(remaining, "task"));
    };

    let weeks_elapsed = (ctx.now - start).num_days() as f64 / 7.0;
    if m.done_tasks == 0 || weeks_elapsed <= 0.0 {
        return format!(
            "Insufficient history to estimate; {} remaining",
            plural(remaining, "task")
        );
    }

    let velocity = m.done_tasks as f64 / weeks_elapsed;
    let weeks_left = remaining as f64 / velocity;
    let eta = Duration::try_days((weeks_left * 7.0).ceil() as i64)
        .and_then(|ahead| ctx.now.checked_add_signed(ahead));
    let Some(eta) = eta else {
        warn!(project = %ctx.project.id, weeks_left, "projected date out of range");
        return format!(
            "Too slow to project a date at {velocity:.2} tasks/week; {} remaining",
            plural(remaining, "task")
        );
    };
    format!(
        "About {:.1} weeks at the current pace of {velocity:.1} tasks/week (around {})",
        weeks_left,
        eta.date_naive()
    )
}

fn validate(project: &Project, tasks: &[Task]) -> Result<(), ValidationError> {
    project.validate()?;
    for task in tasks {
        if task.project_id != project.id {
            return Err(ValidationError::TaskProjectMismatch {
                task_id: task.id.clone(),
                expected: project.id.clone(),
                found: task.project_id.clone(),
            });
        }
        task.validate()?;
    }
    Ok(())
}

/// Assess the health of `project` given its `tasks` as of `now`.
///
/// Fails only on structurally invalid input, before anything is computed. Absent
/// optional fields silently disable the rules that need them.
pub fn assess(
    project: &Project,
    tasks: &[Task],
    now: DateTime<Utc>,
) -> Result<HealthAssessment, ValidationError> {
    validate(project, tasks)?;

    let ctx = HealthContext {
        project,
        tasks,
        metrics: HealthMetrics::compute(project, tasks, now),
        now,
    };
    debug!(
        project = %project.id,
        completion = ctx.metrics.completion_ratio,
        overdue = ctx.metrics.overdue_ratio,
        schedule = ?ctx.metrics.schedule_position,
        "computed health metrics"
    );

    let mut recommendations = Vec::new();
    let mut risk_factors = Vec::new();
    for rule in RULES {
        if let Some(message) = (rule.check)(&ctx) {
            debug!(rule = rule.name, "health rule fired");
            match rule.kind {
                RuleKind::Risk => risk_factors.push(message),
                RuleKind::Recommendation => recommendations.push(message),
            }
        }
    }

    Ok(HealthAssessment {
        health_label: ctx.metrics.label(),
        recommendations,
        risk_factors,
        predicted_completion: predict_completion(&ctx),
    })
}
