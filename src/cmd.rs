//! Command implementations for the CLI interface.
//!
//! Each handler takes the loaded snapshot and the resolved settings, runs the pure
//! analytics or health computation, and renders the result as a text table or JSON.

use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;

use crate::analytics::{overdue_count, project_analytics, task_analytics, workload};
use crate::config::Settings;
use crate::db::*;
use crate::error::Result;
use crate::fields::*;
use crate::health::assess;

#[derive(Subcommand)]
pub enum Commands {
    /// Count projects or tasks by category.
    Analytics {
        #[command(subcommand)]
        target: AnalyticsTarget,
    },

    /// Assess the health of one project.
    Insights {
        /// Project ID or name.
        project: String,
    },

    /// List projects with progress and task counts.
    Projects,

    /// Show open tasks per assignee.
    Workload {
        /// Restrict to one project (ID or name).
        #[arg(long)]
        project: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum AnalyticsTarget {
    /// Projects by status and creation month.
    Projects,
    /// Tasks by status, priority and creation month, with overdue count.
    Tasks {
        /// Restrict to one project (ID or name).
        #[arg(long)]
        project: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print project analytics.
pub fn cmd_analytics_projects(db: &Database, settings: &Settings) -> Result<()> {
    let report = project_analytics(&db.projects);
    if settings.format == OutputFormat::Json {
        return print_json(&report);
    }

    println!("Total projects: {}", report.total_projects);
    match report.average_completion_time {
        Some(days) => println!("Average completion time: {days:.1} days"),
        None => println!("Average completion time: -"),
    }
    println!();
    print_counts(
        "Status",
        report
            .projects_by_status
            .iter()
            .map(|(s, c)| (format_project_status(*s), *c)),
    );
    println!();
    print_counts("Month", report.projects_by_month.iter().map(|(m, c)| (m.as_str(), *c)));
    Ok(())
}

/// Print task analytics, optionally scoped to one project.
pub fn cmd_analytics_tasks(
    db: &Database,
    settings: &Settings,
    project: Option<String>,
) -> Result<()> {
    let tasks = match project {
        Some(ident) => db.tasks_for(&db.resolve_project(&ident)?.id),
        None => db.tasks.clone(),
    };
    let report = task_analytics(&tasks, settings.now);
    if settings.format == OutputFormat::Json {
        return print_json(&report);
    }

    println!("Total tasks: {}", report.total_tasks);
    println!("Overdue tasks: {}", report.overdue_tasks);
    println!();
    print_counts(
        "Status",
        report.tasks_by_status.iter().map(|(s, c)| (format_task_status(*s), *c)),
    );
    println!();
    print_counts(
        "Priority",
        report.tasks_by_priority.iter().map(|(p, c)| (format_priority(*p), *c)),
    );
    println!();
    print_counts("Month", report.tasks_by_month.iter().map(|(m, c)| (m.as_str(), *c)));
    Ok(())
}

/// Print the health assessment for a project.
pub fn cmd_insights(db: &Database, settings: &Settings, project: String) -> Result<()> {
    let project = db.resolve_project(&project)?;
    let tasks = db.tasks_for(&project.id);
    let assessment = assess(project, &tasks, settings.now)?;
    if settings.format == OutputFormat::Json {
        return print_json(&assessment);
    }

    println!("{} [{}]", project.name, project.id);
    println!("Health: {}", assessment.health_label);
    println!("Predicted completion: {}", assessment.predicted_completion);
    println!();
    println!("Risk factors:");
    if assessment.risk_factors.is_empty() {
        println!("  -");
    }
    for risk in &assessment.risk_factors {
        println!("  ! {risk}");
    }
    println!();
    println!("Recommendations:");
    if assessment.recommendations.is_empty() {
        println!("  -");
    }
    for rec in &assessment.recommendations {
        println!("  * {rec}");
    }
    Ok(())
}

#[derive(Serialize)]
struct ProjectRow<'a> {
    id: &'a str,
    name: &'a str,
    status: ProjectStatus,
    progress: f64,
    owner: &'a str,
    tasks: usize,
    overdue: usize,
}

/// List projects with their task counts.
pub fn cmd_projects(db: &Database, settings: &Settings) -> Result<()> {
    let rows: Vec<ProjectRow<'_>> = db
        .projects
        .iter()
        .map(|p| {
            let tasks = db.tasks_for(&p.id);
            ProjectRow {
                id: &p.id,
                name: &p.name,
                status: p.status,
                progress: p.progress,
                owner: db.user_name(&p.owner_id),
                tasks: tasks.len(),
                overdue: overdue_count(&tasks, settings.now),
            }
        })
        .collect();
    if settings.format == OutputFormat::Json {
        return print_json(&rows);
    }

    println!(
        "{:<10} {:<12} {:>8} {:>6} {:>8} {:<14} {}",
        "ID", "Status", "Progress", "Tasks", "Overdue", "Owner", "Name"
    );
    for r in rows {
        println!(
            "{:<10} {:<12} {:>7.0}% {:>6} {:>8} {:<14} {}",
            truncate(r.id, 10),
            format_project_status(r.status),
            r.progress,
            r.tasks,
            r.overdue,
            truncate(r.owner, 14),
            r.name
        );
    }
    Ok(())
}

/// Show open tasks per assignee.
pub fn cmd_workload(db: &Database, settings: &Settings, project: Option<String>) -> Result<()> {
    let tasks = match project {
        Some(ident) => db.tasks_for(&db.resolve_project(&ident)?.id),
        None => db.tasks.clone(),
    };
    let load = workload(&tasks);
    if settings.format == OutputFormat::Json {
        return print_json(&load);
    }
    print_counts(
        "Assignee",
        load.iter().map(|(id, c)| (db.user_name(id), *c)),
    );
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
