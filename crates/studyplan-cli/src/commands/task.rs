//! Task management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use studyplan_core::{Task, TaskDb, TaskFilter, TaskPatch, TaskStatus, TaskStore};

use super::{parse_tags, parse_when, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Deadline (RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD")
        #[arg(long, value_parser = parse_when)]
        due: chrono::DateTime<Utc>,
        /// Estimated effort in minutes
        #[arg(long, default_value = "60")]
        est: i64,
        /// Course code or name
        #[arg(long)]
        course: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Priority from 1 (highest) to 5
        #[arg(long, default_value = "3", value_parser = clap::value_parser!(u8).range(1..=5))]
        priority: u8,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List tasks, earliest deadline first
    List {
        /// Filter by status (todo, doing, done, blocked)
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Filter by course
        #[arg(long)]
        course: Option<String>,
        /// Only tasks due at or before this time
        #[arg(long, value_parser = parse_when)]
        due_before: Option<chrono::DateTime<Utc>>,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_when)]
        due: Option<chrono::DateTime<Utc>>,
        #[arg(long)]
        est: Option<i64>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        priority: Option<u8>,
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Comma-separated tags (replaces existing tags)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a task and its plan
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    let db = TaskDb::open()?;
    let now = Utc::now();

    match action {
        TaskAction::Add {
            title,
            due,
            est,
            course,
            notes,
            priority,
            tags,
        } => {
            if est <= 0 {
                return Err(format!("--est must be positive, got {est}").into());
            }
            let mut task = Task::new(title, due, est, now);
            task.course = course;
            task.notes = notes;
            task.priority = priority;
            task.tags = tags.as_deref().map(parse_tags).unwrap_or_default();
            db.create(&task)?;
            eprintln!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List {
            status,
            course,
            due_before,
        } => {
            let filter = TaskFilter {
                status,
                due_before,
                course,
            };
            let tasks = db.list(&filter)?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Get { id } => match db.get(&id)? {
            Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
            None => return Err(format!("Task not found: {id}").into()),
        },
        TaskAction::Update {
            id,
            title,
            due,
            est,
            course,
            notes,
            priority,
            status,
            tags,
        } => {
            if est.is_some_and(|e| e <= 0) {
                return Err("--est must be positive".into());
            }
            let patch = TaskPatch {
                title,
                course,
                notes,
                due_at: due,
                est_mins: est,
                priority,
                status,
                tags: tags.as_deref().map(parse_tags),
                plan: None,
            };
            let task = db
                .update(&id, patch, now)?
                .ok_or_else(|| format!("Task not found: {id}"))?;
            eprintln!("Task updated: {id}");
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            if !db.delete(&id)? {
                return Err(format!("Task not found: {id}").into());
            }
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
