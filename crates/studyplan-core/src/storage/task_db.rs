//! SQLite-backed task store.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use super::data_dir;
use super::migrations;
use super::store::{TaskFilter, TaskPatch, TaskStore};
use crate::error::{DatabaseError, Result};
use crate::task::{Task, TaskPlan, TaskStatus};

const TASK_COLUMNS: &str = "id, title, course, notes, due_at, est_mins, priority, status, tags, plan, created_at, updated_at";

/// Timestamps are stored in one fixed-width UTC format so that text ordering
/// matches chronological ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_datetime(column: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow {
            table: "tasks",
            message: format!("{column} '{value}': {e}"),
        })
}

/// Raw column values of one `tasks` row.
struct TaskRow {
    id: String,
    title: String,
    course: Option<String>,
    notes: Option<String>,
    due_at: String,
    est_mins: i64,
    priority: i64,
    status: String,
    tags: String,
    plan: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            course: row.get(2)?,
            notes: row.get(3)?,
            due_at: row.get(4)?,
            est_mins: row.get(5)?,
            priority: row.get(6)?,
            status: row.get(7)?,
            tags: row.get(8)?,
            plan: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn decode(self) -> Result<Task, DatabaseError> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "tasks",
            message,
        };
        let status: TaskStatus = self.status.parse().map_err(corrupt)?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| corrupt(format!("tags of {}: {e}", self.id)))?;
        let plan: Option<TaskPlan> = self
            .plan
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| corrupt(format!("plan of {}: {e}", self.id)))?;

        Ok(Task {
            due_at: parse_datetime("due_at", &self.due_at)?,
            created_at: parse_datetime("created_at", &self.created_at)?,
            updated_at: parse_datetime("updated_at", &self.updated_at)?,
            id: self.id,
            title: self.title,
            course: self.course,
            notes: self.notes,
            est_mins: self.est_mins,
            priority: self.priority.clamp(1, 5) as u8,
            status,
            tags,
            plan,
        })
    }
}

/// SQLite database for study tasks and their plans.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the task database at `~/.config/studyplan/studyplan.db`.
    ///
    /// Creates the schema if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studyplan.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn write(&self, task: &Task, insert: bool) -> Result<usize> {
        let tags = serde_json::to_string(&task.tags)?;
        let plan = task.plan.as_ref().map(serde_json::to_string).transpose()?;
        let sql = if insert {
            "INSERT INTO tasks (id, title, course, notes, due_at, est_mins, priority, status, tags, plan, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        } else {
            "UPDATE tasks
             SET title = ?2, course = ?3, notes = ?4, due_at = ?5, est_mins = ?6, priority = ?7,
                 status = ?8, tags = ?9, plan = ?10, created_at = ?11, updated_at = ?12
             WHERE id = ?1"
        };
        let changed = self.conn.execute(
            sql,
            params![
                task.id,
                task.title,
                task.course,
                task.notes,
                format_datetime(&task.due_at),
                task.est_mins,
                i64::from(task.priority),
                task.status.as_str(),
                tags,
                plan,
                format_datetime(&task.created_at),
                format_datetime(&task.updated_at),
            ],
        )?;
        Ok(changed)
    }
}

impl TaskStore for TaskDb {
    fn create(&self, task: &Task) -> Result<()> {
        self.write(task, true)?;
        debug!(task_id = %task.id, "task created");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, params![id], TaskRow::from_row)
            .optional()?;
        Ok(row.map(TaskRow::decode).transpose()?)
    }

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(status) = filter.status {
            values.push(status.as_str().to_string());
            clauses.push(format!("status = ?{}", values.len()));
        }
        if let Some(due_before) = &filter.due_before {
            values.push(format_datetime(due_before));
            clauses.push(format!("due_at <= ?{}", values.len()));
        }
        if let Some(course) = &filter.course {
            values.push(course.clone());
            clauses.push(format!("course = ?{}", values.len()));
        }

        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY due_at ASC, created_at ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), TaskRow::from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.decode()?);
        }
        Ok(tasks)
    }

    fn update(&self, id: &str, patch: TaskPatch, now: DateTime<Utc>) -> Result<Option<Task>> {
        let Some(mut task) = self.get(id)? else {
            return Ok(None);
        };
        patch.apply(&mut task, now);
        self.write(&task, false)?;
        Ok(Some(task))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn replace(&self, task: &Task) -> Result<bool> {
        Ok(self.write(task, false)? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{resolve_policy, WindowPlanner};
    use chrono::TimeZone;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, 0, 0).unwrap()
    }

    fn task(title: &str, due: DateTime<Utc>) -> Task {
        Task::new(title, due, 60, utc(1, 0))
    }

    #[test]
    fn create_and_get() {
        let db = TaskDb::open_memory().unwrap();
        let mut t = task("Essay", utc(5, 12));
        t.course = Some("HIST200".into());
        t.tags = vec!["writing".into()];
        db.create(&t).unwrap();

        let loaded = db.get(&t.id).unwrap().unwrap();
        assert_eq!(loaded, t);
        assert!(db.get("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let db = TaskDb::open_memory().unwrap();
        let t = task("Essay", utc(5, 12));
        db.create(&t).unwrap();
        assert!(db.create(&t).is_err());
    }

    #[test]
    fn list_orders_by_deadline_and_filters() {
        let db = TaskDb::open_memory().unwrap();
        let late = task("late", utc(9, 12));
        let mut early = task("early", utc(3, 12));
        early.status = TaskStatus::Doing;
        let mut mid = task("mid", utc(5, 12));
        mid.course = Some("CS101".into());
        for t in [&late, &early, &mid] {
            db.create(t).unwrap();
        }

        let all: Vec<_> = db
            .list(&TaskFilter::default())
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(all, vec!["early", "mid", "late"]);

        let doing = db
            .list(&TaskFilter {
                status: Some(TaskStatus::Doing),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(doing.len(), 1);
        assert_eq!(doing[0].title, "early");

        let before = db
            .list(&TaskFilter {
                due_before: Some(utc(5, 12)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(before.len(), 2);

        let course = db
            .list(&TaskFilter {
                course: Some("CS101".into()),
                status: Some(TaskStatus::Todo),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(course.len(), 1);
        assert_eq!(course[0].title, "mid");
    }

    #[test]
    fn update_persists_plan_and_keeps_id() {
        let db = TaskDb::open_memory().unwrap();
        let t = task("Problem set", utc(2, 20));
        db.create(&t).unwrap();

        let planned = WindowPlanner::new(Utc).plan_task(&t, &resolve_policy(false), utc(2, 9));
        let plan = planned.task.plan.clone().unwrap();
        let updated = db
            .update(&t.id, TaskPatch::with_plan(plan.clone()), utc(2, 9))
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, t.id);
        assert_eq!(updated.updated_at, utc(2, 9));

        let loaded = db.get(&t.id).unwrap().unwrap();
        assert_eq!(loaded.plan, Some(plan));
        assert!(loaded.slots().iter().all(|s| s.task_id == t.id));
    }

    #[test]
    fn update_unknown_returns_none() {
        let db = TaskDb::open_memory().unwrap();
        assert!(db
            .update("nope", TaskPatch::default(), utc(2, 9))
            .unwrap()
            .is_none());
    }

    #[test]
    fn delete_removes_task_with_plan() {
        let db = TaskDb::open_memory().unwrap();
        let t = task("Quiz", utc(3, 12));
        db.create(&t).unwrap();
        assert!(db.delete(&t.id).unwrap());
        assert!(!db.delete(&t.id).unwrap());
        assert!(db.get(&t.id).unwrap().is_none());
    }

    #[test]
    fn corrupt_status_is_reported() {
        let db = TaskDb::open_memory().unwrap();
        let t = task("Quiz", utc(3, 12));
        db.create(&t).unwrap();
        db.conn()
            .execute("UPDATE tasks SET status = 'lost' WHERE id = ?1", params![t.id])
            .unwrap();
        assert!(db.get(&t.id).is_err());
    }
}
