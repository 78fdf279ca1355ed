use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskline_core::{EpochMs, Role, Status, TimeSpan};
use uuid::Uuid;

use crate::time::parse_instant;

/// Event / task / todo planner backed by SQLite.
/// Storage defaults to TASKLINE_DB_PATH or ./taskline.sqlite3.
#[derive(Parser)]
#[command(name = "taskline", version, about = "Plan events, tasks and todos")]
pub struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the core library is linked.
    Ping,
    #[command(subcommand)]
    Event(EventCommand),
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Todo(TodoCommand),
    #[command(subcommand)]
    Sign(SignCommand),
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand)]
pub enum EventCommand {
    /// Create an event.
    Add(EventFields),
    /// List all events.
    List,
    /// Print one event as JSON.
    Show { id: Uuid },
    /// Change the given fields of an event.
    Update {
        id: Uuid,
        #[command(flatten)]
        changes: EventChanges,
    },
    /// Delete an event with its tasks and todos.
    Delete { id: Uuid },
}

#[derive(Args)]
pub struct EventFields {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long, default_value_t = 0)]
    pub priority: i32,
    #[arg(long, default_value = "")]
    pub category: String,
    /// Mark the event as a reusable template.
    #[arg(long)]
    pub template: bool,
}

#[derive(Args)]
pub struct EventChanges {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub priority: Option<i32>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub template: Option<bool>,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task under an event.
    Add {
        #[arg(long)]
        event: Uuid,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// List tasks, optionally for one event.
    List {
        #[arg(long)]
        event: Option<Uuid>,
    },
    Show { id: Uuid },
    /// Change the given fields of a task.
    Update {
        id: Uuid,
        #[command(flatten)]
        changes: TaskChanges,
    },
    /// Delete a task with its todos.
    Delete { id: Uuid },
}

#[derive(Args)]
pub struct TaskFields {
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub parent: Option<Uuid>,
    /// Prerequisite task; repeatable, order is kept.
    #[arg(long = "after")]
    pub pre_tasks: Vec<Uuid>,
    #[arg(long, value_parser = parse_instant)]
    pub allowed_start: Option<EpochMs>,
    #[arg(long, value_parser = parse_instant)]
    pub allowed_end: Option<EpochMs>,
    #[arg(long, value_parser = parse_instant)]
    pub planned_start: Option<EpochMs>,
    #[arg(long, value_parser = parse_instant)]
    pub planned_end: Option<EpochMs>,
}

impl TaskFields {
    pub fn allowed_time(&self) -> TimeSpan {
        TimeSpan::new(self.allowed_start, self.allowed_end)
    }

    pub fn planned_time(&self) -> TimeSpan {
        TimeSpan::new(self.planned_start, self.planned_end)
    }
}

#[derive(Args)]
pub struct TaskChanges {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub parent: Option<Uuid>,
    /// Replace the prerequisite list; repeatable.
    #[arg(long = "after")]
    pub pre_tasks: Option<Vec<Uuid>>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<Status>,
    #[arg(long, value_parser = parse_instant)]
    pub allowed_start: Option<EpochMs>,
    #[arg(long, value_parser = parse_instant)]
    pub allowed_end: Option<EpochMs>,
    #[arg(long, value_parser = parse_instant)]
    pub planned_start: Option<EpochMs>,
    #[arg(long, value_parser = parse_instant)]
    pub planned_end: Option<EpochMs>,
}

#[derive(Subcommand)]
pub enum TodoCommand {
    /// Create a todo under an existing task.
    Add {
        #[arg(long)]
        task: Uuid,
        /// Override the event inherited from the task.
        #[arg(long)]
        event: Option<Uuid>,
        #[command(flatten)]
        window: PlannedWindow,
    },
    /// List todos, optionally for one task.
    List {
        #[arg(long)]
        task: Option<Uuid>,
    },
    Show { id: Uuid },
    /// Move a todo's planned span or event override; revalidated.
    Update {
        id: Uuid,
        #[arg(long)]
        event: Option<Uuid>,
        #[command(flatten)]
        window: PlannedWindow,
    },
    /// Change status and optionally record the actual time span.
    Status {
        id: Uuid,
        #[arg(value_parser = parse_status)]
        status: Status,
        #[arg(long, value_parser = parse_instant)]
        actual_start: Option<EpochMs>,
        #[arg(long, value_parser = parse_instant)]
        actual_end: Option<EpochMs>,
    },
    Delete { id: Uuid },
    /// Create an event, a task and a todo in one step.
    Plan {
        #[arg(long)]
        title: String,
        #[arg(long)]
        task: String,
        #[arg(long, value_parser = parse_instant)]
        task_start: Option<EpochMs>,
        #[arg(long, value_parser = parse_instant)]
        task_end: Option<EpochMs>,
        #[command(flatten)]
        window: PlannedWindow,
    },
}

#[derive(Args)]
pub struct PlannedWindow {
    #[arg(long, value_parser = parse_instant)]
    pub start: Option<EpochMs>,
    #[arg(long, value_parser = parse_instant)]
    pub end: Option<EpochMs>,
}

impl PlannedWindow {
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }
}

#[derive(Subcommand)]
pub enum SignCommand {
    Add { signifier: String, signified: String },
    List,
    Delete { id: Uuid },
}

#[derive(Subcommand)]
pub enum UserCommand {
    Register {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Check credentials and print the account.
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    List,
    Show { id: Uuid },
    /// Change the given fields of an account.
    Update {
        id: Uuid,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
    Passwd {
        id: Uuid,
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
    Promote { id: Uuid },
    Demote { id: Uuid },
    Delete { id: Uuid },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(&value.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown role `{value}` (user|admin)"))
}

fn parse_status(value: &str) -> Result<Status, String> {
    Status::parse(&value.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown status `{value}` (pending|doing|done|cancelled)"))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, TaskCommand, TodoCommand};
    use clap::{CommandFactory, Parser};
    use taskline_core::Status;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_todo_status_with_actual_span() {
        let cli = Cli::try_parse_from([
            "taskline",
            "todo",
            "status",
            "6f1c1bbd-3c6e-4f0e-8a8e-0d7fd2a52c11",
            "Done",
            "--actual-start",
            "2024-01-01T09:00",
        ])
        .unwrap();

        match cli.command {
            Commands::Todo(TodoCommand::Status {
                status,
                actual_start,
                actual_end,
                ..
            }) => {
                assert_eq!(status, Status::Done);
                assert_eq!(actual_start, Some(1_704_099_600_000));
                assert_eq!(actual_end, None);
            }
            _ => panic!("expected todo status command"),
        }
    }

    #[test]
    fn task_update_keeps_absent_fields_unset() {
        let cli = Cli::try_parse_from([
            "taskline",
            "task",
            "update",
            "6f1c1bbd-3c6e-4f0e-8a8e-0d7fd2a52c11",
            "--planned-end",
            "2024-01-01T17:00",
        ])
        .unwrap();

        match cli.command {
            Commands::Task(TaskCommand::Update { changes, .. }) => {
                assert_eq!(changes.planned_end, Some(1_704_128_400_000));
                assert_eq!(changes.planned_start, None);
                assert!(changes.description.is_none());
                assert!(changes.pre_tasks.is_none());
            }
            _ => panic!("expected task update command"),
        }
    }

    #[test]
    fn rejects_unknown_status() {
        let result = Cli::try_parse_from([
            "taskline",
            "todo",
            "status",
            "6f1c1bbd-3c6e-4f0e-8a8e-0d7fd2a52c11",
            "blocked",
        ]);
        assert!(result.is_err());
    }
}
