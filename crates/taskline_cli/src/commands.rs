//! Command handlers: decode arguments into entities, call services, print.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use taskline_core::{
    now_epoch_ms, Event, EventService, Sign, SignService, SqlitePlannerRepository,
    SqliteSignRepository, SqliteUserRepository, Status, Task, TaskService, TimeSpan, Todo,
    TodoService, User, UserService, UserUpdate,
};
use uuid::Uuid;

use crate::cli::{
    EventChanges, EventCommand, EventFields, SignCommand, TaskChanges, TaskCommand, TodoCommand,
    UserCommand,
};
use crate::time::{format_instant, format_span};

/// Services sharing one open connection.
pub struct Planner<'conn> {
    events: EventService<SqlitePlannerRepository<'conn>>,
    tasks: TaskService<SqlitePlannerRepository<'conn>>,
    todos: TodoService<SqlitePlannerRepository<'conn>>,
    signs: SignService<SqliteSignRepository<'conn>>,
    users: UserService<SqliteUserRepository<'conn>>,
}

impl<'conn> Planner<'conn> {
    pub fn new(
        planner_repo: SqlitePlannerRepository<'conn>,
        sign_repo: SqliteSignRepository<'conn>,
        user_repo: SqliteUserRepository<'conn>,
    ) -> Self {
        Self {
            events: EventService::new(planner_repo),
            tasks: TaskService::new(planner_repo),
            todos: TodoService::new(planner_repo),
            signs: SignService::new(sign_repo),
            users: UserService::new(user_repo),
        }
    }

    pub fn event(&self, command: EventCommand) -> Result<()> {
        match command {
            EventCommand::Add(fields) => {
                let event = event_from_fields(fields);
                let id = self
                    .events
                    .create_event(&event)
                    .context("failed to create event")?;
                println!("{id}");
            }
            EventCommand::List => {
                for event in self.events.list_events()? {
                    println!(
                        "{}  p{}  {}{}",
                        event.id,
                        event.priority,
                        event.title,
                        if event.is_template { "  [template]" } else { "" }
                    );
                }
            }
            EventCommand::Show { id } => {
                let event = self
                    .events
                    .get_event(id)?
                    .ok_or_else(|| anyhow!("event not found: {id}"))?;
                print_json(&event)?;
            }
            EventCommand::Update { id, changes } => {
                let mut event = self
                    .events
                    .get_event(id)?
                    .ok_or_else(|| anyhow!("event not found: {id}"))?;
                apply_event_changes(&mut event, changes);
                self.events.update_event(&event)?;
                println!("updated event {id}");
            }
            EventCommand::Delete { id } => {
                let deletion = self.events.delete_event(id)?;
                println!(
                    "deleted event {id} ({} tasks, {} todos)",
                    deletion.removed_tasks, deletion.removed_todos
                );
            }
        }
        Ok(())
    }

    pub fn task(&self, command: TaskCommand) -> Result<()> {
        match command {
            TaskCommand::Add { event, fields } => {
                let mut task = Task::new(event, fields.description.as_str());
                task.parent_task_id = fields.parent;
                task.allowed_time = fields.allowed_time();
                task.planned_time = fields.planned_time();
                task.pre_task_ids = fields.pre_tasks;
                let id = self
                    .tasks
                    .create_task(&task)
                    .context("failed to create task")?;
                println!("{id}");
            }
            TaskCommand::List { event } => {
                let tasks = match event {
                    Some(event_id) => self.tasks.list_tasks_for_event(event_id)?,
                    None => self.tasks.list_tasks()?,
                };
                for task in tasks {
                    println!(
                        "{}  {:<9}  {}  [{}]",
                        task.id,
                        task.status.as_str(),
                        task.description,
                        format_span(&task.planned_time)
                    );
                }
            }
            TaskCommand::Show { id } => {
                let task = self
                    .tasks
                    .get_task(id)?
                    .ok_or_else(|| anyhow!("task not found: {id}"))?;
                print_json(&task)?;
            }
            TaskCommand::Update { id, changes } => {
                let mut task = self
                    .tasks
                    .get_task(id)?
                    .ok_or_else(|| anyhow!("task not found: {id}"))?;
                apply_task_changes(&mut task, changes);
                self.tasks.update_task(&task)?;
                println!("updated task {id}");
            }
            TaskCommand::Delete { id } => {
                self.tasks.delete_task(id)?;
                println!("deleted task {id}");
            }
        }
        Ok(())
    }

    pub fn todo(&self, command: TodoCommand) -> Result<()> {
        match command {
            TodoCommand::Add {
                task,
                event,
                window,
            } => {
                let mut todo = Todo::new(task).planned(window.span());
                todo.event_id = event;
                let id = self.todos.create_todo(&todo)?;
                println!("{id}");
            }
            TodoCommand::List { task } => {
                let todos = match task {
                    Some(task_id) => self.todos.list_todos_for_task(task_id)?,
                    None => self.todos.list_todos()?,
                };
                for todo in todos {
                    println!(
                        "{}  {:<9}  task={}  [{}]",
                        todo.id,
                        todo.status.as_str(),
                        todo.task_id,
                        format_span(&todo.planned_time)
                    );
                }
            }
            TodoCommand::Show { id } => {
                print_json(&self.load_todo(id)?)?;
            }
            TodoCommand::Update { id, event, window } => {
                let mut todo = self.load_todo(id)?;
                if event.is_some() {
                    todo.event_id = event;
                }
                todo.planned_time = TimeSpan::new(
                    window.start.or(todo.planned_time.start),
                    window.end.or(todo.planned_time.end),
                );
                self.todos.update_todo(&todo)?;
                println!("{id} planned [{}]", format_span(&todo.planned_time));
            }
            TodoCommand::Status {
                id,
                status,
                actual_start,
                actual_end,
            } => {
                let mut todo = self.load_todo(id)?;
                todo.status = status;
                if actual_start.is_some() || actual_end.is_some() {
                    todo.actual_time = TimeSpan::new(
                        actual_start.or(todo.actual_time.start),
                        actual_end.or(todo.actual_time.end),
                    );
                }
                todo.completed_at = match status {
                    Status::Done => Some(todo.completed_at.unwrap_or_else(now_epoch_ms)),
                    _ => None,
                };
                self.todos.update_todo(&todo)?;
                match todo.completed_at {
                    Some(at) => println!("{id} {} at {}", status.as_str(), format_instant(at)),
                    None => println!("{id} {}", status.as_str()),
                }
            }
            TodoCommand::Delete { id } => {
                self.todos.delete_todo(id)?;
                println!("deleted todo {id}");
            }
            TodoCommand::Plan {
                title,
                task,
                task_start,
                task_end,
                window,
            } => {
                let event = Event::new(title);
                // Parent IDs are linked by the service.
                let task = Task::new(event.id, task).planned(TimeSpan::new(task_start, task_end));
                let todo = Todo::new(task.id).planned(window.span());
                let planned = self.todos.create_todo_with_details(event, task, todo)?;
                println!("event {}", planned.event.id);
                println!("task  {}", planned.task.id);
                println!("todo  {}", planned.todo.id);
            }
        }
        Ok(())
    }

    pub fn sign(&self, command: SignCommand) -> Result<()> {
        match command {
            SignCommand::Add {
                signifier,
                signified,
            } => {
                let id = self.signs.create_sign(&Sign::new(signifier, signified))?;
                println!("{id}");
            }
            SignCommand::List => {
                for sign in self.signs.list_signs()? {
                    println!("{}  {} -> {}", sign.id, sign.signifier, sign.signified);
                }
            }
            SignCommand::Delete { id } => {
                self.signs.delete_sign(id)?;
                println!("deleted sign {id}");
            }
        }
        Ok(())
    }

    pub fn user(&self, command: UserCommand) -> Result<()> {
        match command {
            UserCommand::Register { username, password } => {
                let user = self.users.register(&username, &password)?;
                println!("{}", user.id);
            }
            UserCommand::Login { username, password } => {
                print_user(&self.users.login(&username, &password)?);
            }
            UserCommand::List => {
                for user in self.users.list_users()? {
                    print_user(&user);
                }
            }
            UserCommand::Show { id } => {
                print_json(&self.users.get_user(id)?)?;
            }
            UserCommand::Update {
                id,
                username,
                password,
                role,
            } => {
                let user = self.users.update_user(
                    id,
                    UserUpdate {
                        username,
                        password,
                        role,
                    },
                )?;
                print_user(&user);
            }
            UserCommand::Passwd { id, old, new } => {
                self.users.change_password(id, &old, &new)?;
                println!("password changed for {id}");
            }
            UserCommand::Promote { id } => print_user(&self.users.promote_to_admin(id)?),
            UserCommand::Demote { id } => print_user(&self.users.demote_to_user(id)?),
            UserCommand::Delete { id } => {
                self.users.delete_user(id)?;
                println!("deleted user {id}");
            }
        }
        Ok(())
    }

    fn load_todo(&self, id: Uuid) -> Result<Todo> {
        self.todos
            .get_todo(id)?
            .ok_or_else(|| anyhow!("todo not found: {id}"))
    }
}

fn event_from_fields(fields: EventFields) -> Event {
    let mut event = Event::new(fields.title);
    event.description = fields.description;
    event.location = fields.location;
    event.priority = fields.priority;
    event.category = fields.category;
    event.is_template = fields.template;
    event
}

fn apply_event_changes(event: &mut Event, changes: EventChanges) {
    if let Some(title) = changes.title {
        event.title = title;
    }
    if let Some(description) = changes.description {
        event.description = description;
    }
    if let Some(location) = changes.location {
        event.location = location;
    }
    if let Some(priority) = changes.priority {
        event.priority = priority;
    }
    if let Some(category) = changes.category {
        event.category = category;
    }
    if let Some(template) = changes.template {
        event.is_template = template;
    }
}

fn apply_task_changes(task: &mut Task, changes: TaskChanges) {
    if let Some(description) = changes.description {
        task.description = description;
    }
    if changes.parent.is_some() {
        task.parent_task_id = changes.parent;
    }
    if let Some(pre_tasks) = changes.pre_tasks {
        task.pre_task_ids = pre_tasks;
    }
    if let Some(status) = changes.status {
        task.status = status;
    }
    task.allowed_time = TimeSpan::new(
        changes.allowed_start.or(task.allowed_time.start),
        changes.allowed_end.or(task.allowed_time.end),
    );
    task.planned_time = TimeSpan::new(
        changes.planned_start.or(task.planned_time.start),
        changes.planned_end.or(task.planned_time.end),
    );
}

fn print_user(user: &User) {
    println!("{}  {:<5}  {}", user.id, user.role.as_str(), user.username);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
