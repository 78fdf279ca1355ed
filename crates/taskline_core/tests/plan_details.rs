use rusqlite::Connection;
use taskline_core::db::open_db_in_memory;
use taskline_core::{
    DetailsStage, Event, EventRepository, SqlitePlannerRepository, Task, TaskRepository,
    TimeSpan, Todo, TodoRepository, TodoService, TodoServiceError,
};
use uuid::Uuid;

const JAN_1: i64 = 1_704_067_200_000;
const MINUTE: i64 = 60_000;

fn at(hour: i64, minute: i64) -> i64 {
    JAN_1 + (hour * 60 + minute) * MINUTE
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn plan_links_event_task_and_todo() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let service = TodoService::new(repo);

    let event = Event::new("Quarterly review");
    // Placeholder parent IDs are replaced by the created records.
    let task = Task::new(Uuid::new_v4(), "prepare slides")
        .planned(TimeSpan::between(at(9, 0), at(12, 0)));
    let todo = Todo::new(Uuid::new_v4()).planned(TimeSpan::between(at(9, 30), at(10, 30)));

    let planned = service
        .create_todo_with_details(event.clone(), task, todo)
        .unwrap();

    assert_eq!(planned.event.id, event.id);
    assert_eq!(planned.task.event_id, event.id);
    assert_eq!(planned.todo.task_id, planned.task.id);

    let stored_task = repo.get_task(planned.task.id).unwrap().unwrap();
    assert_eq!(stored_task.event_id, event.id);
    let stored_todo = repo.get_todo(planned.todo.id).unwrap().unwrap();
    assert_eq!(stored_todo.task_id, planned.task.id);
    assert_eq!(stored_todo.effective_event_id(&stored_task), event.id);
}

#[test]
fn invalid_todo_leaves_no_event_or_task_behind() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let service = TodoService::new(repo);

    let event = Event::new("Quarterly review");
    let task = Task::new(Uuid::new_v4(), "prepare slides")
        .planned(TimeSpan::between(at(9, 0), at(12, 0)));
    let todo = Todo::new(Uuid::new_v4()).planned(TimeSpan::between(at(13, 0), at(14, 0)));

    let err = service
        .create_todo_with_details(event.clone(), task.clone(), todo)
        .unwrap_err();

    match &err {
        TodoServiceError::Stage { stage, source } => {
            assert_eq!(*stage, DetailsStage::CreateTodo);
            assert!(matches!(source.as_ref(), TodoServiceError::Validation(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("failed to create todo"));

    assert!(repo.get_event(event.id).unwrap().is_none());
    assert!(repo.get_task(task.id).unwrap().is_none());
    assert_eq!(row_count(&conn, "events"), 0);
    assert_eq!(row_count(&conn, "tasks"), 0);
    assert_eq!(row_count(&conn, "todos"), 0);
}

#[test]
fn duplicate_event_fails_at_event_stage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let existing = Event::new("Standup");
    repo.create_event(&existing).unwrap();
    let service = TodoService::new(repo);

    let task = Task::new(Uuid::new_v4(), "notes");
    let err = service
        .create_todo_with_details(existing.clone(), task.clone(), Todo::new(task.id))
        .unwrap_err();

    assert!(matches!(
        err,
        TodoServiceError::Stage {
            stage: DetailsStage::CreateEvent,
            ..
        }
    ));
    assert!(repo.get_task(task.id).unwrap().is_none());
    assert_eq!(row_count(&conn, "events"), 1);
}

#[test]
fn plan_without_windows_persists_all_three() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let service = TodoService::new(repo);

    let planned = service
        .create_todo_with_details(
            Event::new("Inbox"),
            Task::new(Uuid::new_v4(), "triage"),
            Todo::new(Uuid::new_v4()),
        )
        .unwrap();

    assert_eq!(row_count(&conn, "events"), 1);
    assert_eq!(
        repo.list_todos_for_task(planned.task.id).unwrap(),
        vec![planned.todo]
    );
}
