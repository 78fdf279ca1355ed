use taskline_core::db::open_db_in_memory;
use taskline_core::{
    Event, EventRepository, RecordKind, RepoError, SqlitePlannerRepository, Status, Task,
    TaskRepository, TimeSpan, Todo, TodoRepository,
};
use uuid::Uuid;

const JAN_1: i64 = 1_704_067_200_000;
const HOUR: i64 = 3_600_000;

#[test]
fn event_fields_roundtrip_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();

    let mut event = Event::new("Marathon training");
    event.description = "spring season".to_string();
    event.location = "riverside".to_string();
    event.priority = 4;
    event.category = "sport".to_string();
    event.is_template = true;
    repo.create_event(&event).unwrap();
    assert_eq!(repo.get_event(event.id).unwrap(), Some(event.clone()));

    event.priority = 2;
    event.is_template = false;
    repo.update_event(&event).unwrap();
    assert_eq!(repo.get_event(event.id).unwrap(), Some(event));
}

#[test]
fn task_roundtrip_keeps_parent_prerequisites_and_spans() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let event = Event::new("Move house");
    repo.create_event(&event).unwrap();

    let first = Task::new(event.id, "pack boxes");
    let second = Task::new(event.id, "hire van");
    repo.create_task(&first).unwrap();
    repo.create_task(&second).unwrap();

    let mut task = Task::new(event.id, "load van")
        .planned(TimeSpan::between(JAN_1 + 9 * HOUR, JAN_1 + 12 * HOUR));
    task.parent_task_id = Some(first.id);
    task.pre_task_ids = vec![second.id, first.id];
    task.allowed_time = TimeSpan::new(Some(JAN_1), None);
    task.status = Status::Doing;
    repo.create_task(&task).unwrap();

    assert_eq!(repo.get_task(task.id).unwrap(), Some(task.clone()));
    assert_eq!(repo.list_tasks_for_event(event.id).unwrap().len(), 3);
    assert!(repo.task_exists(task.id).unwrap());
    assert!(!repo.task_exists(Uuid::new_v4()).unwrap());
}

#[test]
fn task_requires_existing_event() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();

    let orphan = Task::new(Uuid::new_v4(), "float");
    assert!(matches!(repo.create_task(&orphan), Err(RepoError::Db(_))));
}

#[test]
fn todos_for_task_are_ordered_by_planned_start() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let event = Event::new("Week");
    repo.create_event(&event).unwrap();
    let task = Task::new(event.id, "errands");
    repo.create_task(&task).unwrap();

    let unscheduled = Todo::new(task.id);
    let late = Todo::new(task.id).planned(TimeSpan::new(Some(JAN_1 + 15 * HOUR), None));
    let early = Todo::new(task.id).planned(TimeSpan::new(Some(JAN_1 + 8 * HOUR), None));
    for todo in [&unscheduled, &late, &early] {
        repo.create_todo(todo).unwrap();
    }

    let ids: Vec<_> = repo
        .list_todos_for_task(task.id)
        .unwrap()
        .into_iter()
        .map(|todo| todo.id)
        .collect();
    assert_eq!(ids, vec![early.id, late.id, unscheduled.id]);
}

#[test]
fn update_and_delete_of_missing_rows_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        repo.update_event(&Event::with_id(missing, "ghost")),
        Err(RepoError::NotFound {
            record: RecordKind::Event,
            ..
        })
    ));
    assert!(matches!(
        repo.delete_task(missing),
        Err(RepoError::NotFound {
            record: RecordKind::Task,
            id,
        }) if id == missing
    ));
    assert!(matches!(
        repo.delete_todo(missing),
        Err(RepoError::NotFound {
            record: RecordKind::Todo,
            ..
        })
    ));
    assert_eq!(repo.delete_tasks_by_event(missing).unwrap(), 0);
    assert_eq!(repo.delete_todos_by_task(missing).unwrap(), 0);
}
