use log::{LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;
use taskline_core::db::open_db_in_memory;
use taskline_core::{CoreLogger, Event, EventService, SqlitePlannerRepository};

struct CaptureLog {
    lines: Mutex<Vec<String>>,
}

impl Log for CaptureLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} {}", record.target(), record.args()));
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLog = CaptureLog {
    lines: Mutex::new(Vec::new()),
};

#[test]
fn service_built_before_backend_install_logs_to_that_backend() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlannerRepository::try_new(&conn).unwrap();
    let service = EventService::with_logger(repo, CoreLogger::global());

    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Info);

    let event = Event::new("Late bootstrap");
    service.create_event(&event).unwrap();

    let lines = CAPTURE.lines.lock().unwrap();
    let expected = format!(
        "event_service event=event_create module=event_service status=ok event_id={}",
        event.id
    );
    assert!(lines.contains(&expected), "captured: {lines:?}");
}
