use taskline_core::db::open_db_in_memory;
use taskline_core::{RecordKind, RepoError, Sign, SignService, SqliteSignRepository};
use uuid::Uuid;

#[test]
fn create_get_list_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSignRepository::try_new(&conn).unwrap();
    let service = SignService::new(repo);

    let rose = Sign::new("rose", "love");
    let dove = Sign::new("dove", "peace");
    service.create_sign(&rose).unwrap();
    service.create_sign(&dove).unwrap();

    assert_eq!(service.get_sign(rose.id).unwrap(), Some(rose.clone()));
    let listed = service.list_signs().unwrap();
    assert_eq!(listed, vec![dove, rose]);
}

#[test]
fn update_replaces_both_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = SignService::new(SqliteSignRepository::try_new(&conn).unwrap());

    let mut sign = Sign::new("red light", "stop");
    service.create_sign(&sign).unwrap();
    sign.signifier = "green light".to_string();
    sign.signified = "go".to_string();
    service.update_sign(&sign).unwrap();

    assert_eq!(service.get_sign(sign.id).unwrap(), Some(sign));
}

#[test]
fn missing_sign_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = SignService::new(SqliteSignRepository::try_new(&conn).unwrap());
    let missing = Uuid::new_v4();

    assert_eq!(service.get_sign(missing).unwrap(), None);
    assert!(matches!(
        service.delete_sign(missing),
        Err(RepoError::NotFound {
            record: RecordKind::Sign,
            id,
        }) if id == missing
    ));

    let ghost = Sign {
        id: missing,
        signifier: "ghost".to_string(),
        signified: "absence".to_string(),
    };
    assert!(matches!(
        service.update_sign(&ghost),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn delete_removes_only_target() {
    let conn = open_db_in_memory().unwrap();
    let service = SignService::new(SqliteSignRepository::try_new(&conn).unwrap());
    let keep = Sign::new("owl", "wisdom");
    let skull = Sign::new("skull", "mortality");
    service.create_sign(&keep).unwrap();
    service.create_sign(&skull).unwrap();

    service.delete_sign(skull.id).unwrap();

    assert_eq!(service.list_signs().unwrap(), vec![keep]);
}
