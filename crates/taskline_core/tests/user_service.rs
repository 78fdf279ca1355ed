use rusqlite::Connection;
use taskline_core::db::open_db_in_memory;
use taskline_core::{
    Role, SqliteUserRepository, UserService, UserServiceError, UserUpdate,
};
use uuid::Uuid;

// Lowest bcrypt cost keeps hashing fast in tests.
const TEST_COST: u32 = 4;

fn service(conn: &Connection) -> UserService<SqliteUserRepository<'_>> {
    UserService::with_hash_cost(SqliteUserRepository::try_new(conn).unwrap(), TEST_COST)
}

#[test]
fn register_stores_hash_and_user_role() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);

    let user = users.register("ada", "correct horse").unwrap();

    assert_eq!(user.role, Role::User);
    assert_ne!(user.password_hash, "correct horse");
    assert!(user.password_hash.starts_with("$2"));
    assert_eq!(users.get_user(user.id).unwrap(), user);
}

#[test]
fn duplicate_username_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    users.register("ada", "first").unwrap();

    assert!(matches!(
        users.register("ada", "second"),
        Err(UserServiceError::UsernameTaken(name)) if name == "ada"
    ));
    assert_eq!(users.list_users().unwrap().len(), 1);
}

#[test]
fn login_hides_which_credential_was_wrong() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    let ada = users.register("ada", "correct horse").unwrap();

    assert_eq!(users.login("ada", "correct horse").unwrap().id, ada.id);

    let wrong_password = users.login("ada", "battery staple").unwrap_err();
    let unknown_user = users.login("grace", "correct horse").unwrap_err();
    assert!(matches!(wrong_password, UserServiceError::InvalidCredentials));
    assert!(matches!(unknown_user, UserServiceError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[test]
fn change_password_requires_current_password() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    let ada = users.register("ada", "old secret").unwrap();

    assert!(matches!(
        users.change_password(ada.id, "guess", "new secret"),
        Err(UserServiceError::WrongPassword)
    ));
    users
        .change_password(ada.id, "old secret", "new secret")
        .unwrap();

    assert!(users.login("ada", "new secret").is_ok());
    assert!(matches!(
        users.login("ada", "old secret"),
        Err(UserServiceError::InvalidCredentials)
    ));
}

#[test]
fn update_applies_only_present_fields() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    let ada = users.register("ada", "secret").unwrap();

    let renamed = users
        .update_user(
            ada.id,
            UserUpdate {
                username: Some("ada.l".to_string()),
                ..UserUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(renamed.username, "ada.l");
    assert_eq!(renamed.password_hash, ada.password_hash);
    assert_eq!(renamed.role, Role::User);
    assert!(renamed.updated_at >= ada.updated_at);
    assert!(users.login("ada.l", "secret").is_ok());
}

#[test]
fn update_rejects_username_of_another_account() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    let ada = users.register("ada", "secret").unwrap();
    users.register("grace", "secret").unwrap();

    assert!(matches!(
        users.update_user(
            ada.id,
            UserUpdate {
                username: Some("grace".to_string()),
                ..UserUpdate::default()
            },
        ),
        Err(UserServiceError::UsernameTaken(_))
    ));

    // Keeping one's own name is not a conflict.
    let same = users
        .update_user(
            ada.id,
            UserUpdate {
                username: Some("ada".to_string()),
                password: Some("fresh".to_string()),
                role: None,
            },
        )
        .unwrap();
    assert!(users.login(&same.username, "fresh").is_ok());
}

#[test]
fn promote_and_demote_toggle_role_once() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    let ada = users.register("ada", "secret").unwrap();

    let admin = users.promote_to_admin(ada.id).unwrap();
    assert!(admin.is_admin());
    assert!(matches!(
        users.promote_to_admin(ada.id),
        Err(UserServiceError::RoleUnchanged {
            role: Role::Admin,
            ..
        })
    ));

    let demoted = users.demote_to_user(ada.id).unwrap();
    assert_eq!(demoted.role, Role::User);
    assert!(matches!(
        users.demote_to_user(ada.id),
        Err(UserServiceError::RoleUnchanged {
            role: Role::User,
            ..
        })
    ));
    assert_eq!(users.get_user(ada.id).unwrap().role, Role::User);
}

#[test]
fn missing_user_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        users.get_user(missing),
        Err(UserServiceError::UserNotFound(id)) if id == missing
    ));
    assert!(matches!(
        users.delete_user(missing),
        Err(UserServiceError::UserNotFound(_))
    ));
    assert!(matches!(
        users.promote_to_admin(missing),
        Err(UserServiceError::UserNotFound(_))
    ));
}

#[test]
fn delete_removes_account() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);
    let ada = users.register("ada", "secret").unwrap();
    let grace = users.register("grace", "secret").unwrap();

    users.delete_user(ada.id).unwrap();

    let remaining: Vec<_> = users.list_users().unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(remaining, vec![grace.id]);
    assert!(matches!(
        users.login("ada", "secret"),
        Err(UserServiceError::InvalidCredentials)
    ));
}
