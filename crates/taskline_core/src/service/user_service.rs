//! User account service.
//!
//! # Responsibility
//! - Register, authenticate and administer user accounts.
//! - Own password hashing; repositories only ever see bcrypt hashes.
//!
//! # Invariants
//! - Usernames are unique across accounts.
//! - Registration always creates a `Role::User` account.
//! - Login reports `InvalidCredentials` for an unknown username and for a wrong
//!   password alike.
//! - Log lines never carry passwords or hashes.

use crate::logging::CoreLogger;
use crate::model::span::now_epoch_ms;
use crate::model::user::{Role, User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RecordKind, RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LOG_TARGET: &str = "user_service";

/// Errors from user service operations.
#[derive(Debug)]
pub enum UserServiceError {
    /// Another account already uses this username.
    UsernameTaken(String),
    /// Unknown username or wrong password.
    InvalidCredentials,
    /// Old password did not match during a password change.
    WrongPassword,
    UserNotFound(UserId),
    /// Role change requested for an account that already has that role.
    RoleUnchanged { user_id: UserId, role: Role },
    /// Password hashing or verification failed.
    Hash(bcrypt::BcryptError),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameTaken(name) => write!(f, "username already exists: {name}"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::WrongPassword => write!(f, "old password is incorrect"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::RoleUnchanged { user_id, role } => {
                write!(f, "user {user_id} already has role {}", role.as_str())
            }
            Self::Hash(err) => write!(f, "failed to hash password: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hash(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                record: RecordKind::User,
                id,
            } => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<bcrypt::BcryptError> for UserServiceError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::Hash(value)
    }
}

/// Partial account update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// User service facade over a `UserRepository`.
pub struct UserService<R: UserRepository> {
    repo: R,
    hash_cost: u32,
    logger: CoreLogger,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service hashing at `bcrypt::DEFAULT_COST`.
    pub fn new(repo: R) -> Self {
        Self::with_hash_cost(repo, bcrypt::DEFAULT_COST)
    }

    /// Creates a service hashing at `cost` (4..=31).
    pub fn with_hash_cost(repo: R, cost: u32) -> Self {
        Self {
            repo,
            hash_cost: cost,
            logger: CoreLogger::global(),
        }
    }

    pub fn with_logger(mut self, logger: CoreLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Creates a `Role::User` account.
    ///
    /// # Errors
    /// - `UsernameTaken` when the username is in use.
    pub fn register(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        if self.repo.username_exists(username)? {
            self.logger.warn(
                LOG_TARGET,
                format_args!(
                    "event=user_register module=user_service status=error error_code=username_taken"
                ),
            );
            return Err(UserServiceError::UsernameTaken(username.to_string()));
        }

        let user = User::new(username, bcrypt::hash(password, self.hash_cost)?);
        self.repo.create_user(&user)?;
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event=user_register module=user_service status=ok user_id={}",
                user.id
            ),
        );
        Ok(user)
    }

    /// Returns the account when `password` matches.
    pub fn login(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let user = match self.repo.get_user_by_username(username)? {
            Some(user) if bcrypt::verify(password, &user.password_hash)? => user,
            _ => {
                self.logger.warn(
                    LOG_TARGET,
                    format_args!(
                        "event=user_login module=user_service status=error error_code=invalid_credentials"
                    ),
                );
                return Err(UserServiceError::InvalidCredentials);
            }
        };
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event=user_login module=user_service status=ok user_id={}",
                user.id
            ),
        );
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Result<User, UserServiceError> {
        self.repo
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))
    }

    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }

    /// Applies the present fields of `update`.
    ///
    /// # Errors
    /// - `UserNotFound` when no account has `id`.
    /// - `UsernameTaken` when the new username belongs to another account.
    pub fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserServiceError> {
        let mut user = self.get_user(id)?;

        if let Some(username) = update.username {
            if let Some(owner) = self.repo.get_user_by_username(&username)? {
                if owner.id != id {
                    return Err(UserServiceError::UsernameTaken(username));
                }
            }
            user.username = username;
        }
        if let Some(password) = update.password {
            user.password_hash = bcrypt::hash(password, self.hash_cost)?;
        }
        if let Some(role) = update.role {
            user.role = role;
        }

        self.store(&mut user, "user_update")?;
        Ok(user)
    }

    pub fn delete_user(&self, id: UserId) -> Result<(), UserServiceError> {
        self.repo.delete_user(id)?;
        self.logger.info(
            LOG_TARGET,
            format_args!("event=user_delete module=user_service status=ok user_id={id}"),
        );
        Ok(())
    }

    /// Replaces the password after checking the current one.
    pub fn change_password(
        &self,
        id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        let mut user = self.get_user(id)?;
        if !bcrypt::verify(old_password, &user.password_hash)? {
            return Err(UserServiceError::WrongPassword);
        }
        user.password_hash = bcrypt::hash(new_password, self.hash_cost)?;
        self.store(&mut user, "user_change_password")
    }

    pub fn promote_to_admin(&self, id: UserId) -> Result<User, UserServiceError> {
        self.set_role(id, Role::Admin, "user_promote")
    }

    pub fn demote_to_user(&self, id: UserId) -> Result<User, UserServiceError> {
        self.set_role(id, Role::User, "user_demote")
    }

    fn set_role(
        &self,
        id: UserId,
        role: Role,
        operation: &'static str,
    ) -> Result<User, UserServiceError> {
        let mut user = self.get_user(id)?;
        if user.role == role {
            return Err(UserServiceError::RoleUnchanged { user_id: id, role });
        }
        user.role = role;
        self.store(&mut user, operation)?;
        Ok(user)
    }

    fn store(&self, user: &mut User, operation: &'static str) -> Result<(), UserServiceError> {
        user.updated_at = now_epoch_ms();
        self.repo.update_user(user)?;
        self.logger.info(
            LOG_TARGET,
            format_args!(
                "event={operation} module=user_service status=ok user_id={} role={}",
                user.id,
                user.role.as_str()
            ),
        );
        Ok(())
    }
}
