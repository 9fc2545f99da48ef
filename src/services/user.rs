//! User service

use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{User, UserId};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new user with a unique username
    pub fn create(&self, username: &str) -> LedgerResult<User> {
        let user = User::new(username);
        user.validate()?;

        self.storage.users.insert_unique(&user)?;
        self.storage
            .log_create(EntityType::User, user.id, Some(user.username.clone()), &user);
        info!(user = %user.id, username = %user.username, "created user");

        Ok(user)
    }

    pub fn get(&self, id: UserId) -> LedgerResult<Option<User>> {
        self.storage.users.get(id)
    }

    pub fn find_by_username(&self, username: &str) -> LedgerResult<Option<User>> {
        self.storage.users.get_by_username(username)
    }

    /// Look up a user that must exist
    pub fn require(&self, username: &str) -> LedgerResult<User> {
        self.find_by_username(username)?
            .ok_or_else(|| LedgerError::user_not_found(username))
    }

    pub fn list(&self) -> LedgerResult<Vec<User>> {
        self.storage.users.get_all()
    }
}
