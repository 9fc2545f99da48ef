//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{User, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{commit_or_restore, read_lock_failed, write_lock_failed};

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for user persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
}

impl UserRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load users from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: UserData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(write_lock_failed)?;

        data.clear();
        for user in file_data.users {
            data.insert(user.id, user);
        }
        Ok(())
    }

    /// Save users to disk
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Self::write_file(&self.path, &data)
    }

    fn write_file(path: &PathBuf, data: &HashMap<UserId, User>) -> LedgerResult<()> {
        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        write_json_atomic(path, &UserData { users })
    }

    pub fn get(&self, id: UserId) -> LedgerResult<Option<User>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.get(&id).cloned())
    }

    /// Exact username lookup
    pub fn get_by_username(&self, username: &str) -> LedgerResult<Option<User>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let username = username.trim();
        Ok(data.values().find(|u| u.username == username).cloned())
    }

    /// All users ordered by username
    pub fn get_all(&self) -> LedgerResult<Vec<User>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    /// Insert or replace a user and write the file
    pub fn persist(&self, user: &User) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        let previous = data.insert(user.id, user.clone());
        commit_or_restore(&mut *data, user.id, previous, |d| {
            Self::write_file(&self.path, d)
        })
        .map_err(|e| {
            warn!(user = %user.id, error = %e, "user write failed, row restored");
            e
        })
    }

    /// Insert a new user, rejecting a username that is already taken.
    ///
    /// The check and the insert happen under one write lock.
    pub fn insert_unique(&self, user: &User) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        if data.values().any(|u| u.username == user.username) {
            return Err(LedgerError::Validation(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        let previous = data.insert(user.id, user.clone());
        commit_or_restore(&mut *data, user.id, previous, |d| {
            Self::write_file(&self.path, d)
        })
    }

    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, UserRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        let repo = UserRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_persist_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let user = User::new("alice");
        repo.persist(&user).unwrap();

        let reloaded = UserRepository::new(temp_dir.path().join("users.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(
            reloaded.get_by_username("alice").unwrap().unwrap().id,
            user.id
        );
    }

    #[test]
    fn test_insert_unique_rejects_taken_username() {
        let (_temp_dir, repo) = create_test_repo();
        repo.insert_unique(&User::new("alice")).unwrap();

        let err = repo.insert_unique(&User::new("alice")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_all_sorted() {
        let (_temp_dir, repo) = create_test_repo();
        repo.persist(&User::new("zoe")).unwrap();
        repo.persist(&User::new("adam")).unwrap();

        let names: Vec<_> = repo
            .get_all()
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["adam", "zoe"]);
    }
}
