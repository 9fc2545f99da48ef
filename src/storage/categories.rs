//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LedgerResult;
use crate::models::{Category, CategoryId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{commit_or_restore, read_lock_failed, write_lock_failed};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CategoryData {
    categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    data: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: CategoryData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(write_lock_failed)?;

        data.clear();
        for category in file_data.categories {
            data.insert(category.id, category);
        }
        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Self::write_file(&self.path, &data)
    }

    fn write_file(path: &PathBuf, data: &HashMap<CategoryId, Category>) -> LedgerResult<()> {
        let mut categories: Vec<_> = data.values().cloned().collect();
        categories.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then_with(|| a.name.cmp(&b.name))
        });
        write_json_atomic(path, &CategoryData { categories })
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.get(&id).cloned())
    }

    /// A user's categories ordered by name
    pub fn get_by_user(&self, user: UserId) -> LedgerResult<Vec<Category>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let mut categories: Vec<_> = data
            .values()
            .filter(|c| c.user_id == user)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Exact (trimmed, case-sensitive) name lookup within a user's categories
    pub fn find_by_name(&self, user: UserId, name: &str) -> LedgerResult<Option<Category>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let name = name.trim();
        Ok(data
            .values()
            .find(|c| c.user_id == user && c.name == name)
            .cloned())
    }

    /// Insert or replace a category and write the file
    pub fn persist(&self, category: &Category) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        let previous = data.insert(category.id, category.clone());
        commit_or_restore(&mut *data, category.id, previous, |d| {
            Self::write_file(&self.path, d)
        })
        .map_err(|e| {
            warn!(category = %category.id, error = %e, "category write failed, row restored");
            e
        })
    }

    /// Remove a category and write the file
    pub fn remove(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        let removed = data.remove(&id);
        if removed.is_none() {
            return Ok(None);
        }
        commit_or_restore(&mut *data, id, removed.clone(), |d| {
            Self::write_file(&self.path, d)
        })
        .map_err(|e| {
            warn!(category = %id, error = %e, "category delete failed, restored row");
            e
        })?;
        Ok(removed)
    }
}
