//! Category service
//!
//! Provides business logic for category management. Names are unique per
//! user, and a category still referenced by a transaction or budget cannot
//! be removed.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryId, CategoryType, UserId};
use crate::storage::{in_user_scope, Storage};

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// Fields that can be changed on an existing category
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a category for `user`
    pub fn create(&self, user: UserId, name: &str, kind: CategoryType) -> LedgerResult<Category> {
        self.storage
            .users
            .get(user)?
            .ok_or_else(|| LedgerError::user_not_found(user.to_string()))?;

        let category = Category::new(user, name, kind);
        category.validate()?;

        in_user_scope(self.storage, user, |_| {
            if self.storage.categories.find_by_name(user, &category.name)?.is_some() {
                return Err(LedgerError::Validation(format!(
                    "Category '{}' already exists",
                    category.name
                )));
            }
            self.storage.categories.persist(&category)
        })?;

        self.storage.log_create(
            EntityType::Category,
            category.id,
            Some(category.name.clone()),
            &category,
        );
        info!(category = %category.id, name = %category.name, "created category");

        Ok(category)
    }

    /// Change name, description, or color
    pub fn update(&self, id: CategoryId, changes: CategoryUpdate) -> LedgerResult<Category> {
        let owner = self.require(id)?.user_id;

        let (before, after) = in_user_scope(self.storage, owner, |_| {
            let mut category = self.require(id)?;
            let before = category.clone();

            if let Some(name) = changes.name {
                category.rename(name);
                if let Some(existing) =
                    self.storage.categories.find_by_name(owner, &category.name)?
                {
                    if existing.id != id {
                        return Err(LedgerError::Validation(format!(
                            "Category '{}' already exists",
                            category.name
                        )));
                    }
                }
            }
            if let Some(description) = changes.description {
                category.description = description;
            }
            if let Some(color) = changes.color {
                category.color = Some(color).filter(|c| !c.trim().is_empty());
            }

            category.validate()?;
            category.updated_at = chrono::Utc::now();
            self.storage.categories.persist(&category)?;
            Ok((before, category))
        })?;

        self.storage.log_update(
            EntityType::Category,
            after.id,
            Some(after.name.clone()),
            &before,
            &after,
        );
        Ok(after)
    }

    /// Remove a category no transaction or budget refers to
    pub fn delete(&self, id: CategoryId) -> LedgerResult<Category> {
        let owner = self.require(id)?.user_id;

        let removed = in_user_scope(self.storage, owner, |_| {
            let category = self.require(id)?;
            if self.storage.transactions.any_in_category(id)?
                || self.storage.budgets.any_in_category(id)?
            {
                return Err(LedgerError::Validation(format!(
                    "Category '{}' is still used by transactions or budgets",
                    category.name
                )));
            }
            self.storage
                .categories
                .remove(id)?
                .ok_or_else(|| LedgerError::category_not_found(id.to_string()))
        })?;

        self.storage.log_delete(
            EntityType::Category,
            removed.id,
            Some(removed.name.clone()),
            &removed,
        );
        info!(category = %removed.id, name = %removed.name, "deleted category");
        Ok(removed)
    }

    pub fn get(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    fn require(&self, id: CategoryId) -> LedgerResult<Category> {
        self.get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))
    }

    pub fn find_by_name(&self, user: UserId, name: &str) -> LedgerResult<Option<Category>> {
        self.storage.categories.find_by_name(user, name)
    }

    /// Resolve a category by name, falling back to an ID reference
    pub fn find(&self, user: UserId, identifier: &str) -> LedgerResult<Option<Category>> {
        if let Some(category) = self.find_by_name(user, identifier)? {
            return Ok(Some(category));
        }
        Ok(self
            .storage
            .categories
            .get_by_user(user)?
            .into_iter()
            .find(|c| c.id.matches(identifier)))
    }

    /// A user's categories, optionally only one type
    pub fn list(&self, user: UserId, kind: Option<CategoryType>) -> LedgerResult<Vec<Category>> {
        let mut categories = self.storage.categories.get_by_user(user)?;
        if let Some(kind) = kind {
            categories.retain(|c| c.kind == kind);
        }
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Money, Transaction, User};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn setup_user(storage: &Storage) -> UserId {
        let user = User::new("alice");
        storage.users.persist(&user).unwrap();
        user.id
    }

    #[test]
    fn test_create_category() {
        let (_temp_dir, storage) = create_test_storage();
        let user = setup_user(&storage);
        let service = CategoryService::new(&storage);

        let food = service.create(user, "Food", CategoryType::Expense).unwrap();
        assert_eq!(food.name, "Food");
        assert_eq!(service.find(user, "Food").unwrap().unwrap().id, food.id);
        assert_eq!(
            service.find(user, &food.id.to_string()).unwrap().unwrap().id,
            food.id
        );
    }

    #[test]
    fn test_create_duplicate_category() {
        let (_temp_dir, storage) = create_test_storage();
        let user = setup_user(&storage);
        let service = CategoryService::new(&storage);

        service.create(user, "Food", CategoryType::Expense).unwrap();
        let err = service.create(user, "Food", CategoryType::Income).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_for_unknown_user() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let err = service
            .create(UserId::new(), "Food", CategoryType::Expense)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rename_checks_other_names() {
        let (_temp_dir, storage) = create_test_storage();
        let user = setup_user(&storage);
        let service = CategoryService::new(&storage);

        let food = service.create(user, "Food", CategoryType::Expense).unwrap();
        service.create(user, "Rent", CategoryType::Expense).unwrap();

        let rename = |name: &str| CategoryUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        };
        assert!(service.update(food.id, rename("Rent")).unwrap_err().is_validation());
        assert_eq!(service.update(food.id, rename("Food")).unwrap().name, "Food");
        assert_eq!(service.update(food.id, rename("Groceries")).unwrap().name, "Groceries");
    }

    #[test]
    fn test_list_by_kind() {
        let (_temp_dir, storage) = create_test_storage();
        let user = setup_user(&storage);
        let service = CategoryService::new(&storage);
        service.create(user, "Food", CategoryType::Expense).unwrap();
        service.create(user, "Salary", CategoryType::Income).unwrap();

        assert_eq!(service.list(user, None).unwrap().len(), 2);
        let income = service.list(user, Some(CategoryType::Income)).unwrap();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].name, "Salary");
    }

    #[test]
    fn test_delete_category_in_use() {
        let (_temp_dir, storage) = create_test_storage();
        let user = setup_user(&storage);
        let service = CategoryService::new(&storage);

        let food = service.create(user, "Food", CategoryType::Expense).unwrap();
        let unused = service.create(user, "Unused", CategoryType::Expense).unwrap();
        storage
            .transactions
            .persist(&Transaction::expense(
                user,
                food.id,
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                Money::from_cents(100),
                "Snack",
            ))
            .unwrap();

        assert!(service.delete(food.id).unwrap_err().is_validation());
        service.delete(unused.id).unwrap();
        assert!(service.get(unused.id).unwrap().is_none());
        assert!(service.delete(unused.id).unwrap_err().is_not_found());
    }
}
