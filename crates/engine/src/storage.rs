//! Storage boundary.
//!
//! Domain operations only see the [`Storage`] trait. Each method is one
//! logical unit of work: implementations must make the multi-step ones
//! (`create_profile`, `delete_category`, `add_expense`) atomic.

use async_trait::async_trait;

use crate::{Category, Expense, ExpenseRange, NewCategory, Profile, StorageError};

pub use sqlite::SqliteStorage;

mod sqlite;

pub type ResultStorage<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Upserts the profile and seeds the default categories.
    async fn create_profile(&self, profile: &Profile) -> ResultStorage<()>;

    /// Stores a new category and returns its id.
    ///
    /// Fails with [`StorageError::Conflict`] when the owner already has a
    /// category with the same name.
    async fn add_category(&self, category: &NewCategory) -> ResultStorage<i64>;

    /// Lists the owner's categories ordered by id.
    async fn list_categories(&self, owner_id: i64) -> ResultStorage<Vec<Category>>;

    /// Moves the category's expenses to the owner's fallback category, deletes
    /// it and returns its name.
    ///
    /// A missing category yields [`StorageError::NotFound`] and changes
    /// nothing.
    async fn delete_category(&self, owner_id: i64, category_id: i64) -> ResultStorage<String>;

    /// Stores an expense under the owner's category with the same name.
    async fn add_expense(&self, expense: &Expense) -> ResultStorage<Expense>;

    /// Returns the owner's expenses created inside `range`, newest first.
    async fn query_expenses(&self, owner_id: i64, range: ExpenseRange)
    -> ResultStorage<Vec<Expense>>;
}
