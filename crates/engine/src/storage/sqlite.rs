use async_trait::async_trait;
use sea_orm::{
    ActiveValue, DatabaseConnection, DatabaseTransaction, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

use crate::{
    Category, Expense, ExpenseRange, NewCategory, Profile, StorageError, categories,
    categories::{DEFAULT_CATEGORIES, OTHER_CATEGORY},
    expenses, users,
};

use super::{ResultStorage, Storage};

/// [`Storage`] backed by a sea-orm connection (SQLite in practice).
///
/// The schema is created by the `migration` crate.
#[derive(Clone, Debug)]
pub struct SqliteStorage {
    database: DatabaseConnection,
}

impl SqliteStorage {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    async fn ensure_profile(db_tx: &DatabaseTransaction, owner_id: i64) -> ResultStorage<()> {
        users::Entity::find_by_id(owner_id)
            .one(db_tx)
            .await?
            .map(|_| ())
            .ok_or(StorageError::ProfileMissing(owner_id))
    }

    async fn category_by_name(
        db_tx: &DatabaseTransaction,
        owner_id: i64,
        name: &str,
    ) -> ResultStorage<Option<categories::Model>> {
        Ok(categories::Entity::find()
            .filter(categories::Column::UserId.eq(owner_id))
            .filter(categories::Column::Name.eq(name))
            .one(db_tx)
            .await?)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_profile(&self, profile: &Profile) -> ResultStorage<()> {
        let db_tx = self.database.begin().await?;

        let user = users::ActiveModel {
            user_id: ActiveValue::Set(profile.id),
            username: ActiveValue::Set(profile.display_name.clone()),
            created_at: ActiveValue::Set(profile.created_at),
        };
        users::Entity::insert(user)
            .on_conflict(
                OnConflict::column(users::Column::UserId)
                    .update_column(users::Column::Username)
                    .to_owned(),
            )
            .exec_without_returning(&db_tx)
            .await?;

        let defaults = DEFAULT_CATEGORIES.iter().map(|name| categories::ActiveModel {
            user_id: ActiveValue::Set(profile.id),
            name: ActiveValue::Set(ToString::to_string(name)),
            color: ActiveValue::Set(None),
            ..Default::default()
        });
        categories::Entity::insert_many(defaults)
            .on_conflict(
                OnConflict::columns([categories::Column::UserId, categories::Column::Name])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(&db_tx)
            .await?;

        db_tx.commit().await?;
        Ok(())
    }

    async fn add_category(&self, category: &NewCategory) -> ResultStorage<i64> {
        let db_tx = self.database.begin().await?;
        Self::ensure_profile(&db_tx, category.owner_id).await?;

        if Self::category_by_name(&db_tx, category.owner_id, &category.name)
            .await?
            .is_some()
        {
            return Err(StorageError::Conflict(category.name.clone()));
        }

        let model = categories::ActiveModel {
            user_id: ActiveValue::Set(category.owner_id),
            name: ActiveValue::Set(category.name.clone()),
            color: ActiveValue::Set(category.color.clone()),
            ..Default::default()
        }
        .insert(&db_tx)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                StorageError::Conflict(category.name.clone())
            }
            _ => StorageError::Database(err),
        })?;

        db_tx.commit().await?;
        Ok(model.id)
    }

    async fn list_categories(&self, owner_id: i64) -> ResultStorage<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(owner_id))
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn delete_category(&self, owner_id: i64, category_id: i64) -> ResultStorage<String> {
        let db_tx = self.database.begin().await?;

        let category = categories::Entity::find_by_id(category_id)
            .filter(categories::Column::UserId.eq(owner_id))
            .one(&db_tx)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("category {category_id}")))?;

        let fallback = Self::category_by_name(&db_tx, owner_id, OTHER_CATEGORY)
            .await?
            .ok_or_else(|| StorageError::NotFound(OTHER_CATEGORY.to_string()))?;
        if fallback.id == category.id {
            return Err(StorageError::Conflict(OTHER_CATEGORY.to_string()));
        }

        let moved = expenses::Entity::update_many()
            .col_expr(expenses::Column::CategoryId, Expr::value(fallback.id))
            .filter(expenses::Column::UserId.eq(owner_id))
            .filter(expenses::Column::CategoryId.eq(category.id))
            .exec(&db_tx)
            .await?;
        categories::Entity::delete_by_id(category.id)
            .exec(&db_tx)
            .await?;

        db_tx.commit().await?;
        tracing::debug!(
            owner_id,
            category_id,
            moved = moved.rows_affected,
            "category deleted"
        );
        Ok(category.name)
    }

    async fn add_expense(&self, expense: &Expense) -> ResultStorage<Expense> {
        let db_tx = self.database.begin().await?;
        Self::ensure_profile(&db_tx, expense.owner_id).await?;

        let category = Self::category_by_name(&db_tx, expense.owner_id, &expense.category)
            .await?
            .ok_or_else(|| StorageError::NotFound(expense.category.clone()))?;

        let model = expenses::ActiveModel {
            user_id: ActiveValue::Set(expense.owner_id),
            category_id: ActiveValue::Set(category.id),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            description: ActiveValue::Set(expense.description.clone()),
            created_at: ActiveValue::Set(expense.created_at),
            ..Default::default()
        }
        .insert(&db_tx)
        .await?;

        db_tx.commit().await?;
        Ok(Expense::from_model(model, category.name))
    }

    async fn query_expenses(
        &self,
        owner_id: i64,
        range: ExpenseRange,
    ) -> ResultStorage<Vec<Expense>> {
        let mut query = expenses::Entity::find().filter(expenses::Column::UserId.eq(owner_id));
        if let Some(from) = range.from {
            query = query.filter(expenses::Column::CreatedAt.gte(from));
        }
        if let Some(to) = range.to {
            query = query.filter(expenses::Column::CreatedAt.lt(to));
        }

        let rows = query
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;

        rows.into_iter()
            .map(|(model, category)| {
                let category = category.ok_or_else(|| {
                    StorageError::NotFound(format!("category {}", model.category_id))
                })?;
                Ok(Expense::from_model(model, category.name))
            })
            .collect()
    }
}
