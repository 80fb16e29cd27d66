//! Expense records.
//!
//! An expense is immutable once stored. The table references its category by
//! id; the domain type carries the category name so reports never need a
//! second lookup.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub owner_id: i64,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Expense {
    pub(crate) fn from_model(model: Model, category: String) -> Self {
        Self {
            owner_id: model.user_id,
            amount: Money::new(model.amount_minor),
            category,
            description: model.description,
            created_at: model.created_at,
        }
    }
}
