//! Categories owned by a profile.

use sea_orm::entity::prelude::*;

/// Name of the fallback category expenses move to when theirs is deleted.
pub const OTHER_CATEGORY: &str = "Other";

/// Categories seeded alongside every new profile.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Food", "Transport", "Entertainment", OTHER_CATEGORY];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub owner_id: i64,
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}

/// A category not yet persisted; storage assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    pub owner_id: i64,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::UserId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            owner_id: model.user_id,
            id: model.id,
            name: model.name,
            color: model.color,
        }
    }
}
