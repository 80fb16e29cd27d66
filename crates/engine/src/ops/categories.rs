use crate::{EngineError, NewCategory, ResultEngine, StorageError, categories::OTHER_CATEGORY};

use super::{Engine, normalize_optional_text, normalize_required};

impl Engine {
    pub async fn add_category(
        &self,
        owner_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> ResultEngine<String> {
        let name = normalize_required(name, "Not enough data to create a category")?;
        let category = NewCategory {
            owner_id,
            name,
            color: normalize_optional_text(color),
        };

        let id = self
            .storage
            .add_category(&category)
            .await
            .map_err(|err| match err {
                StorageError::Conflict(_) => EngineError::Conflict(format!(
                    "Category \"{}\" already exists",
                    category.name
                )),
                other => other.into(),
            })?;

        Ok(format!(
            "✅ Category created!\n\
             📂 Name: {}\n\
             🎨 Color: {}\n\
             🆔 ID: {id}\n\
             Use this ID to delete the category.",
            category.name,
            category.color.as_deref().unwrap_or("none"),
        ))
    }

    /// Lists the owner's categories. An empty list is not an error.
    pub async fn categories(&self, owner_id: i64) -> ResultEngine<String> {
        let categories = self.storage.list_categories(owner_id).await?;
        if categories.is_empty() {
            return Ok(
                "You have no categories yet.\nCreate one with /category add <name>".to_string(),
            );
        }

        let mut message = String::from("📂 Your categories:\n\n");
        for category in &categories {
            message.push_str(&format!(
                "{} {}\n   ID: {}\n\n",
                category_emoji(&category.name),
                category.name,
                category.id
            ));
        }
        message.push_str("💡 Use the ID to delete a category");
        Ok(message)
    }

    /// Deletes a category, moving its expenses to "Other".
    pub async fn delete_category(&self, owner_id: i64, category_id: i64) -> ResultEngine<String> {
        if category_id <= 0 {
            return Err(EngineError::Validation("Invalid category id".to_string()));
        }

        let name = self
            .storage
            .delete_category(owner_id, category_id)
            .await
            .map_err(|err| match err {
                StorageError::NotFound(what) if what == OTHER_CATEGORY => EngineError::NotFound(
                    format!("Category \"{OTHER_CATEGORY}\" is missing, send /start to restore it"),
                ),
                StorageError::NotFound(_) => {
                    EngineError::NotFound(format!("Category with ID {category_id} not found"))
                }
                StorageError::Conflict(name) => {
                    EngineError::Conflict(format!("The \"{name}\" category cannot be deleted"))
                }
                other => other.into(),
            })?;

        Ok(format!(
            "✅ Category {name} deleted\nAll its expenses were moved to \"Other\""
        ))
    }
}

fn category_emoji(name: &str) -> &'static str {
    match name {
        "Food" => "🍔",
        "Transport" => "🚗",
        "Entertainment" => "🎬",
        "Other" => "📦",
        "Sport" => "⚽",
        "Beauty" => "💄",
        "Shopping" => "🛒",
        "Plants" => "🌿",
        "Flowers" => "🌸",
        _ => "📂",
    }
}
