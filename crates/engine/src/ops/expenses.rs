use chrono::{DateTime, Utc};

use crate::{EngineError, Expense, Money, ResultEngine, StorageError};

use super::{Engine, normalize_required};

/// Largest amount a single expense may carry: one billion major units.
pub const MAX_EXPENSE: Money = Money::new(100_000_000_000);

impl Engine {
    /// Records an expense. `created_at` defaults to now.
    pub async fn add_expense(
        &self,
        owner_id: i64,
        amount: Money,
        category: &str,
        description: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> ResultEngine<String> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "The amount must be positive".to_string(),
            ));
        }
        if amount > MAX_EXPENSE {
            return Err(EngineError::Validation(format!(
                "The amount cannot exceed {}",
                MAX_EXPENSE.format_whole(self.currency)
            )));
        }
        let category = normalize_required(category, "Not enough data to add an expense")?;
        let description = normalize_required(description, "Not enough data to add an expense")?;

        let expense = Expense {
            owner_id,
            amount,
            category,
            description,
            created_at: created_at.unwrap_or_else(|| self.clock.now()),
        };

        let stored = self
            .storage
            .add_expense(&expense)
            .await
            .map_err(|err| match err {
                StorageError::NotFound(_) => {
                    EngineError::NotFound(format!("Category \"{}\" not found", expense.category))
                }
                other => other.into(),
            })?;

        Ok(format!(
            "✅ Expense added!\n\n\
             💰 Amount: {}\n\
             📂 Category: {}\n\
             📝 Description: {}\n\
             📅 Date: {}",
            stored.amount.format(self.currency),
            stored.category,
            stored.description,
            self.local(stored.created_at).format("%d.%m.%Y"),
        ))
    }
}
