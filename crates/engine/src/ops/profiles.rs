use crate::{EngineError, Profile, ResultEngine, categories::DEFAULT_CATEGORIES};

use super::{Engine, normalize_required};

impl Engine {
    /// Registers the sender, or refreshes its display name when already known.
    ///
    /// Storage seeds the default categories in the same unit of work.
    pub async fn create_profile(&self, id: i64, display_name: &str) -> ResultEngine<String> {
        if id == 0 {
            return Err(EngineError::Validation(
                "Not enough data to create a profile".to_string(),
            ));
        }
        let display_name = normalize_required(display_name, "Not enough data to create a profile")?;

        let profile = Profile {
            id,
            display_name,
            created_at: self.clock.now(),
        };
        self.storage.create_profile(&profile).await?;
        tracing::info!(profile_id = id, "profile registered");

        Ok(welcome_message())
    }
}

fn welcome_message() -> String {
    let mut message = String::from(
        "👋 Welcome to Expense Tracker!\n\n\
         I will help you keep track of your expenses.\n\n\
         ✅ You are registered!\n\
         📂 Default categories created:\n",
    );
    for name in DEFAULT_CATEGORIES {
        message.push_str(&format!("   • {name}\n"));
    }
    message.push_str("\nSend /help to see what I can do.");
    message
}
