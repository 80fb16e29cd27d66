use std::sync::Arc;

use async_trait::async_trait;
use engine::{Engine, EngineError, ResultEngine};

use crate::{
    commands::{self, Command},
    transport::InboundEvent,
};

/// Produces the reply to one inbound event.
///
/// Implementations must be safe to call from many workers at once.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: &InboundEvent) -> String;
}

/// Routes commands to the engine.
#[derive(Debug)]
pub struct CommandHandler {
    engine: Arc<Engine>,
}

impl CommandHandler {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    async fn execute(&self, event: &InboundEvent, command: Command) -> ResultEngine<String> {
        let owner = event.sender_id;
        match command {
            Command::Start => {
                self.engine
                    .create_profile(owner, &event.sender_name)
                    .await
            }
            Command::Help => Ok(commands::help_text().to_string()),
            Command::Categories => self.engine.categories(owner).await,
            Command::AddCategory { name, color } => {
                self.engine
                    .add_category(owner, &name, color.as_deref())
                    .await
            }
            Command::DeleteCategory { id } => self.engine.delete_category(owner, id).await,
            Command::AddExpense {
                amount,
                category,
                description,
            } => {
                self.engine
                    .add_expense(owner, amount, &category, &description, None)
                    .await
            }
            Command::Today => self.engine.today_expenses(owner).await,
            Command::Week => self.engine.week_expenses(owner).await,
            Command::Month => self.engine.month_expenses(owner).await,
            Command::Stats => self.engine.stats_expenses(owner).await,
        }
    }
}

#[async_trait]
impl EventHandler for CommandHandler {
    async fn handle(&self, event: &InboundEvent) -> String {
        let command = match commands::parse(&event.text) {
            Ok(command) => command,
            Err(err) => {
                tracing::debug!(conversation_id = event.conversation_id, %err, "unparsable message");
                return err.user_message().to_string();
            }
        };

        match self.execute(event, command).await {
            Ok(reply) => reply,
            Err(err) => {
                log_failure(event, &err);
                err.user_message()
            }
        }
    }
}

fn log_failure(event: &InboundEvent, err: &EngineError) {
    if err.is_internal() {
        tracing::error!(
            conversation_id = event.conversation_id,
            sender_id = event.sender_id,
            error = %err,
            "command failed"
        );
    } else {
        tracing::debug!(
            conversation_id = event.conversation_id,
            sender_id = event.sender_id,
            error = %err,
            "command rejected"
        );
    }
}
