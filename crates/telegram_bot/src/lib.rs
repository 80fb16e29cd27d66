//! Telegram front end of the expense tracker.
//!
//! Messages flow from the [`Transport`] through the [`Dispatcher`] worker pool
//! into the [`CommandHandler`], which routes them to the engine.

use std::{sync::Arc, time::Duration};

use engine::Engine;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use commands::{Command, ParseError, help_text, parse};
pub use dispatcher::{
    DispatchError, Dispatcher, DispatcherConfig, DispatcherHandle, DispatcherState,
};
pub use handlers::{CommandHandler, EventHandler};
pub use transport::{InboundEvent, TelegramTransport, Transport, TransportError};

mod commands;
mod dispatcher;
mod handlers;
mod transport;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("missing telegram token")]
    MissingToken,
    #[error("missing engine")]
    MissingEngine,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub struct Bot {
    token: String,
    engine: Arc<Engine>,
    config: DispatcherConfig,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// Starts long polling and the dispatcher.
    ///
    /// Both stop when `cancel` fires; await [`DispatcherHandle::shutdown`] to
    /// wait for queued messages.
    pub fn run(&self, cancel: CancellationToken) -> Result<DispatcherHandle, BotError> {
        tracing::info!("Starting telegram bot...");

        let transport = TelegramTransport::start(teloxide::Bot::new(&self.token), cancel.clone());
        let handler = CommandHandler::new(Arc::clone(&self.engine));
        let dispatcher = Dispatcher::new(Arc::new(transport), Arc::new(handler), self.config)?;

        Ok(dispatcher.start(cancel))
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    engine: Option<Arc<Engine>>,
    config: DispatcherConfig,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.trim().to_string();
        self
    }

    pub fn engine(mut self, engine: Arc<Engine>) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> BotBuilder {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn workers(mut self, workers: usize) -> BotBuilder {
        self.config.workers = workers;
        self
    }

    pub fn event_timeout(mut self, timeout: Duration) -> BotBuilder {
        self.config.event_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err(BotError::MissingToken);
        }
        let engine = self.engine.ok_or(BotError::MissingEngine)?;
        Ok(Bot {
            token: self.token,
            engine,
            config: self.config,
        })
    }
}
