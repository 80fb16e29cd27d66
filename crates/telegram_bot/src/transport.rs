//! Messaging transport.
//!
//! The dispatcher pulls [`InboundEvent`]s from a [`Transport`] and hands the
//! replies back to it. [`TelegramTransport`] implements it on top of teloxide
//! long polling.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use teloxide::prelude::*;
use thiserror::Error;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Buffer between the polling task and the dispatcher's admission loop.
const INBOUND_BUFFER: usize = 16;

/// Pause between shutdown attempts while polling has not started yet.
const SHUTDOWN_RETRY: Duration = Duration::from_millis(50);

/// One text message, consumed exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to deliver reply to {conversation_id}: {reason}")]
    Delivery { conversation_id: i64, reason: String },
}

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Next inbound event, or `None` once the source is closed.
    async fn recv(&self) -> Option<InboundEvent>;

    async fn send_reply(&self, conversation_id: i64, text: &str) -> Result<(), TransportError>;
}

/// Telegram long polling transport.
pub struct TelegramTransport {
    bot: teloxide::Bot,
    inbound_rx: Mutex<mpsc::Receiver<InboundEvent>>,
}

impl TelegramTransport {
    /// Starts polling in the background until `cancel` fires.
    pub fn start(bot: teloxide::Bot, cancel: CancellationToken) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);

        let polling_cancel = cancel.clone();
        let handler = Update::filter_message().endpoint(move |msg: Message| {
            let tx = inbound_tx.clone();
            let cancel = polling_cancel.clone();
            async move {
                let Some(event) = to_inbound_event(&msg) else {
                    debug!(chat_id = msg.chat.id.0, "ignoring message without text or sender");
                    return respond(());
                };
                let chat_id = event.conversation_id;
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(chat_id, "shutting down, message dropped");
                    }
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            warn!("inbound channel closed, message dropped");
                        }
                    }
                }
                respond(())
            }
        });

        let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
            .default_handler(|_| async {})
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the telegram dispatcher",
            ))
            .build();
        let shutdown = dispatcher.shutdown_token();

        info!("starting telegram long polling");
        let polling = tokio::spawn(async move { dispatcher.dispatch().await });
        tokio::spawn(async move {
            stop_polling(cancel, &polling, || shutdown.shutdown()).await;
        });

        Self {
            bot,
            inbound_rx: Mutex::new(inbound_rx),
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn recv(&self) -> Option<InboundEvent> {
        self.inbound_rx.lock().await.recv().await
    }

    async fn send_reply(&self, conversation_id: i64, text: &str) -> Result<(), TransportError> {
        self.bot
            .send_message(ChatId(conversation_id), text)
            .await
            .map(|_| ())
            .map_err(|err| TransportError::Delivery {
                conversation_id,
                reason: err.to_string(),
            })
    }
}

/// Waits for `cancel`, then requests shutdown until the poller accepts it or
/// has already exited.
///
/// A dispatcher that has not entered its polling loop yet rejects the
/// request, so the attempt is repeated.
async fn stop_polling<S, F, E>(
    cancel: CancellationToken,
    polling: &JoinHandle<()>,
    mut shutdown: S,
) where
    S: FnMut() -> Result<F, E>,
    F: Future<Output = ()>,
    E: fmt::Debug,
{
    cancel.cancelled().await;
    while !polling.is_finished() {
        match shutdown() {
            Ok(stopped) => {
                stopped.await;
                info!("telegram long polling stopped");
                return;
            }
            Err(err) => {
                debug!(error = ?err, "telegram polling not running yet, retrying shutdown");
                tokio::time::sleep(SHUTDOWN_RETRY).await;
            }
        }
    }
}

fn to_inbound_event(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;
    let sender_id = i64::try_from(user.id.0).ok()?;
    let sender_name = user
        .username
        .clone()
        .unwrap_or_else(|| user.first_name.clone());

    Some(InboundEvent {
        conversation_id: msg.chat.id.0,
        sender_id,
        sender_name,
        text: text.to_string(),
    })
}
