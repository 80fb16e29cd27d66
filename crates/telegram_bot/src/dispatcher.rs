//! Bounded worker pool between a [`Transport`] and an [`EventHandler`].
//!
//! One admission task pulls events from the transport into a bounded queue;
//! `workers` tasks take them off the queue, run the handler and send the
//! reply back. A full queue blocks admission, which in turn stops pulling
//! from the transport.
//!
//! On cancellation admission stops pulling and closes the queue. Workers
//! finish whatever is already queued and exit once it is empty:
//!
//! ```text
//! Running --cancel / transport closed--> Draining --queue empty--> Stopped
//! ```

use std::{sync::Arc, time::Duration};

use engine::{EngineError, INTERNAL_ERROR_MESSAGE};
use thiserror::Error;
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    handlers::EventHandler,
    transport::{InboundEvent, Transport},
};

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub queue_capacity: usize,
    pub workers: usize,
    /// Deadline of a single event; past it the event gets the generic
    /// failure reply.
    pub event_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            workers: DEFAULT_WORKERS,
            event_timeout: DEFAULT_EVENT_TIMEOUT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatcherState {
    Running,
    Draining,
    Stopped,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid dispatcher configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("dispatcher did not stop within {0:?}")]
    ShutdownTimeout(Duration),
}

type SharedQueue = Arc<Mutex<mpsc::Receiver<InboundEvent>>>;

pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    handler: Arc<dyn EventHandler>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        handler: Arc<dyn EventHandler>,
        config: DispatcherConfig,
    ) -> Result<Self, DispatchError> {
        if config.queue_capacity == 0 {
            return Err(DispatchError::InvalidConfig("queue capacity must be positive"));
        }
        if config.workers == 0 {
            return Err(DispatchError::InvalidConfig("worker count must be positive"));
        }
        if config.event_timeout.is_zero() {
            return Err(DispatchError::InvalidConfig("event timeout must be positive"));
        }
        Ok(Self {
            transport,
            handler,
            config,
        })
    }

    /// Spawns admission and workers. Cancelling `cancel` starts draining.
    pub fn start(self, cancel: CancellationToken) -> DispatcherHandle {
        let (queue_tx, queue_rx) = mpsc::channel(self.config.queue_capacity);
        let queue: SharedQueue = Arc::new(Mutex::new(queue_rx));
        let (state_tx, state_rx) = watch::channel(DispatcherState::Running);

        let admission = tokio::spawn(admit(
            Arc::clone(&self.transport),
            queue_tx,
            cancel.clone(),
        ));
        let workers: Vec<JoinHandle<()>> = (0..self.config.workers)
            .map(|worker_id| {
                tokio::spawn(work(
                    worker_id,
                    Arc::clone(&queue),
                    Arc::clone(&self.transport),
                    Arc::clone(&self.handler),
                    self.config.event_timeout,
                ))
            })
            .collect();
        info!(
            workers = self.config.workers,
            queue_capacity = self.config.queue_capacity,
            "dispatcher running"
        );

        tokio::spawn(async move {
            if let Err(err) = admission.await {
                error!(error = %err, "admission task failed");
            }
            state_tx.send_replace(DispatcherState::Draining);
            info!("dispatcher draining");

            for worker in workers {
                if let Err(err) = worker.await {
                    error!(error = %err, "worker task failed");
                }
            }
            state_tx.send_replace(DispatcherState::Stopped);
            info!("dispatcher stopped");
        });

        DispatcherHandle {
            cancel,
            state: state_rx,
        }
    }
}

/// Controls a running [`Dispatcher`].
#[derive(Clone, Debug)]
pub struct DispatcherHandle {
    cancel: CancellationToken,
    state: watch::Receiver<DispatcherState>,
}

impl DispatcherHandle {
    pub fn state(&self) -> DispatcherState {
        *self.state.borrow()
    }

    /// Resolves once every worker has returned.
    pub async fn stopped(&self) {
        let mut state = self.state.clone();
        // the sender is only dropped after publishing `Stopped`
        let _ = state
            .wait_for(|state| *state == DispatcherState::Stopped)
            .await;
    }

    /// Stops admission and waits up to `timeout` for queued events to finish.
    ///
    /// On timeout the workers keep running in the background; nothing in
    /// flight is aborted.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), DispatchError> {
        self.cancel.cancel();
        tokio::time::timeout(timeout, self.stopped())
            .await
            .map_err(|_| DispatchError::ShutdownTimeout(timeout))
    }
}

async fn admit(
    transport: Arc<dyn Transport>,
    queue: mpsc::Sender<InboundEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("admission cancelled");
                break;
            }
            event = transport.recv() => match event {
                Some(event) => event,
                None => {
                    info!("transport closed");
                    break;
                }
            },
        };

        // waits for a free slot while the queue is full
        if queue.send(event).await.is_err() {
            warn!("queue closed, admission stopped");
            break;
        }
    }
}

async fn work(
    worker_id: usize,
    queue: SharedQueue,
    transport: Arc<dyn Transport>,
    handler: Arc<dyn EventHandler>,
    event_timeout: Duration,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(event) = next else {
            debug!(worker_id, "queue closed, worker exiting");
            return;
        };

        let conversation_id = event.conversation_id;
        let reply = process(Arc::clone(&handler), event, event_timeout).await;
        if let Err(err) = transport.send_reply(conversation_id, &reply).await {
            warn!(worker_id, conversation_id, error = %err, "reply not delivered");
        }
    }
}

/// Runs the handler in its own task so a panic stays inside this event.
async fn process(
    handler: Arc<dyn EventHandler>,
    event: InboundEvent,
    event_timeout: Duration,
) -> String {
    let conversation_id = event.conversation_id;
    let mut task = tokio::spawn(async move { handler.handle(&event).await });

    match tokio::time::timeout(event_timeout, &mut task).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(err)) => {
            error!(conversation_id, error = %err, "event handler panicked");
            INTERNAL_ERROR_MESSAGE.to_string()
        }
        Err(_) => {
            task.abort();
            warn!(conversation_id, timeout = ?event_timeout, "event timed out");
            EngineError::Timeout.user_message()
        }
    }
}
