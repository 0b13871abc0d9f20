//! Typed, process-wide event bus.
//!
//! One broadcast channel per event type, created lazily on first use.
//! Emitting never fails and never waits: without listeners the event is dropped,
//! slow listeners lose the oldest events (they are told how many via a warning).

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::{sync::broadcast, task::JoinHandle};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Payload type that can travel on the bus.
pub trait Event: Clone + Send + Sync + 'static {
    /// Stable name for logs.
    const NAME: &'static str;
}

#[derive(Clone)]
pub struct EventBus {
    channels: Arc<DashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    channel_capacity: usize,
}

impl EventBus {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            // broadcast::channel panics on 0
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Returns how many listeners received the event (0 when nobody listens).
    pub fn emit<E: Event>(&self, payload: E) -> usize {
        let delivered = self.sender::<E>().send(payload).unwrap_or(0);
        tracing::trace!(event = E::NAME, delivered, "event emitted");
        delivered
    }

    pub fn subscribe<E: Event>(&self) -> broadcast::Receiver<E> {
        self.sender::<E>().subscribe()
    }

    /// Runs `listener` for every `E` emitted from now on, on a background task.
    ///
    /// The task ends when the bus (every clone of it) is dropped.
    pub fn on<E, F>(&self, listener: F) -> JoinHandle<()>
    where
        E: Event,
        F: Fn(E) + Send + Sync + 'static,
    {
        let mut rx = self.subscribe::<E>();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => listener(payload),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(event = E::NAME, skipped, "event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    pub fn listener_count<E: Event>(&self) -> usize {
        self.sender::<E>().receiver_count()
    }

    fn sender<E: Event>(&self) -> broadcast::Sender<E> {
        let entry = self.channels.entry(TypeId::of::<E>()).or_insert_with(|| {
            let (tx, _) = broadcast::channel::<E>(self.channel_capacity);
            Box::new(tx)
        });

        match entry.value().downcast_ref::<broadcast::Sender<E>>() {
            Some(tx) => tx.clone(),
            // entries are keyed by the TypeId of their payload type
            None => unreachable!("event channel for {} has a foreign sender type", E::NAME),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.channels.len())
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}
