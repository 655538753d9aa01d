//! Event Types and Notification Bus
//!
//! Lifecycle notifications flowing from the process supervisor into the
//! adapter, and normalized presentation events flowing out to the UI
//! layer. Both directions are fire-and-forget: the core never waits for
//! a listener and imposes no backpressure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Final state of a supervised process.
///
/// Mirrors the distinction the front-end cares about: a process that ran
/// to completion (whatever its exit code) versus one that died on a
/// signal or could not be reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatusKind {
    /// The process exited on its own
    Normal,
    /// The process was killed by a signal or its status was lost
    Crashed,
}

/// Lifecycle and stream notifications produced by the process supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// The external command began executing
    Started,
    /// New stdout bytes are buffered and ready to drain
    OutputReady,
    /// New stderr bytes are buffered and ready to drain
    ErrorReady,
    /// The external command exited
    Finished {
        exit_code: i32,
        status: ExitStatusKind,
    },
}

/// Notifications delivered to the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Progress update, 0-100
    Percentage(u8),
    /// A formatted line ready for direct rich-text display
    Text(String),
    /// Lifecycle passthrough: the command started
    Started,
    /// Lifecycle passthrough: stdout was drained
    ReadOutput,
    /// Lifecycle passthrough: stderr was drained
    ReadOutputError,
    /// Lifecycle passthrough: the command exited
    Finished {
        exit_code: i32,
        status: ExitStatusKind,
    },
}

/// Subscription handle for receiving UI events
pub struct UiEventSubscription {
    receiver: broadcast::Receiver<UiEvent>,
}

impl UiEventSubscription {
    /// Receive the next event, waiting if necessary
    pub async fn recv(&mut self) -> Option<UiEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Closed) => None,
            Err(broadcast::error::RecvError::Lagged(count)) => {
                warn!("UI event subscriber lagged by {} events", count);
                // Try to receive the next available event
                self.receiver.recv().await.ok()
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Option<UiEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(broadcast::error::TryRecvError::Empty) => None,
            Err(broadcast::error::TryRecvError::Closed) => None,
            Err(broadcast::error::TryRecvError::Lagged(count)) => {
                warn!("UI event subscriber lagged by {} events", count);
                self.try_recv() // Try again after clearing lag
            }
        }
    }
}

/// Broadcast bus carrying UI events from the parsing pipeline to the
/// front-end. A slow listener lags in its own domain; publishing never
/// blocks and never fails.
#[derive(Clone)]
pub struct UiEventBus {
    sender: broadcast::Sender<UiEvent>,
    /// Active subscribers count (for monitoring)
    active_subscribers: Arc<AtomicUsize>,
}

impl UiEventBus {
    /// Create a new event bus with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            active_subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to UI events
    pub fn subscribe(&self) -> UiEventSubscription {
        self.active_subscribers.fetch_add(1, Ordering::Relaxed);
        UiEventSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: UiEvent) {
        // Ignore errors - they just mean no subscribers are active
        let _ = self.sender.send(event);
    }

    /// Get the number of subscriptions handed out
    pub fn subscriber_count(&self) -> usize {
        self.active_subscribers.load(Ordering::Relaxed)
    }
}

impl Default for UiEventBus {
    fn default() -> Self {
        Self::new(256) // Default capacity for buffering events
    }
}
