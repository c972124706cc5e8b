//! Push subscription plumbing
//!
//! Each subscription owns a bounded queue and one delivery task. The
//! transport-side `Delivery` never waits on the consumer. When the queue is
//! full, later batches are folded into a single pending batch that the task
//! delivers once the queue has drained, so per-channel order holds and no
//! update is lost. How batches fold is decided by [`Batch::absorb`].

use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::task::JoinHandle;
use uuid::Uuid;
use xchg_core::OrderBook;

/// Unique identifier for a subscription
pub type SubscriptionId = Uuid;

/// Payload delivered by a subscription
pub trait Batch: Send + 'static {
    /// Fold a later batch into this one
    fn absorb(&mut self, later: Self);
}

/// Record deltas: keep every record, in arrival order
impl<R: Send + 'static> Batch for Vec<R> {
    fn absorb(&mut self, later: Self) {
        self.extend(later);
    }
}

/// Complete snapshots: the latest one supersedes the rest
impl Batch for OrderBook {
    fn absorb(&mut self, later: Self) {
        *self = later;
    }
}

#[derive(Debug)]
struct SubscriptionState {
    active: AtomicBool,
    delivered: AtomicU64,
    coalesced: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transport-side end of a subscription queue
pub struct Delivery<T> {
    tx: mpsc::Sender<T>,
    pending: Arc<Mutex<Option<T>>>,
    state: Arc<SubscriptionState>,
    channel: String,
}

impl<T: Batch> Delivery<T> {
    /// Queue one batch without blocking
    pub fn offer(&self, batch: T) {
        if !self.state.active.load(Ordering::Acquire) {
            return;
        }

        // Once something is pending, everything after it must follow it
        let mut pending = lock(&self.pending);
        if let Some(held) = pending.as_mut() {
            held.absorb(batch);
            self.state.coalesced.fetch_add(1, Ordering::Relaxed);
            trace!("Folded batch into pending delivery on {}", self.channel);
            return;
        }

        match self.tx.try_send(batch) {
            Ok(()) => {}
            Err(TrySendError::Full(batch)) => {
                *pending = Some(batch);
                let coalesced = self.state.coalesced.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    "Subscription queue full on {}, holding batch for later delivery ({} so far)",
                    self.channel, coalesced
                );
            }
            Err(TrySendError::Closed(_)) => {
                self.state.active.store(false, Ordering::Release);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }
}

/// Caller-side end of a subscription
///
/// Dropping the handle leaves the subscription running for the adapter's
/// lifetime; call `cancel` to stop it.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    channel: String,
    state: Arc<SubscriptionState>,
    task: JoinHandle<()>,
    deregister: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Subscribed channel, e.g. `trade:XBTUSD`
    pub fn topic(&self) -> &str {
        &self.channel
    }

    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    /// Callback invocations so far
    pub fn delivered(&self) -> u64 {
        self.state.delivered.load(Ordering::Relaxed)
    }

    /// Batches that arrived while the queue was full and were folded into a
    /// later delivery
    pub fn coalesced(&self) -> u64 {
        self.state.coalesced.load(Ordering::Relaxed)
    }

    /// Stop delivery and release the transport handler. Idempotent.
    pub fn cancel(&mut self) {
        self.state.active.store(false, Ordering::Release);
        if let Some(deregister) = self.deregister.take() {
            deregister();
            debug!("Subscription {} on {} cancelled", self.id, self.channel);
        }
        self.task.abort();
    }

    /// Run `f` when the subscription is cancelled
    pub(crate) fn on_cancel(&mut self, f: impl FnOnce() + Send + 'static) {
        self.deregister = Some(Box::new(f));
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("topic", &self.channel)
            .field("active", &self.is_active())
            .field("delivered", &self.delivered())
            .field("coalesced", &self.coalesced())
            .finish()
    }
}

/// Open a subscription queue of `capacity` batches feeding `callback`
///
/// Must be called from within a tokio runtime.
pub fn open<T, F>(
    channel: impl Into<String>,
    capacity: usize,
    mut callback: F,
) -> (Delivery<T>, SubscriptionHandle)
where
    T: Batch,
    F: FnMut(T) + Send + 'static,
{
    let channel = channel.into();
    let (tx, mut rx) = mpsc::channel::<T>(capacity.max(1));
    let pending: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
    let state = Arc::new(SubscriptionState {
        active: AtomicBool::new(true),
        delivered: AtomicU64::new(0),
        coalesced: AtomicU64::new(0),
    });

    let task_state = Arc::clone(&state);
    let task_pending = Arc::clone(&pending);
    let task = tokio::spawn(async move {
        loop {
            // Producers only enqueue while holding the pending lock, so under
            // it an empty queue means the pending batch is the oldest
            let next = {
                let mut pending = lock(&task_pending);
                match rx.try_recv() {
                    Ok(batch) => Some(batch),
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => pending.take(),
                }
            };
            let batch = match next {
                Some(batch) => batch,
                None => match rx.recv().await {
                    Some(batch) => batch,
                    None => break,
                },
            };

            if !task_state.active.load(Ordering::Acquire) {
                break;
            }
            callback(batch);
            task_state.delivered.fetch_add(1, Ordering::Relaxed);
        }
    });

    let delivery = Delivery {
        tx,
        pending,
        state: Arc::clone(&state),
        channel: channel.clone(),
    };
    let handle = SubscriptionHandle {
        id: Uuid::new_v4(),
        channel,
        state,
        task,
        deregister: None,
    };

    (delivery, handle)
}
