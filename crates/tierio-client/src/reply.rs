//! Raw reply handles
//!
//! A [`RawReply`] is the transport's view of an in-flight metadata call:
//! something that eventually yields a reply record or fails. Waiting on it
//! never consumes the value; [`RawReply::take`] hands it out exactly once.

use parking_lot::{Condvar, Mutex};
use std::future::Future;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tierio_common::{Error, Result};
use tokio::runtime::Handle;

/// Handle on the untranslated result of a remote call
pub trait RawReply<R>: Send + Sync {
    /// Whether the reply (or its failure) has arrived
    fn is_ready(&self) -> bool;

    /// Block until the reply arrives or `timeout` passes.
    ///
    /// Returns `true` if the reply is ready. `None` waits forever.
    fn wait_ready(&self, timeout: Option<Duration>) -> bool;

    /// Remove the reply. Only meaningful once [`is_ready`](Self::is_ready).
    fn take(&self) -> Result<R>;

    /// Wait for and take the reply
    fn blocking_get(&self) -> Result<R> {
        self.wait_ready(None);
        self.take()
    }

    /// Wait up to `timeout` for the reply.
    ///
    /// Fails with [`Error::NotReady`] if it has not arrived by then.
    fn blocking_get_with_timeout(&self, timeout: Duration) -> Result<R> {
        self.wait_ready(Some(timeout));
        self.take()
    }
}

enum SlotState<R> {
    Waiting,
    Ready(Result<R>),
    Taken,
}

/// Single-value rendezvous between a transport and a metadata operation
pub struct ReplySlot<R> {
    state: Mutex<SlotState<R>>,
    ready: Condvar,
}

impl<R> ReplySlot<R> {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Waiting),
            ready: Condvar::new(),
        }
    }

    /// Create a slot together with the sender that fills it
    #[must_use]
    pub fn channel() -> (ReplySender<R>, Arc<Self>) {
        let slot = Arc::new(Self::new());
        let sender = ReplySender {
            slot: Some(Arc::clone(&slot)),
        };
        (sender, slot)
    }

    /// Create a slot already holding `result`
    #[must_use]
    pub fn completed(result: Result<R>) -> Arc<Self> {
        let slot = Arc::new(Self::new());
        slot.complete(result);
        slot
    }

    /// Store the reply and wake all waiters.
    ///
    /// Returns `false` if the slot was already completed.
    pub fn complete(&self, result: Result<R>) -> bool {
        let mut state = self.state.lock();
        if !matches!(*state, SlotState::Waiting) {
            return false;
        }
        *state = SlotState::Ready(result);
        drop(state);
        self.ready.notify_all();
        true
    }
}

impl<R: Send + 'static> ReplySlot<R> {
    /// Drive `fut` on a tokio runtime and deliver its output into a new slot
    pub fn spawn_on<F>(handle: &Handle, fut: F) -> Arc<Self>
    where
        F: Future<Output = Result<R>> + Send + 'static,
    {
        let (sender, slot) = Self::channel();
        handle.spawn(async move {
            let result = fut.await;
            sender.send(result);
        });
        slot
    }
}

impl<R> Default for ReplySlot<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Send> RawReply<R> for ReplySlot<R> {
    fn is_ready(&self) -> bool {
        !matches!(*self.state.lock(), SlotState::Waiting)
    }

    fn wait_ready(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.state.lock();
        while matches!(*state, SlotState::Waiting) {
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut state, deadline).timed_out() {
                        return !matches!(*state, SlotState::Waiting);
                    }
                }
                None => self.ready.wait(&mut state),
            }
        }
        true
    }

    fn take(&self) -> Result<R> {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(result) => result,
            SlotState::Taken => Err(Error::ReplyConsumed),
            SlotState::Waiting => {
                *state = SlotState::Waiting;
                Err(Error::NotReady)
            }
        }
    }
}

/// Completing side of a [`ReplySlot`].
///
/// Dropping it without sending fails the slot, so waiters are never
/// stranded by a transport that gave up on the call.
pub struct ReplySender<R> {
    slot: Option<Arc<ReplySlot<R>>>,
}

impl<R> ReplySender<R> {
    /// Deliver the reply
    pub fn send(mut self, result: Result<R>) {
        if let Some(slot) = self.slot.take() {
            slot.complete(result);
        }
    }
}

impl<R> Drop for ReplySender<R> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.complete(Err(Error::transport("reply abandoned by transport")));
        }
    }
}
