//! Deferred metadata operations
//!
//! A [`MetadataOp`] wraps the raw reply of a remote metadata call together
//! with the step that turns it into a domain value. The step runs once,
//! on whichever caller first observes the reply, and its outcome is cached
//! for everyone after that.
//!
//! ```text
//!            reply ready, translate ok
//!   Pending ─────────────────────────────▶ Done(T)
//!      │
//!      │     reply failed / translate err
//!      └─────────────────────────────────▶ Failed(Error)
//! ```
//!
//! A timed wait that expires leaves the operation `Pending`.

use crate::reply::RawReply;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use tierio_common::{ClientConfig, Error, Result};
use tracing::{debug, trace, warn};

/// Uniform asynchronous-result contract for metadata calls
pub trait MetaFuture {
    type Output;

    /// Whether the operation has settled. Settles it if the reply is in.
    fn poll_done(&self) -> bool;

    /// Block until the operation settles and return its outcome
    fn await_result(&self) -> Result<Self::Output>;

    /// Like [`await_result`](Self::await_result) with a bounded wait.
    ///
    /// Returns [`Error::NotReady`] if the reply has not arrived; the
    /// operation stays pending and may be awaited again.
    fn await_result_with_timeout(&self, timeout: Duration) -> Result<Self::Output>;

    /// Cancellation is not supported; always `false`
    fn cancel(&self, _may_interrupt: bool) -> bool {
        false
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Observable phase of a [`MetadataOp`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpStatus {
    Pending,
    Done,
    Error,
}

type Translate<R, T> = Box<dyn FnOnce(R) -> Result<T> + Send>;

enum OpState<R, T> {
    Pending(Translate<R, T>),
    Done(T),
    Failed(Error),
}

impl<R, T> OpState<R, T> {
    const fn status(&self) -> OpStatus {
        match self {
            Self::Pending(_) => OpStatus::Pending,
            Self::Done(_) => OpStatus::Done,
            Self::Failed(_) => OpStatus::Error,
        }
    }
}

impl<R, T: Clone> OpState<R, T> {
    fn outcome(&self) -> Option<Result<T>> {
        match self {
            Self::Pending(_) => None,
            Self::Done(value) => Some(Ok(value.clone())),
            Self::Failed(err) => Some(Err(err.clone())),
        }
    }
}

/// Metadata call whose reply is translated on first observation
pub struct MetadataOp<R, T> {
    op: &'static str,
    config: ClientConfig,
    reply: Arc<dyn RawReply<R>>,
    state: Mutex<OpState<R, T>>,
}

impl<R, T: Clone> MetadataOp<R, T> {
    /// Wrap `reply`, deferring `translate` until the reply arrives
    pub fn new<F>(
        op: &'static str,
        config: ClientConfig,
        reply: Arc<dyn RawReply<R>>,
        translate: F,
    ) -> Self
    where
        F: FnOnce(R) -> Result<T> + Send + 'static,
    {
        Self {
            op,
            config,
            reply,
            state: Mutex::new(OpState::Pending(Box::new(translate))),
        }
    }

    /// Name of the metadata call
    #[must_use]
    pub const fn op(&self) -> &'static str {
        self.op
    }

    /// Current phase, without touching the reply
    pub fn status(&self) -> OpStatus {
        self.state.lock().status()
    }

    /// Settle the operation if the reply is in, returning the locked state.
    ///
    /// The check and the translation share one critical section, so the
    /// translation runs at most once no matter how many callers race here.
    fn settle(&self) -> MutexGuard<'_, OpState<R, T>> {
        let mut state = self.state.lock();
        if matches!(*state, OpState::Pending(_)) && self.reply.is_ready() {
            // Placeholder is only visible if the translation panics.
            let pending = mem::replace(
                &mut *state,
                OpState::Failed(Error::internal("translation panicked")),
            );
            if let OpState::Pending(translate) = pending {
                *state = match self.reply.take().and_then(translate) {
                    Ok(value) => {
                        debug!(op = self.op, "metadata reply translated");
                        OpState::Done(value)
                    }
                    Err(err) => {
                        warn!(op = self.op, error = %err, "metadata operation failed");
                        OpState::Failed(err)
                    }
                };
            }
        }
        state
    }

    fn wait_and_settle(&self, timeout: Option<Duration>) -> Result<T> {
        // Never wait on the reply while holding the state lock.
        let settled = self.state.lock().outcome();
        if let Some(outcome) = settled {
            return outcome;
        }

        if !self.reply.wait_ready(timeout) {
            trace!(op = self.op, ?timeout, "metadata reply not ready");
        }
        self.settle().outcome().unwrap_or(Err(Error::NotReady))
    }
}

impl<R, T: Clone> MetaFuture for MetadataOp<R, T> {
    type Output = T;

    fn poll_done(&self) -> bool {
        !matches!(*self.settle(), OpState::Pending(_))
    }

    fn await_result(&self) -> Result<T> {
        self.wait_and_settle(None)
    }

    fn await_result_with_timeout(&self, timeout: Duration) -> Result<T> {
        self.wait_and_settle(Some(self.config.wait_timeout(timeout)))
    }
}

impl<R, T> fmt::Debug for MetadataOp<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.state.lock().status();
        f.debug_struct("MetadataOp")
            .field("op", &self.op)
            .field("status", &status)
            .finish_non_exhaustive()
    }
}

/// Already-finished operation for calls that needed no round trip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoOperation;

impl MetaFuture for NoOperation {
    type Output = ();

    fn poll_done(&self) -> bool {
        true
    }

    fn await_result(&self) -> Result<()> {
        Ok(())
    }

    fn await_result_with_timeout(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}
