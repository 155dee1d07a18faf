//! Stop and cancellation signalling for writer loops.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Why a writer loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Stop,
    Cancel,
}

/// Shared cancellation flag.
///
/// Clones share state. Cancelling wakes every writer loop registered on the
/// token; loops registered afterwards are woken immediately.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    waiters: Mutex<Vec<(u64, Sender<Signal>)>>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake all registered loops.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let mut waiters = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, waiter) in waiters.drain(..) {
            let _ = waiter.send(Signal::Cancel);
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn waiters(&self) -> MutexGuard<'_, Vec<(u64, Sender<Signal>)>> {
        self.inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The sender stays registered until the returned guard drops.
    fn register(&self, sender: Sender<Signal>) -> Registration<'_> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut waiters = self.waiters();
        if self.is_cancelled() {
            let _ = sender.send(Signal::Cancel);
        } else {
            waiters.push((id, sender));
        }
        Registration { token: self, id }
    }
}

struct Registration<'a> {
    token: &'a CancellationToken,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.token.waiters().retain(|(id, _)| *id != self.id);
    }
}

/// Channel a writer's `start` loop blocks on.
#[derive(Debug)]
pub(crate) struct Control {
    sender: Sender<Signal>,
    receiver: Mutex<Receiver<Signal>>,
}

impl Control {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Ask the running loop to finish.
    pub(crate) fn stop(&self) {
        let _ = self.sender.send(Signal::Stop);
    }

    /// Block until stopped or cancelled, calling `tick` every `interval` when
    /// one is given.
    pub(crate) fn wait(
        &self,
        cancel: &CancellationToken,
        interval: Option<Duration>,
        mut tick: impl FnMut(),
    ) -> Signal {
        let _registration = cancel.register(self.sender.clone());
        let receiver = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let received = match interval {
                Some(interval) => receiver.recv_timeout(interval),
                None => receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(signal) => return signal,
                Err(RecvTimeoutError::Timeout) => tick(),
                Err(RecvTimeoutError::Disconnected) => return Signal::Stop,
            }
        }
    }
}
