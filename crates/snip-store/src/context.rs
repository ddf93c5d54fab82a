//! Per-call cancellation and deadline signaling.
//!
//! Every store operation takes a [`Context`]. Network-bound backends race
//! their I/O against it with [`Context::run`]; local backends ignore it.
//!
//! Contexts form a tree: a context derived with [`Context::with_cancel`] is
//! cancelled when its own [`CancelHandle`] fires or when any ancestor's does.
//! Derived deadlines only ever shrink.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{StoreError, StoreResult};

/// Cancellation and deadline carrier passed to every store call.
#[derive(Clone, Debug, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<Arc<CancelNode>>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context whose deadline is `timeout` from now.
    ///
    /// A timeout too large to represent as an instant adds no deadline; any
    /// existing deadline is kept.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// Derive a context with the given deadline.
    ///
    /// If this context already has an earlier deadline, that one is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing <= deadline => existing,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.clone(),
        }
    }

    /// Derive a cancellable context and the handle that cancels it.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let node = match &self.cancel {
            Some(parent) => CancelNode::child(parent),
            None => CancelNode::new(),
        };
        let ctx = Self {
            deadline: self.deadline,
            cancel: Some(Arc::clone(&node)),
        };
        (ctx, CancelHandle { node })
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if any. Zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` once this context or an ancestor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|node| node.is_cancelled())
    }

    /// Returns `true` once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first.
    ///
    /// Cancellation wins over expiry, and both win over a future that is
    /// ready at the same poll. `fut` is dropped when the context fires.
    pub async fn run<F, T>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if self.is_expired() {
            return Err(StoreError::DeadlineExceeded);
        }

        let cancelled = async {
            match &self.cancel {
                Some(node) => node.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(StoreError::Cancelled),
            _ = expired => Err(StoreError::DeadlineExceeded),
            res = fut => res,
        }
    }
}

/// Cancels the [`Context`] it was created with, and every context derived
/// from it.
///
/// Dropping the handle does not cancel.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    node: Arc<CancelNode>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.node.cancel();
    }
}

#[derive(Debug)]
struct CancelNode {
    tx: watch::Sender<bool>,
    children: Mutex<Vec<Weak<CancelNode>>>,
}

impl CancelNode {
    fn new() -> Arc<Self> {
        let (tx, _rx) = watch::channel(false);
        Arc::new(Self {
            tx,
            children: Mutex::new(Vec::new()),
        })
    }

    fn child(parent: &Arc<Self>) -> Arc<Self> {
        let child = Self::new();
        // Flag check and registration happen under the same lock as cancel().
        let mut children = parent.children.lock().expect("lock poisoned");
        if parent.is_cancelled() {
            child.tx.send_replace(true);
        } else {
            children.retain(|weak| weak.strong_count() > 0);
            children.push(Arc::downgrade(&child));
        }
        drop(children);
        child
    }

    fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    fn cancel(&self) {
        let children = {
            let mut children = self.children.lock().expect("lock poisoned");
            self.tx.send_replace(true);
            std::mem::take(&mut *children)
        };
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }

    async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
