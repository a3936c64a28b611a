//! Cooperative cancellation shared by every task of one invocation.
//!
//! A token is cancelled once and stays cancelled. Child tokens observe their
//! parent, so cancelling a caller's token reaches every pipeline task while a
//! pipeline-internal failure cancels only the pipeline's own child token.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::watch;

/// Returned by operations that stopped because their token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    tx: watch::Sender<bool>,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl Inner {
    fn cancel(&self) {
        // Flag first: `child()` reads it under the children lock
        self.tx.send_replace(true);
        let children = std::mem::take(&mut *self.children.lock());
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                tx,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Token cancelled by `self.cancel()` or by its own `cancel()`.
    pub fn child(&self) -> Self {
        let child = Self::new();
        let mut children = self.inner.children.lock();
        if *self.inner.tx.borrow() {
            child.cancel();
        } else {
            children.retain(|weak| weak.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        drop(children);
        child
    }

    /// Cancel this token and all of its children. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.tx.borrow()
    }

    /// Resolve once this token (or any ancestor) is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.tx.subscribe();
        // Sender lives in `inner`, so the channel cannot close under us
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `fut` unless the token is cancelled first.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancelled() => Err(Cancelled),
            out = fut => Ok(out),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_is_sticky() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        // resolves immediately once cancelled
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_parent_cancels_child() {
        let parent = CancelToken::new();
        let child = parent.child();
        let grandchild = child.child();

        parent.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        grandchild.cancelled().await;
    }

    #[tokio::test]
    async fn test_child_of_cancelled_parent_starts_cancelled() {
        let parent = CancelToken::new();
        parent.cancel();
        assert!(parent.child().is_cancelled());
    }

    #[tokio::test]
    async fn test_child_does_not_cancel_parent() {
        let parent = CancelToken::new();
        let child = parent.child();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let token = CancelToken::new();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_until_cancelled() {
        let token = CancelToken::new();
        assert_eq!(token.run_until_cancelled(async { 7 }).await, Ok(7));

        let slow = {
            let token = token.clone();
            tokio::spawn(async move {
                token
                    .run_until_cancelled(tokio::time::sleep(Duration::from_secs(30)))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), slow)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(Cancelled));
    }

    #[tokio::test]
    async fn test_run_until_cancelled_skips_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let result = token.run_until_cancelled(async { 1 }).await;
        assert_eq!(result, Err(Cancelled));
    }
}
