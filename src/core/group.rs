//! First-error task group.
//!
//! Runs any number of fallible tasks concurrently under one [`CancelToken`].
//! The first failure is recorded and cancels every sibling, both in flight and
//! not yet polled. [`TaskGroup::wait`] joins all tasks before returning, so no
//! task outlives the group.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{JoinError, JoinSet};

use super::cancel::{CancelToken, Cancelled};

pub struct TaskGroup<E> {
    tasks: JoinSet<()>,
    token: CancelToken,
    first_error: Arc<Mutex<Option<E>>>,
}

impl<E> TaskGroup<E>
where
    E: Send + 'static,
{
    /// Create a group whose token is a child of `parent`.
    pub fn new(parent: &CancelToken) -> Self {
        Self {
            tasks: JoinSet::new(),
            token: parent.child(),
            first_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Token shared by every task of this group.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Number of tasks not yet joined.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn a task. Once the group is cancelled the task is dropped at its
    /// next suspension point without completing.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
    {
        let token = self.token.clone();
        let slot = Arc::clone(&self.first_error);

        self.tasks.spawn(async move {
            if let Ok(Err(err)) = token.run_until_cancelled(task).await {
                record(&slot, &token, err);
            }
        });
    }

    /// Record a failure raised outside of a task (e.g. by the control loop).
    pub fn fail(&self, err: E) {
        record(&self.first_error, &self.token, err);
    }

    /// Join every task, then report the first recorded error.
    ///
    /// Returns `Cancelled` when the parent token was cancelled and no task
    /// failed on its own.
    pub async fn wait(mut self) -> Result<(), E>
    where
        E: From<Cancelled> + From<JoinError>,
    {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                self.fail(E::from(err));
            }
        }

        if let Some(err) = self.first_error.lock().take() {
            return Err(err);
        }
        if self.token.is_cancelled() {
            return Err(E::from(Cancelled));
        }
        Ok(())
    }
}

fn record<E>(slot: &Mutex<Option<E>>, token: &CancelToken, err: E) {
    let mut slot = slot.lock();
    if slot.is_none() {
        *slot = Some(err);
    }
    drop(slot);
    token.cancel();
}
