use futures::future::BoxFuture;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;

/// A cloneable cancellation signal.
///
/// Clones share the same signal. A token made with [`CancelToken::child`] is cancelled
/// whenever its parent is, but cancelling the child leaves the parent untouched.
#[derive(Clone, Debug)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
    parent: Option<Box<CancelToken>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
            parent: None,
        }
    }

    pub fn child(&self) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Fires the signal. Calling it again is a no-op.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_cancelled())
    }

    /// Cancels the token once `duration` has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn cancel_after(&self, duration: Duration) {
        let token = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => token.cancel(),
                _ = token.cancelled() => {}
            }
        });
    }

    /// Resolves once the token, or any of its ancestors, is cancelled.
    pub fn cancelled(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let mut own = self.state.subscribe();
            let own_fired = async move {
                loop {
                    if *own.borrow_and_update() {
                        return;
                    }
                    // The sender lives in `self`, so this only fails after we are gone.
                    if own.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
            };

            match &self.parent {
                Some(parent) => tokio::select! {
                    _ = own_fired => {}
                    _ = parent.cancelled() => {}
                },
                None => own_fired.await,
            }
        })
    }
}
