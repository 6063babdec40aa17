//! Cooperative cancellation shared by every task of one request.
//!
//! A [`CancelSource`] owns the signal; [`CancelToken`]s observe it. Tokens
//! are cheap to clone and are handed to every collaborator call, which races
//! its I/O against [`CancelToken::cancelled`].

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct CancelSource {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSource {
    /// A fresh, not yet cancelled source.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// A source that is also cancelled when `parent` fires.
    ///
    /// Spawns a forwarding task on the current Tokio runtime; the task exits
    /// once the parent fires or this source and all its tokens are dropped.
    #[must_use]
    pub fn child_of(parent: &CancelToken) -> Self {
        let child = Self::new();
        if parent.is_cancelled() {
            child.cancel();
            return child;
        }
        let tx = Arc::clone(&child.tx);
        let parent = parent.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = parent.cancelled() => {
                    let _ = tx.send(true);
                }
                () = tx.closed() => {}
            }
        });
        child
    }

    /// A token observing this source.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.rx.clone(),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Observer side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

impl CancelToken {
    /// A token that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal fires; pend forever if it never can.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // source dropped without firing
                std::future::pending::<()>().await;
            }
        }
    }
}
