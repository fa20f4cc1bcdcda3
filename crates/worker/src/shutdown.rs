//! Process-wide cancellation token.
//!
//! Every long-running loop gets a clone at spawn time and checks it
//! between polls or cycles; nothing is cancelled mid-poll.

use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation token shared by all long-running tasks.
#[derive(Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signal all holders to stop after their current unit of work.
    pub fn trigger(&self) {
        let _ = self.sender.send(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Wait until shutdown is triggered.
    pub async fn triggered(&self) {
        let mut receiver = self.sender.subscribe();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
