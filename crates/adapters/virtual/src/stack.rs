//! Outbound stack: queues scene calls and applies them in batches after a
//! fixed delay.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use dsbridge_domain::scene::SceneKey;

use crate::Shared;

const QUEUE_SIZE: usize = 64;

pub(crate) struct Stack {
    sender: mpsc::Sender<SceneKey>,
    handle: JoinHandle<()>,
}

impl Stack {
    pub(crate) fn spawn(shared: Arc<Shared>, delay: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_SIZE);
        let handle = tokio::spawn(run(shared, receiver, delay));
        Self { sender, handle }
    }

    pub(crate) fn sender(&self) -> mpsc::Sender<SceneKey> {
        self.sender.clone()
    }

    /// Abort the task; calls still queued are dropped.
    pub(crate) fn stop(self) {
        self.handle.abort();
    }
}

async fn run(shared: Arc<Shared>, mut receiver: mpsc::Receiver<SceneKey>, delay: Duration) {
    while let Some(first) = receiver.recv().await {
        tokio::time::sleep(delay).await;

        let mut batch = vec![first];
        while let Ok(next) = receiver.try_recv() {
            batch.push(next);
        }
        tracing::debug!(calls = batch.len(), "flushing outbound stack");
        for key in batch {
            shared.apply(key).await;
        }
    }
}
