use super::engine::MessageStore;
use crate::core::{MessageEntity, Result, StoreError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A deferred store mutation.
#[derive(Debug, Clone)]
pub enum StoreCommand {
    Update(MessageEntity),
    Commit(String),
    Delete(String),
}

impl StoreCommand {
    fn apply(&self, store: &dyn MessageStore) -> bool {
        match self {
            StoreCommand::Update(entity) => store.update_entity(entity),
            StoreCommand::Commit(message_id) => store.commit(message_id),
            StoreCommand::Delete(message_id) => store.delete(message_id),
        }
    }
}

/// Totals reported by a drained worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Commands taken off the queue
    pub applied: u64,
    /// Commands the store answered with `false`
    pub rejected: u64,
}

/// Cloneable submission side of an [`AsyncStoreWorker`].
#[derive(Debug, Clone)]
pub struct AsyncStoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl AsyncStoreHandle {
    /// Enqueue without waiting; fails with `QueueFull` when the queue is at depth.
    pub fn try_submit(&self, command: StoreCommand) -> Result<()> {
        self.tx.try_send(command).map_err(StoreError::from)
    }

    /// Enqueue, waiting for queue capacity.
    pub async fn submit(&self, command: StoreCommand) -> Result<()> {
        self.tx.send(command).await.map_err(StoreError::from)
    }

    pub fn try_update(&self, entity: MessageEntity) -> Result<()> {
        self.try_submit(StoreCommand::Update(entity))
    }

    pub fn try_commit(&self, message_id: &str) -> Result<()> {
        self.try_submit(StoreCommand::Commit(message_id.to_string()))
    }

    pub fn try_delete(&self, message_id: &str) -> Result<()> {
        self.try_submit(StoreCommand::Delete(message_id.to_string()))
    }

    pub async fn update(&self, entity: MessageEntity) -> Result<()> {
        self.submit(StoreCommand::Update(entity)).await
    }

    pub async fn commit(&self, message_id: &str) -> Result<()> {
        self.submit(StoreCommand::Commit(message_id.to_string())).await
    }

    pub async fn delete(&self, message_id: &str) -> Result<()> {
        self.submit(StoreCommand::Delete(message_id.to_string())).await
    }
}

/// Background task applying fire-and-forget mutations to a store in
/// submission order.
pub struct AsyncStoreWorker {
    handle: Option<AsyncStoreHandle>,
    join_handle: Option<JoinHandle<WorkerStats>>,
}

impl AsyncStoreWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(store: Arc<dyn MessageStore>, queue_depth: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<StoreCommand>(queue_depth.max(1));

        let join_handle = tokio::spawn(async move {
            let mut stats = WorkerStats::default();
            while let Some(command) = rx.recv().await {
                stats.applied += 1;
                if !command.apply(store.as_ref()) {
                    stats.rejected += 1;
                    warn!(?command, "async store command rejected");
                }
            }
            debug!(applied = stats.applied, rejected = stats.rejected, "async store worker drained");
            stats
        });

        Self {
            handle: Some(AsyncStoreHandle { tx }),
            join_handle: Some(join_handle),
        }
    }

    pub fn handle(&self) -> Result<AsyncStoreHandle> {
        self.handle.clone().ok_or(StoreError::WorkerClosed)
    }

    /// Close the queue, apply everything already queued and wait for the
    /// task. Clones of the handle must be dropped for the drain to finish.
    pub async fn shutdown(mut self) -> Result<WorkerStats> {
        self.handle.take();

        match self.join_handle.take() {
            Some(join_handle) => join_handle
                .await
                .map_err(|err| StoreError::WorkerJoin(err.to_string())),
            None => Err(StoreError::WorkerClosed),
        }
    }
}

impl Drop for AsyncStoreWorker {
    fn drop(&mut self) {
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.abort();
        }
    }
}
