/// Async store worker tests
///
/// Run with: cargo test --test async_worker_tests

use kitestore::{
    AsyncStoreWorker, MemoryMessageStore, MessageBody, MessageEntity, MessageHeader, MessageStore,
    StoreCommand, StoreError,
};
use std::sync::Arc;

fn entity(id: &str) -> MessageEntity {
    let header = MessageHeader::new(id, "trade");
    MessageEntity::new(header, MessageBody::default())
        .expired_time(i64::MAX)
        .next_deliver_time(0)
}

#[tokio::test]
async fn test_worker_applies_commands_in_order() {
    let store = Arc::new(MemoryMessageStore::new(8, 8));
    store.save(entity("m1"));
    store.save(entity("m2"));

    let worker = AsyncStoreWorker::spawn(store.clone(), 16);
    let handle = worker.handle().unwrap();

    handle.update(entity("m1").deliver_count(4)).await.unwrap();
    handle.commit("m1").await.unwrap();
    handle.delete("m2").await.unwrap();
    drop(handle);

    let stats = worker.shutdown().await.unwrap();
    assert_eq!(stats.applied, 3);
    assert_eq!(stats.rejected, 0);

    let m1 = store.query("m1").unwrap();
    assert_eq!(m1.deliver_count, 4);
    assert!(m1.commit);
    assert!(store.query("m2").is_none());
}

#[tokio::test]
async fn test_worker_counts_rejected_commits() {
    let store = Arc::new(MemoryMessageStore::new(4, 4));

    let worker = AsyncStoreWorker::spawn(store.clone(), 4);
    let handle = worker.handle().unwrap();
    handle.try_commit("missing").unwrap();
    handle.try_delete("missing").unwrap();
    handle.try_update(entity("missing")).unwrap();
    drop(handle);

    let stats = worker.shutdown().await.unwrap();
    assert_eq!(stats.applied, 3);
    assert_eq!(stats.rejected, 1);
    assert!(store.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn test_try_submit_reports_full_queue() {
    let store = Arc::new(MemoryMessageStore::new(4, 4));
    store.save(entity("m1"));

    // current_thread: the worker cannot drain until this task yields
    let worker = AsyncStoreWorker::spawn(store.clone(), 1);
    let handle = worker.handle().unwrap();

    handle.try_submit(StoreCommand::Commit("m1".into())).unwrap();
    let err = handle.try_commit("m1").unwrap_err();
    assert!(matches!(err, StoreError::QueueFull));
    drop(handle);

    let stats = worker.shutdown().await.unwrap();
    assert_eq!(stats.applied, 1);
    assert!(store.query("m1").unwrap().commit);
}

#[tokio::test]
async fn test_shutdown_idle_worker() {
    let store = Arc::new(MemoryMessageStore::new(4, 4));
    let worker = AsyncStoreWorker::spawn(store.clone(), 4);

    let stats = worker.shutdown().await.unwrap();
    assert_eq!(stats.applied, 0);
    assert_eq!(stats.rejected, 0);
}

#[tokio::test]
async fn test_many_handles_share_one_queue() {
    let store = Arc::new(MemoryMessageStore::new(64, 64));
    for i in 0..40 {
        store.save(entity(&format!("m{}", i)));
    }

    let worker = AsyncStoreWorker::spawn(store.clone(), 8);
    let mut tasks = vec![];
    for t in 0..4 {
        let handle = worker.handle().unwrap();
        tasks.push(tokio::spawn(async move {
            for i in (t..40).step_by(4) {
                handle.commit(&format!("m{}", i)).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stats = worker.shutdown().await.unwrap();
    assert_eq!(stats.applied, 40);
    assert_eq!(stats.rejected, 0);
    for i in 0..40 {
        assert!(store.query(&format!("m{}", i)).unwrap().commit);
    }
}
