//! Queued-delivery worker behavior against in-memory collaborators

use std::sync::Arc;
use std::time::Duration;

use bot_server::dispatch::NotificationWorker;
use bot_server::gateway::MemoryGateway;
use bot_server::store::{MemoryTaskStore, TaskStore};
use shared::models::{NotificationTask, TaskStatus};
use tokio_util::sync::CancellationToken;

fn pending_task(id: i64, recipient_id: i64, created_at: i64) -> NotificationTask {
    NotificationTask {
        id,
        recipient_id,
        message_text: format!("order update {id}"),
        status: TaskStatus::Pending,
        created_at,
        sent_at: None,
    }
}

fn worker(
    tasks: Arc<MemoryTaskStore>,
    gateway: Arc<MemoryGateway>,
    batch_size: usize,
) -> NotificationWorker {
    NotificationWorker::new(
        tasks,
        gateway,
        Duration::from_secs(30),
        Duration::from_secs(10),
        batch_size,
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn cycle_processes_at_most_batch_size_oldest_first() {
    let tasks = Arc::new(MemoryTaskStore::new());
    let gateway = Arc::new(MemoryGateway::new());

    // Seed 15 tasks out of creation order
    for id in 0..15_i64 {
        let created_at = 1_000 + ((id * 7) % 15) * 10;
        tasks.seed(pending_task(id, 500 + id, created_at)).await;
    }

    let stats = worker(tasks.clone(), gateway.clone(), 10)
        .poll_cycle()
        .await
        .unwrap();

    assert_eq!(stats.fetched, 10);
    assert_eq!(stats.sent, 10);
    assert_eq!(stats.failed, 0);

    // Exactly the 10 oldest were delivered
    let mut all = tasks.all().await;
    all.sort_by_key(|t| t.created_at);
    for (idx, task) in all.iter().enumerate() {
        let expected = if idx < 10 {
            TaskStatus::Sent
        } else {
            TaskStatus::Pending
        };
        assert_eq!(task.status, expected, "task {} at position {idx}", task.id);
    }
    assert_eq!(gateway.sent().await.len(), 10);
}

#[tokio::test]
async fn successful_delivery_sets_sent_at() {
    let tasks = Arc::new(MemoryTaskStore::new());
    let gateway = Arc::new(MemoryGateway::new());
    tasks.seed(pending_task(1, 42, 1_000)).await;

    worker(tasks.clone(), gateway, 10).poll_cycle().await.unwrap();

    let task = tasks.get(1).await.unwrap();
    assert_eq!(task.status, TaskStatus::Sent);
    assert!(task.sent_at.is_some());
}

#[tokio::test]
async fn failed_delivery_stays_pending_and_retries_until_success() {
    let tasks = Arc::new(MemoryTaskStore::new());
    let gateway = Arc::new(MemoryGateway::new());
    tasks.seed(pending_task(1, 10, 1_000)).await;
    tasks.seed(pending_task(2, 20, 2_000)).await;
    tasks.seed(pending_task(3, 30, 3_000)).await;
    gateway.fail_recipient(20).await;

    let worker = worker(tasks.clone(), gateway.clone(), 10);

    let stats = worker.poll_cycle().await.unwrap();
    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.sent, 2);
    assert_eq!(stats.failed, 1);

    let stuck = tasks.get(2).await.unwrap();
    assert_eq!(stuck.status, TaskStatus::Pending);
    assert_eq!(stuck.sent_at, None);

    // Still eligible next cycle; no retry counter gives up on it
    let stats = worker.poll_cycle().await.unwrap();
    assert_eq!(stats.fetched, 1);
    assert_eq!(stats.failed, 1);

    // Once the recipient becomes reachable the task finally goes out
    gateway.clear_failure(20).await;
    let stats = worker.poll_cycle().await.unwrap();
    assert_eq!(stats.sent, 1);
    assert_eq!(tasks.get(2).await.unwrap().status, TaskStatus::Sent);

    // Recipients 10 and 30 were never re-sent
    assert_eq!(gateway.sent_to(10).await, 1);
    assert_eq!(gateway.sent_to(30).await, 1);
}

#[tokio::test]
async fn empty_queue_is_a_quiet_cycle() {
    let tasks = Arc::new(MemoryTaskStore::new());
    let gateway = Arc::new(MemoryGateway::new());

    let stats = worker(tasks, gateway.clone(), 10).poll_cycle().await.unwrap();
    assert_eq!(stats.fetched, 0);
    assert!(gateway.sent().await.is_empty());
}

#[tokio::test]
async fn run_loop_drains_queue_and_stops_on_shutdown() {
    let tasks = Arc::new(MemoryTaskStore::new());
    let gateway = Arc::new(MemoryGateway::new());
    for id in 0..3_i64 {
        tasks.seed(pending_task(id, 100 + id, 1_000 + id)).await;
    }

    let shutdown = CancellationToken::new();
    let worker = NotificationWorker::new(
        tasks.clone(),
        gateway.clone(),
        Duration::from_millis(20),
        Duration::from_millis(1),
        10,
        shutdown.clone(),
    );
    let handle = tokio::spawn(worker.run());

    // Give the worker a few cycles
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();
    handle.await.unwrap();

    assert_eq!(gateway.sent().await.len(), 3);
    assert!(tasks.fetch_pending(10).await.unwrap().is_empty());
}
