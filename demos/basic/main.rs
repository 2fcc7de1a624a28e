//! Basic example using the in-memory backend.
//!
//! This example demonstrates:
//! - Enqueueing work item identifiers from a client
//! - Draining the queue at a fixed rate with a paced worker
//!
//! Run with: `cargo run --example basic`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use paceq::{generate_rand_id, MemoryBackend, ProcessError, Queue, WorkItem, Worker};

/// Push notification owned by the caller; only its identifier travels
/// through the queue.
#[derive(Debug, Clone)]
struct Notification {
    rand_id: String,
    recipient: String,
    message: String,
}

impl WorkItem for Notification {
    fn rand_id(&self) -> &str {
        &self.rand_id
    }
}

#[tokio::main]
async fn main() -> paceq::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("paceq basic example\n");

    let backend = MemoryBackend::new();
    let queue = Queue::new(backend.clone(), "notifications");

    let notifications: Vec<Notification> = [
        ("alice", "Your order shipped"),
        ("bob", "Password reset requested"),
        ("charlie", "Welcome aboard!"),
        ("diana", "Weekly digest is ready"),
        ("eve", "New login from Berlin"),
    ]
    .into_iter()
    .map(|(recipient, message)| Notification {
        rand_id: generate_rand_id(),
        recipient: recipient.to_string(),
        message: message.to_string(),
    })
    .collect();

    // The item store stands in for whatever database owns the items.
    let store: Arc<HashMap<String, Notification>> = Arc::new(
        notifications
            .iter()
            .map(|n| (n.rand_id.clone(), n.clone()))
            .collect(),
    );

    println!("Enqueueing {} notifications...\n", notifications.len());
    for notification in &notifications {
        queue.add(notification).await?;
        println!("  enqueued: {}", notification.rand_id());
    }

    println!("\nQueue length: {}", queue.queue_len().await?);
    println!("Starting worker at 120 items/minute (one every 500ms)...\n");

    let processor = {
        let store = store.clone();
        move |rand_id: String| {
            let store = store.clone();
            async move {
                match store.get(&rand_id) {
                    Some(notification) => {
                        println!(
                            "[notify] to: {:<8} {}",
                            notification.recipient, notification.message
                        );
                        Ok(())
                    }
                    None => Err(ProcessError::fatal("unknown identifier")),
                }
            }
        }
    };

    let worker = Worker::builder()
        .backend(backend)
        .name("notifications")
        .throughput(120)
        .max_in_flight(4)
        .shutdown_timeout(Duration::from_secs(5))
        .processor(processor)
        .reporter(|err, rand_id| {
            eprintln!("[error] rand_id={} {}", rand_id, err);
        })
        .build()?;

    // Five items at 500ms pacing drain in ~2.5s; give it 4.
    worker
        .run_until(tokio::time::sleep(Duration::from_secs(4)))
        .await?;

    println!("\nQueue length after drain: {}", queue.queue_len().await?);
    println!("Done");
    Ok(())
}
