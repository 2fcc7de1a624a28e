//! Redis backend example with retries and dead-lettering.
//!
//! This example demonstrates:
//! - Using Redis as the durable queue
//! - At-least-once retry when the processor fails
//! - Dead-lettering an identifier that keeps failing
//! - Graceful shutdown
//!
//! Prerequisites:
//! - Redis server running on localhost:6379
//!
//! Run with: `cargo run --example redis`

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use paceq::{ProcessError, Queue, RedisBackend, RetryPolicy, Worker};

// Track attempts for the flaky identifier to show retry behavior.
static FLAKY_ATTEMPTS: AtomicU32 = AtomicU32::new(0);

async fn process(rand_id: String) -> Result<(), ProcessError> {
    match rand_id.as_str() {
        "webhook-flaky" => {
            let attempt = FLAKY_ATTEMPTS.fetch_add(1, Ordering::SeqCst) + 1;
            println!("[process] {} attempt={}", rand_id, attempt);
            if attempt <= 2 {
                println!("[process] failed, will be re-enqueued\n");
                return Err(ProcessError::retryable("connection timeout"));
            }
            println!("[process] delivered\n");
            Ok(())
        }
        "webhook-broken" => {
            println!("[process] {} is permanently broken\n", rand_id);
            Err(ProcessError::retryable("upstream gone"))
        }
        _ => {
            println!("[process] {} ok\n", rand_id);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> paceq::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("paceq Redis example\n");

    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost".to_string());

    println!("Connecting to {}...", redis_url);

    let backend = match RedisBackend::new(&redis_url).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to connect: {}", e);
            eprintln!("Make sure Redis is running: docker run -d -p 6379:6379 redis");
            return Err(e);
        }
    };

    println!("Connected\n");

    let queue = Queue::new(backend.clone(), "webhooks");

    for rand_id in ["webhook-1", "webhook-flaky", "webhook-2", "webhook-broken"] {
        queue.push_id(rand_id).await?;
        println!("enqueued: {}", rand_id);
    }

    println!("\nQueue length: {}", queue.queue_len().await?);
    println!("\nStarting worker at 30 items/minute (one every 2s)...");
    println!("\"webhook-flaky\" fails twice before succeeding;");
    println!("\"webhook-broken\" is dead-lettered after 3 attempts.");
    println!("Press Ctrl+C to stop\n");

    let worker = Worker::builder()
        .backend(backend)
        .name("webhooks")
        .throughput(30)
        .max_in_flight(8)
        .retry(RetryPolicy::MaxAttempts(3))
        .shutdown_timeout(Duration::from_secs(5))
        .processor(process)
        .reporter(|err, rand_id| {
            tracing::error!(rand_id = %rand_id, error = %err, "queue failure");
        })
        .build()?;

    worker.run().await?;

    println!("\nDead-lettered identifiers: {}", queue.dead_len().await?);
    for entry in queue.list_dead(10, 0).await? {
        println!("  {} ({})", entry.rand_id, entry.error);
    }

    Ok(())
}
