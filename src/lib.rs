//! # paceq - Throughput-Bounded Work Queue
//!
//! A Rust library for queues that admit work into processing at a fixed
//! rate. Producers enqueue work-item identifiers onto a named durable
//! list (Redis in production, in-memory for tests); a single paced
//! worker loop pops one identifier per interval and dispatches it to a
//! caller-supplied processor, re-enqueueing the identifier when
//! processing fails.
//!
//! ## Features
//!
//! - **Paced dispatch**: a target throughput in items per minute is
//!   turned into a fixed inter-dequeue interval
//! - **At-least-once retries**: failed identifiers go back onto the
//!   queue tail; retry behavior is configurable up to dead-lettering
//! - **Bounded concurrency**: a cap on in-flight dispatches, so a slow
//!   processor cannot grow tasks without bound
//! - **Failure isolation**: every failure is surfaced through a
//!   reporter callback; the loop itself never dies
//! - **Graceful shutdown**: an explicit shutdown signal with a drain
//!   timeout for in-flight dispatches
//!
//! ## Quick Start
//!
//! ### Enqueueing
//!
//! ```rust,no_run
//! use paceq::{Queue, RedisBackend, WorkItem};
//!
//! struct Invoice {
//!     rand_id: String,
//! }
//!
//! impl WorkItem for Invoice {
//!     fn rand_id(&self) -> &str {
//!         &self.rand_id
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> paceq::Result<()> {
//!     let backend = RedisBackend::new("redis://localhost").await?;
//!     let queue = Queue::new(backend, "invoices");
//!
//!     let invoice = Invoice {
//!         rand_id: paceq::generate_rand_id(),
//!     };
//!     queue.add(&invoice).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Processing
//!
//! ```rust,no_run
//! use paceq::{ProcessResult, RedisBackend, Worker};
//!
//! async fn process(rand_id: String) -> ProcessResult {
//!     println!("processing: {}", rand_id);
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> paceq::Result<()> {
//!     let backend = RedisBackend::new("redis://localhost").await?;
//!
//!     let worker = Worker::builder()
//!         .backend(backend)
//!         .name("invoices")
//!         .throughput(60) // one identifier per second
//!         .processor(process)
//!         .reporter(|err, rand_id| {
//!             tracing::error!(rand_id = %rand_id, error = %err, "queue failure");
//!         })
//!         .build()?;
//!
//!     worker.run().await // until ctrl-c
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod dead;
pub mod error;
pub mod item;
pub mod worker;

// Re-export main types
pub use backend::memory::MemoryBackend;
pub use backend::redis::{RedisBackend, RedisKeys};
pub use backend::{DynBackend, QueueBackend, SharedBackend};
pub use client::Queue;
pub use config::{pace_interval, RetryPolicy, WorkerConfig, WorkerConfigBuilder};
pub use dead::DeadEntry;
pub use error::{PaceqError, Result};
pub use item::{generate_rand_id, WorkItem};
pub use worker::{ProcessError, ProcessResult, Worker, WorkerBuilder};
