//! Redis handoff to the external tailoring worker. Job ids are LPUSHed onto
//! a list the worker BRPOPs from.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// List key the external worker consumes from.
pub const TAILOR_QUEUE_KEY: &str = "tailor:jobs";

/// The queue seam the handlers talk to. Concrete pushes go to Redis; tests
/// record ids through a double instead.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueues a job id for the worker. Called on create and on requeue.
    async fn enqueue(&self, job_id: Uuid) -> Result<(), AppError>;
}

/// Redis-backed queue on one multiplexed connection shared by every
/// handler. The connection is established once at startup, and enqueue
/// clones the handle instead of dialing.
pub struct RedisQueue {
    conn: MultiplexedConnection,
}

impl RedisQueue {
    /// Opens the client and establishes the shared connection. Startup
    /// fails if Redis is unreachable.
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl JobQueue for RedisQueue {
    async fn enqueue(&self, job_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(TAILOR_QUEUE_KEY, job_id.to_string()).await?;
        info!("Enqueued job {job_id} on {TAILOR_QUEUE_KEY}");
        Ok(())
    }
}
