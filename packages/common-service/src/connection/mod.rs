//! Health-checked datastore clients.
//!
//! Each helper connects, proves the connection with a round trip and only
//! then hands the client back. Failures are returned, never fatal.

pub mod kv;
pub mod sql;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub use kv::{
    connect_redis, connect_redis_cluster, connect_redis_cluster_with, connect_redis_with,
};
pub use sql::{connect_mysql, MySqlSettings};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Bounded retry for the connect-and-ping step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            interval: Duration::from_millis(500),
        }
    }
}

pub(crate) async fn retry_connection<T, F, Fut>(
    target: &str,
    policy: RetryPolicy,
    mut connect_fn: F,
) -> Result<T, ConnectionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ConnectionError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match connect_fn().await {
            Ok(conn) => {
                info!(target_kind = target, attempts = attempt, "connection_established");
                return Ok(conn);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    target_kind = target,
                    attempt,
                    max_attempts,
                    error = %e,
                    "connection_retry=failed"
                );
                tokio::time::sleep(policy.interval).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
