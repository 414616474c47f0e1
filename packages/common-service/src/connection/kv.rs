use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::Client;

use super::{retry_connection, ConnectionError, RetryPolicy};

/// Build a `redis://` URL for a standalone server, database 0.
pub fn redis_url(addr: &str, password: Option<&str>) -> Result<String, ConnectionError> {
    Ok(format!("{}/0", node_url(addr, password)?))
}

/// Seed node URL for cluster mode. Clusters have no database index.
pub fn cluster_node_url(addr: &str, password: Option<&str>) -> Result<String, ConnectionError> {
    node_url(addr, password)
}

fn node_url(addr: &str, password: Option<&str>) -> Result<String, ConnectionError> {
    let addr = addr.trim();
    if addr.is_empty() || addr.contains('/') || addr.contains('@') {
        return Err(ConnectionError::InvalidAddress(addr.to_string()));
    }

    Ok(match password.filter(|p| !p.is_empty()) {
        Some(password) => format!(
            "redis://:{}@{}",
            utf8_percent_encode(password, NON_ALPHANUMERIC),
            addr
        ),
        None => format!("redis://{addr}"),
    })
}

/// Connect to a standalone Redis server and confirm it answers `PING`.
pub async fn connect_redis(
    addr: &str,
    password: Option<&str>,
) -> Result<ConnectionManager, ConnectionError> {
    connect_redis_with(addr, password, RetryPolicy::default()).await
}

pub async fn connect_redis_with(
    addr: &str,
    password: Option<&str>,
    policy: RetryPolicy,
) -> Result<ConnectionManager, ConnectionError> {
    let client = Client::open(redis_url(addr, password)?.as_str())?;

    retry_connection("redis", policy, || {
        let client = client.clone();
        async move {
            let mut manager = ConnectionManager::new(client).await?;
            let _pong: String = redis::cmd("PING").query_async(&mut manager).await?;
            Ok::<_, ConnectionError>(manager)
        }
    })
    .await
}

/// Connect to a Redis cluster through one seed node and confirm it answers
/// `PING`. The remaining topology is discovered from the seed.
pub async fn connect_redis_cluster(
    addr: &str,
    password: Option<&str>,
) -> Result<ClusterConnection, ConnectionError> {
    connect_redis_cluster_with(addr, password, RetryPolicy::default()).await
}

pub async fn connect_redis_cluster_with(
    addr: &str,
    password: Option<&str>,
    policy: RetryPolicy,
) -> Result<ClusterConnection, ConnectionError> {
    let client = ClusterClient::new(vec![cluster_node_url(addr, password)?])?;

    retry_connection("redis-cluster", policy, || {
        let client = client.clone();
        async move {
            let mut conn = client.get_async_connection().await?;
            let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, ConnectionError>(conn)
        }
    })
    .await
}
