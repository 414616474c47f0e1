use std::fmt;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Connection;

use super::{retry_connection, ConnectionError, RetryPolicy};

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// MySQL connection parameters.
#[derive(Clone)]
pub struct MySqlSettings {
    /// `host` or `host:port`
    pub addr: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub retry: RetryPolicy,
}

impl fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("addr", &self.addr)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl MySqlSettings {
    pub fn new(
        addr: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            addr: addr.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }

    fn connect_options(&self) -> Result<MySqlConnectOptions, ConnectionError> {
        let (host, port) = split_host_port(&self.addr)?;
        Ok(MySqlConnectOptions::new()
            .host(host)
            .port(port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database))
    }
}

fn split_host_port(addr: &str) -> Result<(&str, u16), ConnectionError> {
    let invalid = || ConnectionError::InvalidAddress(addr.to_string());
    let addr_trimmed = addr.trim();
    if addr_trimmed.is_empty() {
        return Err(invalid());
    }

    match addr_trimmed.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port.parse::<u16>().map_err(|_| invalid())?;
            Ok((host, port))
        }
        Some(_) => Err(invalid()),
        None => Ok((addr_trimmed, DEFAULT_MYSQL_PORT)),
    }
}

/// Open a pool and confirm one connection answers a ping.
pub async fn connect_mysql(settings: &MySqlSettings) -> Result<MySqlPool, ConnectionError> {
    let options = settings.connect_options()?;

    retry_connection("mysql", settings.retry, || {
        let options = options.clone();
        async move {
            let pool = MySqlPoolOptions::new()
                .max_connections(settings.max_connections)
                .acquire_timeout(settings.acquire_timeout)
                .connect_with(options)
                .await?;
            let mut conn = pool.acquire().await?;
            conn.ping().await?;
            drop(conn);
            Ok::<_, ConnectionError>(pool)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_host_and_port() {
        assert_eq!(split_host_port("db.internal:3307").unwrap(), ("db.internal", 3307));
        assert_eq!(split_host_port("db.internal").unwrap(), ("db.internal", 3306));
    }

    #[test]
    fn rejects_bad_addresses() {
        for addr in ["", ":3306", "db:notaport", "db:70000"] {
            assert!(
                matches!(split_host_port(addr), Err(ConnectionError::InvalidAddress(_))),
                "{addr:?}"
            );
        }
    }

    #[test]
    fn debug_redacts_password() {
        let settings = MySqlSettings::new("db:3306", "svc", "hunter2", "accounts");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("accounts"));
    }
}
