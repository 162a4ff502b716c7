use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::instrument;

use crate::core::error::{ConfigError, Error};
use crate::store::Backend;

/// Redis reached over its wire protocol. The connection is opened on first
/// use and then shared; `ConnectionManager` multiplexes concurrent requests.
#[derive(Clone)]
pub(crate) struct RedisBackend {
    client: redis::Client,
    connection: Arc<OnceCell<ConnectionManager>>,
    timeout: Duration,
    key: String,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("connected", &self.connection.initialized())
            .field("key", &self.key)
            .finish()
    }
}

impl RedisBackend {
    pub(crate) fn new(url: &str, key: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            connection: Arc::new(OnceCell::new()),
            timeout,
            key: key.to_owned(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, Error> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                tracing::info!("Connecting to Redis");

                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(1)
                    .set_connection_timeout(self.timeout)
                    .set_response_timeout(self.timeout);

                self.client.get_connection_manager_with_config(config).await
            })
            .await?;

        Ok(connection.clone())
    }
}

impl Backend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    #[instrument(skip_all)]
    async fn fetch(&self) -> Result<Option<Value>, Error> {
        let mut connection = self.connection().await?;
        let value: Option<String> = connection.get(&self.key).await?;

        Ok(value.map(Value::String))
    }

    #[instrument(skip_all)]
    async fn put(&self, value: &Value) -> Result<(), Error> {
        let mut connection = self.connection().await?;
        let _: () = connection.set(&self.key, value.to_string()).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // needs a live server, e.g. REDIS_URL=redis://127.0.0.1:6379
    #[tokio::test]
    async fn test_round_trip_against_live_server() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            return;
        };

        let backend =
            RedisBackend::new(&url, "showcase:test-approvals", Duration::from_secs(2)).unwrap();

        backend.put(&json!([{"repoName": "x"}])).await.unwrap();
        let stored = backend.fetch().await.unwrap().unwrap();

        assert_eq!(stored, Value::String(r#"[{"repoName":"x"}]"#.into()));
        assert!(backend.connection.initialized());
    }
}
