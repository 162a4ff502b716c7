use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::core::config::StoreConfig;
use crate::core::error::{ConfigError, Error};
use crate::store::Backend;

/// Key-value service reached over HTTPS, speaking the Upstash REST protocol:
/// each command is a JSON array POSTed to the base URL with a bearer token.
#[derive(Clone)]
pub(crate) struct RestBackend {
    client: reqwest::Client,
    url: String,
    read_token: Option<String>,
    write_token: Option<String>,
    key: String,
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("url", &self.url)
            .field("can_read", &self.read_token.is_some())
            .field("can_write", &self.write_token.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestBackend {
    /// `None` unless both a URL and at least one token are configured.
    pub(crate) fn new(config: &StoreConfig) -> Result<Option<Self>, ConfigError> {
        let Some(url) = &config.rest_url else {
            return Ok(None);
        };

        if !config.can_read_rest() && !config.can_write_rest() {
            return Ok(None);
        }

        let client = reqwest::ClientBuilder::new()
            .timeout(config.timeout)
            .build()?;

        Ok(Some(Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            read_token: config.rest_read_token.clone(),
            write_token: config.rest_token.clone(),
            key: config.key.clone(),
        }))
    }

    pub(crate) fn can_write(&self) -> bool {
        self.write_token.is_some()
    }

    /// Failures of the service itself, transport included, are `KeyValue`
    /// errors so they are never mistaken for upstream (GitHub) failures.
    async fn command(&self, token: &str, command: Value) -> Result<Value, Error> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&command)
            .send()
            .await
            .map_err(|e| Error::KeyValue(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::KeyValue(e.to_string()))?;
        let reply = serde_json::from_str::<Reply>(&body);

        if !status.is_success() {
            let message = reply
                .ok()
                .and_then(|reply| reply.error)
                .unwrap_or_else(|| format!("unexpected status {status}"));

            return Err(Error::KeyValue(message));
        }

        let reply = reply.map_err(|e| Error::KeyValue(format!("malformed reply: {e}")))?;

        if let Some(error) = reply.error {
            return Err(Error::KeyValue(error));
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }
}

impl Backend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    #[instrument(skip_all)]
    async fn fetch(&self) -> Result<Option<Value>, Error> {
        let token = self
            .read_token
            .as_deref()
            .or(self.write_token.as_deref())
            .ok_or_else(|| Error::KeyValue("no read token".into()))?;

        match self.command(token, json!(["GET", self.key])).await? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    #[instrument(skip_all)]
    async fn put(&self, value: &Value) -> Result<(), Error> {
        let token = self.write_token.as_deref().ok_or(Error::ReadOnlyStore)?;

        self.command(token, json!(["SET", self.key, value.to_string()]))
            .await?;

        Ok(())
    }
}
