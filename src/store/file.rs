use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;
use tracing::instrument;

use crate::core::error::Error;
use crate::store::Backend;

/// Approvals as a pretty-printed JSON file. Good enough for local development;
/// production filesystems are usually ephemeral.
#[derive(Clone, Debug)]
pub(crate) struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<Option<Value>, Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(Value::String(raw))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::IO(e)),
        }
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn put(&self, value: &Value) -> Result<(), Error> {
        let raw = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&self.path, raw).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileBackend::new(dir.path().join("approved-projects.json"));

        assert!(file.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("approved-projects.json");
        let file = FileBackend::new(path.clone());

        file.put(&json!(["a"])).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n  \"a\"\n]");
        assert_eq!(
            file.fetch().await.unwrap(),
            Some(Value::String("[\n  \"a\"\n]".into()))
        );
    }

    #[tokio::test]
    async fn test_unwritable_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileBackend::new(dir.path().join("missing").join("approved-projects.json"));

        assert!(matches!(file.put(&json!([])).await, Err(Error::IO(_))));
    }
}
