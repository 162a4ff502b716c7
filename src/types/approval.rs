use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One approved repository and its display overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApprovalRecord {
    pub(crate) repo_name: String,
    pub(crate) description: String,
    pub(crate) demo_url: String,
}

impl ApprovalRecord {
    pub(crate) fn new(repo_name: &str) -> Self {
        Self {
            repo_name: repo_name.to_owned(),
            ..Default::default()
        }
    }

    pub(crate) fn matches(&self, repo_name: &str) -> bool {
        self.repo_name.to_lowercase() == repo_name.to_lowercase()
    }
}

/// Every shape a stored entry has had over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Legacy(String),
    #[serde(rename_all = "camelCase")]
    Full {
        repo_name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        demo_url: Option<String>,
    },
}

impl From<StoredRecord> for ApprovalRecord {
    fn from(stored: StoredRecord) -> Self {
        match stored {
            StoredRecord::Legacy(repo_name) => ApprovalRecord::new(&repo_name),
            StoredRecord::Full {
                repo_name,
                description,
                demo_url,
            } => ApprovalRecord {
                repo_name,
                description: description.unwrap_or_default(),
                demo_url: demo_url.unwrap_or_default(),
            },
        }
    }
}

/// The whole collection of approvals, keyed case-insensitively by repo name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct ApprovalSet(Vec<ApprovalRecord>);

impl ApprovalSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Normalizes a stored value into records.
    ///
    /// Accepts an array or a string holding a JSON array, so values written by
    /// older clients (which stored the list pre-serialized) still load. Anything
    /// else yields an empty set. Entries that are neither a repo name nor a
    /// record are skipped.
    pub(crate) fn decode(value: Value) -> Self {
        let items = match value {
            Value::Array(items) => items,
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(items)) => items,
                Ok(_) => {
                    tracing::warn!("Stored approvals are not a list, ignoring");
                    return Self::new();
                }
                Err(e) => {
                    tracing::warn!("Stored approvals are not valid JSON: {}", e);
                    return Self::new();
                }
            },
            Value::Null => return Self::new(),
            _ => {
                tracing::warn!("Stored approvals are not a list, ignoring");
                return Self::new();
            }
        };

        let mut set = Self::new();

        for item in items {
            match serde_json::from_value::<StoredRecord>(item) {
                Ok(stored) => set.absorb(stored.into()),
                Err(e) => tracing::warn!("Skipping malformed approval entry: {}", e),
            }
        }

        set
    }

    // duplicates collapse into the first entry, unless a later one carries a description
    fn absorb(&mut self, record: ApprovalRecord) {
        if record.repo_name.trim().is_empty() {
            return;
        }

        match self.0.iter_mut().find(|r| r.matches(&record.repo_name)) {
            Some(existing) if existing.description.is_empty() && !record.description.is_empty() => {
                *existing = record;
            }
            Some(_) => {}
            None => self.0.push(record),
        }
    }

    pub(crate) fn get(&self, repo_name: &str) -> Option<&ApprovalRecord> {
        self.0.iter().find(|r| r.matches(repo_name))
    }

    pub(crate) fn contains(&self, repo_name: &str) -> bool {
        self.get(repo_name).is_some()
    }

    pub(crate) fn records(&self) -> &[ApprovalRecord] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts or partially updates the record for `repo_name`. Fields passed
    /// as `None` are left alone. Returns whether anything changed.
    pub(crate) fn approve(
        &mut self,
        repo_name: &str,
        description: Option<&str>,
        demo_url: Option<&str>,
    ) -> bool {
        match self.0.iter_mut().find(|r| r.matches(repo_name)) {
            Some(existing) => {
                let mut changed = false;

                if let Some(description) = description {
                    if existing.description != description {
                        existing.description = description.to_owned();
                        changed = true;
                    }
                }

                if let Some(demo_url) = demo_url {
                    if existing.demo_url != demo_url {
                        existing.demo_url = demo_url.to_owned();
                        changed = true;
                    }
                }

                changed
            }
            None => {
                self.0.push(ApprovalRecord {
                    repo_name: repo_name.to_owned(),
                    description: description.unwrap_or_default().to_owned(),
                    demo_url: demo_url.unwrap_or_default().to_owned(),
                });
                true
            }
        }
    }

    /// Removes every record matching `repo_name`. Returns whether any matched.
    pub(crate) fn disapprove(&mut self, repo_name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|r| !r.matches(repo_name));
        self.0.len() != before
    }
}

impl From<Vec<ApprovalRecord>> for ApprovalSet {
    fn from(records: Vec<ApprovalRecord>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.absorb(record);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(repo_name: &str, description: &str, demo_url: &str) -> ApprovalRecord {
        ApprovalRecord {
            repo_name: repo_name.into(),
            description: description.into(),
            demo_url: demo_url.into(),
        }
    }

    #[test]
    fn test_legacy_names_normalize_to_records() {
        let mut set = ApprovalSet::decode(json!(["repo-a", "repo-b"]));

        assert_eq!(
            set.records(),
            &[record("repo-a", "", ""), record("repo-b", "", "")]
        );

        assert!(set.approve("repo-a", Some("new desc"), None));
        assert_eq!(
            set.records(),
            &[record("repo-a", "new desc", ""), record("repo-b", "", "")]
        );
    }

    #[test]
    fn test_decode_string_encoded_list() {
        let raw = r#"[{"repoName":"x","description":"d","demoUrl":null}]"#;
        let set = ApprovalSet::decode(Value::String(raw.into()));

        assert_eq!(set.records(), &[record("x", "d", "")]);
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(ApprovalSet::decode(json!({"repoName": "x"})).is_empty());
        assert!(ApprovalSet::decode(Value::String("not json".into())).is_empty());
        assert!(ApprovalSet::decode(Value::String("42".into())).is_empty());
        assert!(ApprovalSet::decode(Value::Null).is_empty());
    }

    #[test]
    fn test_decode_skips_bad_entries() {
        let set = ApprovalSet::decode(json!(["ok", 7, {"description": "no name"}, ""]));

        assert_eq!(set.records(), &[record("ok", "", "")]);
    }

    #[test]
    fn test_decode_collapses_duplicates() {
        let set = ApprovalSet::decode(json!([
            "MyRepo",
            {"repoName": "myrepo", "description": "with text", "demoUrl": ""},
            {"repoName": "MYREPO", "description": "ignored", "demoUrl": ""}
        ]));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("myRepo").unwrap().description, "with text");
    }

    #[test]
    fn test_approve_twice_is_case_insensitive() {
        let mut set = ApprovalSet::new();

        assert!(set.approve("MyRepo", Some("first"), None));
        assert!(set.approve("myrepo", Some("second"), None));

        assert_eq!(set.records(), &[record("MyRepo", "second", "")]);
    }

    #[test]
    fn test_approve_partial_update() {
        let mut set = ApprovalSet::from(vec![record("site", "desc", "https://a.dev")]);

        assert!(set.approve("site", None, Some("https://b.dev")));
        assert_eq!(set.records(), &[record("site", "desc", "https://b.dev")]);

        assert!(!set.approve("site", None, None));
        assert!(!set.approve("SITE", Some("desc"), Some("https://b.dev")));
    }

    #[test]
    fn test_approve_then_disapprove_round_trip() {
        let mut set = ApprovalSet::new();

        assert!(set.approve("repo", Some("d"), Some("https://x.dev")));
        assert!(set.disapprove("REPO"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_disapprove_missing_is_noop() {
        let mut set = ApprovalSet::from(vec![record("a", "", "")]);
        let before = set.clone();

        assert!(!set.disapprove("nonexistent"));
        assert_eq!(set, before);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set = ApprovalSet::from(vec![record("x", "d", "")]);

        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!([{"repoName": "x", "description": "d", "demoUrl": ""}])
        );
    }
}
