use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::ConfigError;

pub(crate) const DEFAULT_SESSION_TTL: i64 = 60 * 60 * 24 * 7;
pub(crate) const DEFAULT_APPROVALS_KEY: &str = "portfolio:approved-projects";
pub(crate) const DEFAULT_GITHUB_USERNAME: &str = "Jhay-web52";

#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct Args {
    pub(crate) port: u16,
    pub(crate) log_level: String,
    pub(crate) app_env: Option<String>,
    pub(crate) node_env: Option<String>,
    pub(crate) vercel: Option<String>,

    pub(crate) admin_password: Option<String>,
    pub(crate) admin_session_secret: Option<String>,
    pub(crate) session_ttl_seconds: i64,

    pub(crate) approvals_file: String,
    pub(crate) approvals_key: String,
    pub(crate) upstream_timeout_seconds: u64,

    pub(crate) redis_url: Option<String>,
    pub(crate) upstash_redis_url: Option<String>,
    pub(crate) kv_rest_api_url: Option<String>,
    pub(crate) kv_rest_api_token: Option<String>,
    pub(crate) kv_rest_api_read_only_token: Option<String>,
    pub(crate) upstash_redis_rest_url: Option<String>,
    pub(crate) upstash_redis_rest_token: Option<String>,
    pub(crate) upstash_redis_token: Option<String>,
    pub(crate) redis_rest_url: Option<String>,
    pub(crate) redis_rest_token: Option<String>,
    pub(crate) redis_token: Option<String>,

    pub(crate) github_token: Option<String>,
    pub(crate) github_username: Option<String>,
    pub(crate) next_public_github_username: Option<String>,
    pub(crate) github_api_url: String,
}

impl Args {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("session_ttl_seconds", DEFAULT_SESSION_TTL)?
            .set_default("approvals_file", "approved-projects.json")?
            .set_default("approvals_key", DEFAULT_APPROVALS_KEY)?
            .set_default("upstream_timeout_seconds", 10)?
            .set_default("github_api_url", "https://api.github.com")?
            .add_source(config::File::with_name("showcase").required(false))
            .add_source(config::Environment::default())
            .build()?;

        Ok(config.try_deserialize::<Args>()?)
    }

    pub(crate) fn is_production(&self) -> bool {
        [&self.app_env, &self.node_env]
            .into_iter()
            .any(|env| present(env).is_some_and(|env| env.eq_ignore_ascii_case("production")))
    }

    pub(crate) fn store_config(&self) -> StoreConfig {
        let rest_url = first_present(&[
            &self.kv_rest_api_url,
            &self.upstash_redis_rest_url,
            &self.redis_rest_url,
        ]);

        let rest_token = first_present(&[
            &self.kv_rest_api_token,
            &self.upstash_redis_rest_token,
            &self.upstash_redis_token,
            &self.redis_rest_token,
            &self.redis_token,
        ]);

        let rest_read_token =
            first_present(&[&self.kv_rest_api_read_only_token]).or_else(|| rest_token.clone());

        let provider = if present(&self.kv_rest_api_url).is_some() {
            "vercel-kv"
        } else if present(&self.upstash_redis_rest_url).is_some()
            || present(&self.upstash_redis_url).is_some()
        {
            "upstash"
        } else if present(&self.redis_url).is_some() {
            "redis-url"
        } else if present(&self.redis_rest_url).is_some() {
            "redis-rest"
        } else {
            "none"
        };

        StoreConfig {
            redis_url: first_present(&[&self.redis_url]),
            rest_url,
            rest_token,
            rest_read_token,
            file_path: PathBuf::from(&self.approvals_file),
            key: self.approvals_key.clone(),
            production: self.is_production(),
            timeout: Duration::from_secs(self.upstream_timeout_seconds),
            provider,
        }
    }

    pub(crate) fn auth_config(&self) -> AuthConfig {
        let password = present(&self.admin_password).unwrap_or_default().to_owned();
        let secret = present(&self.admin_session_secret)
            .map(str::to_owned)
            .unwrap_or_else(|| password.clone());

        AuthConfig {
            password,
            secret,
            ttl: self.session_ttl_seconds,
            secure_cookie: self.is_production(),
        }
    }

    pub(crate) fn github_config(&self) -> GithubConfig {
        GithubConfig {
            api_url: self.github_api_url.trim_end_matches('/').to_owned(),
            token: first_present(&[&self.github_token]),
            username: first_present(&[&self.github_username, &self.next_public_github_username])
                .unwrap_or_else(|| DEFAULT_GITHUB_USERNAME.to_owned()),
            timeout: Duration::from_secs(self.upstream_timeout_seconds),
        }
    }
}

/// Where approvals live. Resolved once from [`Args`] and handed to the store.
#[derive(Debug, Clone)]
pub(crate) struct StoreConfig {
    pub(crate) redis_url: Option<String>,
    pub(crate) rest_url: Option<String>,
    /// Read-write token for the REST service.
    pub(crate) rest_token: Option<String>,
    pub(crate) rest_read_token: Option<String>,
    pub(crate) file_path: PathBuf,
    pub(crate) key: String,
    pub(crate) production: bool,
    pub(crate) timeout: Duration,
    pub(crate) provider: &'static str,
}

impl StoreConfig {
    /// Local development setup: file only.
    pub(crate) fn file_only(file_path: impl Into<PathBuf>) -> Self {
        Self {
            redis_url: None,
            rest_url: None,
            rest_token: None,
            rest_read_token: None,
            file_path: file_path.into(),
            key: DEFAULT_APPROVALS_KEY.to_owned(),
            production: false,
            timeout: Duration::from_secs(10),
            provider: "none",
        }
    }

    pub(crate) fn can_read_rest(&self) -> bool {
        self.rest_url.is_some() && self.rest_read_token.is_some()
    }

    pub(crate) fn can_write_rest(&self) -> bool {
        self.rest_url.is_some() && self.rest_token.is_some()
    }
}

#[derive(Clone)]
pub(crate) struct AuthConfig {
    pub(crate) password: String,
    /// HMAC key for session tokens. Falls back to the admin password, so
    /// changing the password invalidates every outstanding session.
    pub(crate) secret: String,
    pub(crate) ttl: i64,
    pub(crate) secure_cookie: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("has_password", &!self.password.is_empty())
            .field("has_secret", &!self.secret.is_empty())
            .field("ttl", &self.ttl)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GithubConfig {
    pub(crate) api_url: String,
    pub(crate) token: Option<String>,
    pub(crate) username: String,
    pub(crate) timeout: Duration,
}

pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn first_present(values: &[&Option<String>]) -> Option<String> {
    values.iter().find_map(|v| present(v)).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 3000,
            log_level: "info".into(),
            session_ttl_seconds: DEFAULT_SESSION_TTL,
            approvals_file: "approved-projects.json".into(),
            approvals_key: DEFAULT_APPROVALS_KEY.into(),
            upstream_timeout_seconds: 10,
            github_api_url: "https://api.github.com/".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_upstash_aliases_normalize_to_rest_pair() {
        let mut args = args();
        args.upstash_redis_rest_url = Some("https://eu1.upstash.io".into());
        args.upstash_redis_rest_token = Some("rw".into());

        let store = args.store_config();
        assert_eq!(store.rest_url.as_deref(), Some("https://eu1.upstash.io"));
        assert_eq!(store.rest_token.as_deref(), Some("rw"));
        assert_eq!(store.rest_read_token.as_deref(), Some("rw"));
        assert_eq!(store.provider, "upstash");
        assert!(store.can_read_rest());
        assert!(store.can_write_rest());
    }

    #[test]
    fn test_kv_names_take_precedence() {
        let mut args = args();
        args.kv_rest_api_url = Some("https://kv.example".into());
        args.upstash_redis_rest_url = Some("https://upstash.example".into());
        args.kv_rest_api_read_only_token = Some("ro".into());

        let store = args.store_config();
        assert_eq!(store.rest_url.as_deref(), Some("https://kv.example"));
        assert_eq!(store.rest_read_token.as_deref(), Some("ro"));
        assert!(store.rest_token.is_none());
        assert!(store.can_read_rest());
        assert!(!store.can_write_rest());
        assert_eq!(store.provider, "vercel-kv");
    }

    #[test]
    fn test_blank_values_are_absent() {
        let mut args = args();
        args.redis_url = Some("  ".into());
        args.kv_rest_api_url = Some(String::new());

        let store = args.store_config();
        assert!(store.redis_url.is_none());
        assert!(store.rest_url.is_none());
        assert_eq!(store.provider, "none");
    }

    #[test]
    fn test_session_secret_falls_back_to_password() {
        let mut args = args();
        args.admin_password = Some("hunter2".into());
        assert_eq!(args.auth_config().secret, "hunter2");

        args.admin_session_secret = Some("dedicated".into());
        assert_eq!(args.auth_config().secret, "dedicated");
        assert_eq!(args.auth_config().password, "hunter2");
    }

    #[test]
    fn test_production_flag() {
        let mut args = args();
        assert!(!args.is_production());

        args.node_env = Some("production".into());
        assert!(args.is_production());
        assert!(args.store_config().production);
        assert!(args.auth_config().secure_cookie);
    }

    #[test]
    fn test_github_config() {
        let mut args = args();
        let github = args.github_config();
        assert_eq!(github.api_url, "https://api.github.com");
        assert_eq!(github.username, DEFAULT_GITHUB_USERNAME);

        args.next_public_github_username = Some("octocat".into());
        assert_eq!(args.github_config().username, "octocat");
    }
}
