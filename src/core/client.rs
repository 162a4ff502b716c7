use serde::Deserialize;
use tracing::instrument;

use crate::core::config::GithubConfig;
use crate::core::error::{ConfigError, Error};
use crate::types::repo::Repository;

#[derive(Clone)]
pub(crate) struct Client {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    pub(crate) username: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl Client {
    pub(crate) fn new(config: &GithubConfig) -> Result<Self, ConfigError> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
            token: config.token.clone(),
            username: config.username.clone(),
        })
    }

    pub(crate) fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Non-archived repositories owned by the configured account, most
    /// recently updated first. With a token, private repositories are
    /// included as well.
    #[instrument(skip_all)]
    pub(crate) async fn get_repositories(&self) -> Result<Vec<Repository>, Error> {
        let request = match &self.token {
            Some(token) => self
                .client
                .get(format!("{}/user/repos", self.url))
                .query(&[("sort", "updated"), ("per_page", "100"), ("affiliation", "owner")])
                .header("Authorization", format!("token {token}")),
            None => self
                .client
                .get(format!("{}/users/{}/repos", self.url, self.username))
                .query(&[("type", "owner"), ("sort", "updated"), ("per_page", "100")]),
        };

        let response = request
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| {
                    format!(
                        "GitHub API error: {}",
                        status.canonical_reason().unwrap_or(status.as_str())
                    )
                });

            return Err(Error::Upstream(message));
        }

        let repos: Vec<Repository> = response.json().await?;
        tracing::debug!("Fetched {} repositories", repos.len());

        Ok(repos.into_iter().filter(|repo| !repo.archived).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::types::repo::tests::repo_json;
    use crate::utils::testing;

    /// GitHub stand-in: `octocat` owns `alpha`, `beta` and an archived `old`;
    /// the token `gh-token` additionally sees `secret`.
    pub(crate) fn mock_github() -> Router {
        Router::new()
            .route(
                "/users/{username}/repos",
                get(|Path(username): Path<String>| async move {
                    if username != "octocat" {
                        return (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"})));
                    }

                    let mut archived = repo_json("old");
                    archived["archived"] = json!(true);

                    (
                        StatusCode::OK,
                        Json(json!([repo_json("alpha"), repo_json("beta"), archived])),
                    )
                }),
            )
            .route(
                "/user/repos",
                get(|headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("token gh-token") => (
                            StatusCode::OK,
                            Json(json!([repo_json("alpha"), repo_json("secret")])),
                        ),
                        _ => (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "Bad credentials"})),
                        ),
                    }
                }),
            )
            .route(
                "/users/broken/repos",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>") }),
            )
    }

    pub(crate) fn github_config(url: &str, username: &str, token: Option<&str>) -> GithubConfig {
        GithubConfig {
            api_url: url.to_owned(),
            token: token.map(str::to_owned),
            username: username.to_owned(),
            timeout: Duration::from_secs(5),
        }
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_public_listing_skips_archived() {
        let url = testing::serve(mock_github()).await;
        let client = Client::new(&github_config(&url, "octocat", None)).unwrap();

        let repos = client.get_repositories().await.unwrap();
        assert_eq!(names(&repos), vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_token_uses_authenticated_endpoint() {
        let url = testing::serve(mock_github()).await;
        let client = Client::new(&github_config(&url, "octocat", Some("gh-token"))).unwrap();

        let repos = client.get_repositories().await.unwrap();
        assert_eq!(names(&repos), vec!["alpha", "secret"]);
    }

    #[tokio::test]
    async fn test_upstream_message_is_propagated() {
        let url = testing::serve(mock_github()).await;

        let client = Client::new(&github_config(&url, "octocat", Some("wrong"))).unwrap();
        match client.get_repositories().await {
            Err(Error::Upstream(message)) => assert_eq!(message, "Bad credentials"),
            other => panic!("unexpected {other:?}"),
        }

        let client = Client::new(&github_config(&url, "broken", None)).unwrap();
        match client.get_repositories().await {
            Err(Error::Upstream(message)) => {
                assert_eq!(message, "GitHub API error: Service Unavailable")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let client =
            Client::new(&github_config("http://localhost", "octocat", Some("gh-token"))).unwrap();

        assert!(!format!("{client:?}").contains("gh-token"));
        assert!(client.has_token());
    }
}
