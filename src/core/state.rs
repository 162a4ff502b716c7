use crate::controllers::project::ProjectController;
use crate::core::client::Client;
use crate::core::config::{Args, AuthConfig, GithubConfig, StoreConfig};
use crate::core::error::ConfigError;
use crate::store::{Access, ApprovalStore};
use crate::types::response;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) auth: AuthConfig,
    pub(crate) project_controller: ProjectController,
    store_config: StoreConfig,
    vercel: bool,
}

impl AppState {
    pub(crate) fn new(
        auth: AuthConfig,
        store_config: StoreConfig,
        github_config: &GithubConfig,
        vercel: bool,
    ) -> Result<Self, ConfigError> {
        let store = ApprovalStore::new(&store_config)?;
        let client = Client::new(github_config)?;

        Ok(AppState {
            auth,
            project_controller: ProjectController::new(store, client)?,
            store_config,
            vercel,
        })
    }

    pub(crate) fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Self::new(
            args.auth_config(),
            args.store_config(),
            &args.github_config(),
            crate::core::config::present(&args.vercel).is_some(),
        )
    }

    /// Which configuration is present and which backend would be used. Never
    /// includes the values themselves.
    pub(crate) fn health(&self) -> response::Health {
        let config = &self.store_config;
        let store = self.project_controller.store();
        let github = self.project_controller.github();

        response::Health {
            success: true,
            env: response::HealthEnv {
                production: config.production,
                vercel: self.vercel,
            },
            github: response::HealthGithub {
                has_token: github.has_token(),
                username: github.username.clone(),
            },
            kv: response::HealthStore {
                has_url: config.rest_url.is_some(),
                has_redis_url: config.redis_url.is_some(),
                can_read: config.can_read_rest(),
                can_write: config.can_write_rest(),
                provider: config.provider,
                load_backend: store.selected(Access::Read),
                save_backend: store.selected(Access::Write),
            },
        }
    }
}
