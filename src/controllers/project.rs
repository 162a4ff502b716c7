use std::fmt::Display;

use regex::Regex;
use tracing::instrument;

use crate::core::client::Client;
use crate::core::error::{ConfigError, Error};
use crate::store::ApprovalStore;
use crate::types::request::ApprovalParams;
use crate::types::response::{self, Pagination, Stats};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Approve,
    Disapprove,
}

impl TryFrom<&str> for Action {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "approve" => Ok(Action::Approve),
            "disapprove" => Ok(Action::Disapprove),
            _ => Err(Error::InvalidAction),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Action::Approve => "approved",
                Action::Disapprove => "disapproved",
            }
        )
    }
}

#[derive(Clone)]
pub(crate) struct ProjectController {
    store: ApprovalStore,
    github: Client,
    repo_name_pattern: Regex,
}

impl std::fmt::Debug for ProjectController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectController")
            .field("store", &self.store)
            .field("github", &self.github)
            .field("repo_name_pattern", &self.repo_name_pattern.as_str())
            .finish()
    }
}

impl ProjectController {
    pub(crate) fn new(store: ApprovalStore, github: Client) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            github,
            repo_name_pattern: Regex::new(r"^[A-Za-z0-9._-]{1,100}$")?,
        })
    }

    pub(crate) fn store(&self) -> &ApprovalStore {
        &self.store
    }

    pub(crate) fn github(&self) -> &Client {
        &self.github
    }

    /// Every upstream repository with its approval state, for the admin table.
    #[instrument(skip_all)]
    pub(crate) async fn list_all(&self) -> Result<response::AdminProjects, Error> {
        let repos = self.github.get_repositories().await?;
        let approvals = self.store.load().await;

        let data: Vec<_> = repos
            .iter()
            .map(|repo| repo.to_admin_project(&approvals))
            .collect();
        let approved_count = data.iter().filter(|p| p.approved).count();

        Ok(response::AdminProjects {
            success: true,
            total_projects: data.len(),
            approved_count,
            data,
            approved_projects: approvals.records().to_vec(),
        })
    }

    /// Applies an approve/disapprove request and persists the result if it
    /// changed anything.
    #[instrument(skip_all, fields(action = ?params.action, repo_name = ?params.repo_name))]
    pub(crate) async fn update(&self, params: ApprovalParams) -> Result<response::Mutation, Error> {
        let action = params.action.as_deref().filter(|a| !a.is_empty());
        let repo_name = params.repo_name.as_deref().filter(|r| !r.is_empty());

        let (Some(action), Some(repo_name)) = (action, repo_name) else {
            return Err(Error::MissingField);
        };

        let action = Action::try_from(action)?;

        if !self.repo_name_pattern.is_match(repo_name) {
            return Err(Error::InvalidRepoName);
        }

        let mut approvals = self.store.load().await;

        let changed = match action {
            Action::Approve => approvals.approve(
                repo_name,
                params.description.as_deref(),
                params.demo_url.as_deref(),
            ),
            Action::Disapprove => approvals.disapprove(repo_name),
        };

        if !changed {
            return Ok(response::Mutation {
                success: true,
                message: format!("Project \"{repo_name}\" already in that state"),
                approved_projects: approvals.records().to_vec(),
            });
        }

        let saved = self.store.save(&approvals).await?;

        if saved {
            tracing::info!("Project {} {}", repo_name, action);
        } else {
            tracing::error!("Project {} {} but could not be saved", repo_name, action);
        }

        Ok(response::Mutation {
            success: saved,
            message: format!("Project \"{repo_name}\" {action} successfully"),
            approved_projects: approvals.records().to_vec(),
        })
    }

    /// The public project cards. Unapproved repositories are only included
    /// when an admin asks for them; admins also get the full counts.
    /// `limit` is applied after filtering.
    #[instrument(skip(self))]
    pub(crate) async fn list_public(
        &self,
        limit: usize,
        include_unapproved: bool,
        is_admin: bool,
    ) -> Result<response::ProjectList, Error> {
        let approvals = self.store.load().await;
        let repos = self.github.get_repositories().await?;

        let projects: Vec<_> = repos
            .iter()
            .map(|repo| repo.to_project(approvals.get(&repo.name), &self.github.username))
            .collect();

        let total = projects.len();
        let approved = projects.iter().filter(|p| p.approved).count();

        let data: Vec<_> = projects
            .into_iter()
            .filter(|p| (include_unapproved && is_admin) || p.approved)
            .take(limit)
            .collect();

        let stats = if is_admin {
            Stats::Admin {
                total_projects: total,
                approved_projects: approved,
                unapproved_projects: total - approved,
            }
        } else {
            Stats::Public {
                approved_projects: data.len(),
            }
        };

        Ok(response::ProjectList {
            success: true,
            pagination: Pagination::single_page(data.len(), limit),
            data,
            source: "GitHub API",
            username: self.github.username.clone(),
            stats,
        })
    }
}
