use serde::Serialize;

use crate::types::approval::ApprovalRecord;

/// Shape shared by every reply: `success` plus an `error` message on failure.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope {
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl Envelope {
    pub(crate) fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub(crate) fn failure(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminProject {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) repo_name: String,
    pub(crate) description: String,
    pub(crate) language: String,
    pub(crate) private: bool,
    pub(crate) stars: u64,
    pub(crate) url: String,
    pub(crate) homepage: String,
    pub(crate) approved: bool,
    pub(crate) custom_description: Option<String>,
    pub(crate) custom_demo_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminProjects {
    pub(crate) success: bool,
    pub(crate) data: Vec<AdminProject>,
    pub(crate) approved_projects: Vec<ApprovalRecord>,
    pub(crate) total_projects: usize,
    pub(crate) approved_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Mutation {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) approved_projects: Vec<ApprovalRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Project {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) repo_name: String,
    pub(crate) description: Vec<String>,
    pub(crate) img: String,
    pub(crate) tech: Vec<String>,
    pub(crate) category: String,
    pub(crate) source: String,
    pub(crate) demo: Option<String>,
    pub(crate) featured: bool,
    pub(crate) year: Option<i32>,
    #[serde(rename = "source_type")]
    pub(crate) source_type: &'static str,
    pub(crate) approved: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    pub(crate) current_page: u32,
    pub(crate) total_pages: u32,
    pub(crate) total_items: usize,
    pub(crate) items_per_page: usize,
    pub(crate) has_next_page: bool,
    pub(crate) has_previous_page: bool,
}

impl Pagination {
    pub(crate) fn single_page(total_items: usize, items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items,
            items_per_page,
            has_next_page: false,
            has_previous_page: false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub(crate) enum Stats {
    Admin {
        total_projects: usize,
        approved_projects: usize,
        unapproved_projects: usize,
    },
    Public {
        approved_projects: usize,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectList {
    pub(crate) success: bool,
    pub(crate) data: Vec<Project>,
    pub(crate) pagination: Pagination,
    pub(crate) source: &'static str,
    pub(crate) username: String,
    pub(crate) stats: Stats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Health {
    pub(crate) success: bool,
    pub(crate) env: HealthEnv,
    pub(crate) github: HealthGithub,
    pub(crate) kv: HealthStore,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthEnv {
    pub(crate) production: bool,
    pub(crate) vercel: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthGithub {
    pub(crate) has_token: bool,
    pub(crate) username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthStore {
    pub(crate) has_url: bool,
    pub(crate) has_redis_url: bool,
    pub(crate) can_read: bool,
    pub(crate) can_write: bool,
    pub(crate) provider: &'static str,
    pub(crate) load_backend: &'static str,
    pub(crate) save_backend: &'static str,
}
