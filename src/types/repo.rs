use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use crate::types::approval::{ApprovalRecord, ApprovalSet};
use crate::types::response::{AdminProject, Project};

const SCREENSHOT_SERVICE: &str = "https://v1.screenshot.11ty.dev";
const FALLBACK_IMAGE: &str = "/assets/projects/jhayfx.png";

/// The subset of GitHub's repository object we use.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Repository {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) full_name: String,
    pub(crate) description: Option<String>,
    pub(crate) language: Option<String>,
    #[serde(default)]
    pub(crate) private: bool,
    #[serde(default)]
    pub(crate) archived: bool,
    #[serde(default)]
    pub(crate) stargazers_count: u64,
    #[serde(default)]
    pub(crate) watchers_count: u64,
    #[serde(default)]
    pub(crate) forks_count: u64,
    pub(crate) html_url: String,
    pub(crate) homepage: Option<String>,
    #[serde(default)]
    pub(crate) topics: Vec<String>,
    pub(crate) created_at: Option<DateTime<Utc>>,
}

/// `my-cool-repo` -> `My Cool Repo`
pub(crate) fn display_name(repo_name: &str) -> String {
    repo_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A URL worth linking as a live demo: a web URL that isn't a GitHub page.
pub(crate) fn is_live_site(url: &str) -> bool {
    url.starts_with("http") && !url.contains("github.com")
}

pub(crate) fn pick_demo_url(custom: Option<&str>, homepage: Option<&str>) -> Option<String> {
    [custom, homepage]
        .into_iter()
        .flatten()
        .find(|url| is_live_site(url))
        .map(str::to_owned)
}

fn project_image(demo_url: Option<&str>, full_name: &str) -> String {
    match demo_url {
        Some(url) if is_live_site(url) => {
            format!("{SCREENSHOT_SERVICE}/{}/large/", encode_component(url))
        }
        _ if !full_name.is_empty() => format!("https://opengraph.githubassets.com/1/{full_name}"),
        _ => FALLBACK_IMAGE.to_owned(),
    }
}

// same escaping as JavaScript's encodeURIComponent
fn encode_component(input: &str) -> String {
    input
        .bytes()
        .map(|byte| match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => (byte as char).to_string(),
            _ => format!("%{byte:02X}"),
        })
        .collect()
}

impl Repository {
    fn fallback_description(&self, username: &str) -> Vec<String> {
        vec![
            self.description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("A project by {username}")),
            format!(
                "Built with modern technologies and best practices. Language: {}",
                self.language.as_deref().unwrap_or("Multi-language")
            ),
            format!(
                "Stars: {} | Watchers: {} | Forks: {}",
                self.stargazers_count, self.watchers_count, self.forks_count
            ),
        ]
    }

    /// Public card for this repository, with any approval overrides applied.
    pub(crate) fn to_project(&self, approval: Option<&ApprovalRecord>, username: &str) -> Project {
        let custom_description = approval
            .map(|a| a.description.as_str())
            .filter(|d| !d.is_empty());
        let demo = pick_demo_url(
            approval.map(|a| a.demo_url.as_str()),
            self.homepage.as_deref(),
        );

        Project {
            id: self.id,
            name: display_name(&self.name),
            repo_name: self.name.clone(),
            description: match custom_description {
                Some(description) => vec![description.to_owned()],
                None => self.fallback_description(username),
            },
            img: project_image(demo.as_deref(), &self.full_name),
            tech: vec![self.language.clone().unwrap_or_else(|| "JavaScript".into())],
            category: self
                .topics
                .first()
                .cloned()
                .unwrap_or_else(|| "Development".into()),
            source: self.html_url.clone(),
            demo,
            featured: self.stargazers_count > 5,
            year: self.created_at.map(|created| created.year()),
            source_type: "GitHub",
            approved: approval.is_some(),
        }
    }

    /// Row in the admin table: raw upstream data plus approval state.
    pub(crate) fn to_admin_project(&self, approvals: &ApprovalSet) -> AdminProject {
        let approval = approvals.get(&self.name);

        AdminProject {
            id: self.id,
            name: display_name(&self.name),
            repo_name: self.name.clone(),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| "No description".into()),
            language: self
                .language
                .clone()
                .unwrap_or_else(|| "No language specified".into()),
            private: self.private,
            stars: self.stargazers_count,
            url: self.html_url.clone(),
            homepage: self.homepage.clone().unwrap_or_default(),
            approved: approval.is_some(),
            custom_description: approval.map(|a| a.description.clone()),
            custom_demo_url: approval.map(|a| a.demo_url.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn repo_json(name: &str) -> serde_json::Value {
        json!({
            "id": 42,
            "name": name,
            "full_name": format!("octocat/{name}"),
            "description": "Upstream description",
            "language": "Rust",
            "private": false,
            "archived": false,
            "stargazers_count": 7,
            "watchers_count": 3,
            "forks_count": 1,
            "html_url": format!("https://github.com/octocat/{name}"),
            "homepage": "",
            "topics": ["cli", "tools"],
            "created_at": "2021-04-05T10:00:00Z"
        })
    }

    fn repo(name: &str) -> Repository {
        serde_json::from_value(repo_json(name)).unwrap()
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("my-cool-repo"), "My Cool Repo");
        assert_eq!(display_name("solo"), "Solo");
        assert_eq!(display_name("double--dash"), "Double  Dash");
    }

    #[test]
    fn test_demo_url_selection() {
        assert_eq!(
            pick_demo_url(Some("https://me.dev"), Some("https://other.dev")),
            Some("https://me.dev".into())
        );
        assert_eq!(
            pick_demo_url(Some("https://github.com/me/x"), Some("https://x.dev")),
            Some("https://x.dev".into())
        );
        assert_eq!(pick_demo_url(Some(""), Some("ftp://x")), None);
        assert_eq!(pick_demo_url(None, None), None);
    }

    #[test]
    fn test_project_without_overrides() {
        let project = repo("site-builder").to_project(None, "octocat");

        assert_eq!(project.name, "Site Builder");
        assert_eq!(project.description.len(), 3);
        assert_eq!(project.description[0], "Upstream description");
        assert_eq!(project.description[2], "Stars: 7 | Watchers: 3 | Forks: 1");
        assert_eq!(project.demo, None);
        assert_eq!(project.img, "https://opengraph.githubassets.com/1/octocat/site-builder");
        assert_eq!(project.tech, vec!["Rust".to_string()]);
        assert_eq!(project.category, "cli");
        assert!(project.featured);
        assert_eq!(project.year, Some(2021));
        assert!(!project.approved);
    }

    #[test]
    fn test_project_with_overrides() {
        let approval = ApprovalRecord {
            repo_name: "SITE-BUILDER".into(),
            description: "Hand written".into(),
            demo_url: "https://site.dev/a b".into(),
        };

        let project = repo("site-builder").to_project(Some(&approval), "octocat");

        assert_eq!(project.description, vec!["Hand written".to_string()]);
        assert_eq!(project.demo.as_deref(), Some("https://site.dev/a b"));
        assert_eq!(
            project.img,
            "https://v1.screenshot.11ty.dev/https%3A%2F%2Fsite.dev%2Fa%20b/large/"
        );
        assert!(project.approved);
    }

    #[test]
    fn test_sparse_repository() {
        let repo: Repository = serde_json::from_value(json!({
            "id": 1,
            "name": "bare",
            "description": null,
            "language": null,
            "html_url": "https://github.com/octocat/bare",
            "homepage": null,
            "created_at": null
        }))
        .unwrap();

        let project = repo.to_project(None, "octocat");
        assert_eq!(project.description[0], "A project by octocat");
        assert_eq!(project.tech, vec!["JavaScript".to_string()]);
        assert_eq!(project.category, "Development");
        assert_eq!(project.img, FALLBACK_IMAGE);
        assert_eq!(project.year, None);

        let admin = repo.to_admin_project(&ApprovalSet::new());
        assert_eq!(admin.description, "No description");
        assert_eq!(admin.language, "No language specified");
        assert_eq!(admin.custom_description, None);
    }
}
