use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct LoginData {
    #[serde(default)]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApprovalParams {
    #[serde(default)]
    pub(crate) action: Option<String>,
    #[serde(default)]
    pub(crate) repo_name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) demo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectQuery {
    pub(crate) limit: Option<String>,
    pub(crate) include_unapproved: Option<String>,
}
