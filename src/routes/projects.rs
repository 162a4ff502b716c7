use axum::Json;
use axum::extract::{Query, State};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::ProjectQuery;
use crate::types::response;
use crate::utils::auth;

const DEFAULT_LIMIT: usize = 1000;

/// `GET /api/projects?limit=&includeUnapproved=`
///
/// `limit` caps the number of cards returned and counts only projects that
/// pass the approval filter, so `limit=6` yields up to six visible projects
/// even when unapproved repositories are more recent. Missing or invalid
/// values mean 1000.
#[instrument(skip(state, jar))]
pub(crate) async fn get(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<response::ProjectList>, Error> {
    let limit = query
        .limit
        .as_deref()
        .and_then(|limit| limit.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT);

    let is_admin = auth::is_authorized(&jar, &state.auth.secret, Utc::now().timestamp());
    let include_unapproved = query.include_unapproved.as_deref() == Some("true");

    let projects = state
        .project_controller
        .list_public(limit, include_unapproved, is_admin)
        .await?;

    Ok(Json(projects))
}
