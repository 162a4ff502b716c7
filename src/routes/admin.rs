use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::ApprovalParams;
use crate::types::response;

#[instrument(skip_all)]
pub(crate) async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<response::AdminProjects>, Error> {
    Ok(Json(state.project_controller.list_all().await?))
}

#[instrument(skip_all)]
pub(crate) async fn update_project(
    State(state): State<AppState>,
    payload: Result<Json<ApprovalParams>, JsonRejection>,
) -> Result<Json<response::Mutation>, Error> {
    let Json(params) = payload.map_err(|_| Error::MalformedPayload)?;

    Ok(Json(state.project_controller.update(params).await?))
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<response::Health> {
    Json(state.health())
}
