use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::LoginData;
use crate::types::response::Envelope;
use crate::utils::auth;

#[instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginData>, JsonRejection>,
) -> Result<(CookieJar, Json<Envelope>), Error> {
    if state.auth.password.is_empty() {
        return Err(Error::MissingPassword);
    }

    let Json(data) = payload.map_err(|_| Error::MalformedPayload)?;
    let password = data.password.unwrap_or_default();

    if password.is_empty() || !auth::check_password(&password, &state.auth.password) {
        return Err(Error::IncorrectPassword);
    }

    let token = auth::sign(&state.auth.secret, Utc::now().timestamp(), state.auth.ttl)?;

    tracing::info!("Admin session issued");

    Ok((
        jar.add(auth::session_cookie(token, &state.auth)),
        Json(Envelope::ok()),
    ))
}

pub(crate) async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<Envelope>) {
    (jar.add(auth::clear_cookie(&state.auth)), Json(Envelope::ok()))
}
