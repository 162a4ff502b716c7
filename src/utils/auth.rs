use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::core::config::AuthConfig;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::utils::encode;

type HmacSha256 = Hmac<Sha256>;

pub(crate) const COOKIE_NAME: &str = "admin_session";
const SEPARATOR: char = '.';

#[derive(Deserialize, Serialize, Debug)]
pub(crate) struct Claims {
    #[serde(default)]
    pub(crate) iat: Option<i64>,
    pub(crate) exp: i64,
}

fn mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

/// Issues a session token `payload.signature`, valid for `ttl` seconds from `now`.
pub(crate) fn sign(secret: &str, now: i64, ttl: i64) -> Result<String, Error> {
    if secret.is_empty() {
        return Err(Error::MissingSecret);
    }

    let exp = now.checked_add(ttl).ok_or(Error::InvalidSessionTtl)?;

    let claims = Claims {
        iat: Some(now),
        exp,
    };

    let payload = encode::encode(serde_json::to_vec(&claims)?);

    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    let signature = encode::encode(mac.finalize().into_bytes());

    Ok(format!("{payload}{SEPARATOR}{signature}"))
}

/// Checks the signature in constant time, then the expiry.
pub(crate) fn verify(token: &str, secret: &str, now: i64) -> bool {
    if secret.is_empty() {
        return false;
    }

    let mut parts = token.split(SEPARATOR);
    let (Some(payload), Some(signature), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if payload.is_empty() || signature.is_empty() {
        return false;
    }

    let Some(signature) = encode::decode(signature) else {
        return false;
    };

    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        return false;
    }

    let Some(claims) = encode::decode(payload)
        .and_then(|raw| serde_json::from_slice::<Claims>(&raw).ok())
    else {
        return false;
    };

    now < claims.exp
}

pub(crate) fn is_authorized(jar: &CookieJar, secret: &str, now: i64) -> bool {
    jar.get(COOKIE_NAME)
        .is_some_and(|cookie| verify(cookie.value(), secret, now))
}

/// Compares the submitted password without leaking where it diverges.
pub(crate) fn check_password(provided: &str, expected: &str) -> bool {
    let mut tag = mac("admin-login");
    tag.update(expected.as_bytes());
    let expected = tag.finalize().into_bytes();

    let mut mac = mac("admin-login");
    mac.update(provided.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

pub(crate) fn session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .path("/")
        .max_age(time::Duration::seconds(config.ttl))
        .build()
}

pub(crate) fn clear_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

pub(crate) async fn authorize(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    let jar = CookieJar::from_headers(request.headers());

    if !is_authorized(&jar, &state.auth.secret, Utc::now().timestamp()) {
        return Err(Error::Unauthorized);
    }

    Ok(next.run(request).await)
}
