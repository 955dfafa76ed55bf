//! Request extractors: session cookie, current user, admin gate and JSON bodies.

use crate::error::ApiError;
use crate::server::AppState;
use crate::store::UserRecord;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::Json;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use voiceease_shared::{Principal, VoiceEaseError};

pub const SESSION_COOKIE: &str = "voiceease_session";

/// Session token from the `Cookie` header(s), if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that starts a session
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError(VoiceEaseError::Internal(format!("bad cookie value: {}", e))))
}

/// `Set-Cookie` value that ends a session
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("voiceease_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// The signed-in user. Rejects with 401 when there is no live session or
/// the session's user no longer exists.
pub struct CurrentUser(pub UserRecord);

impl CurrentUser {
    pub fn principal(&self) -> Principal {
        self.0.principal()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let user_id = state
            .sessions
            .user_id(&token)
            .await
            .ok_or_else(ApiError::unauthorized)?;

        match state.store.get_user(user_id)? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                debug!("  Session points at deleted user {}", user_id);
                state.sessions.remove(&token).await;
                Err(ApiError::unauthorized())
            }
        }
    }
}

/// A signed-in admin. 401 without a session, 403 for non-admins.
pub struct AdminUser(pub UserRecord);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.principal().is_admin() {
            Ok(AdminUser(user))
        } else {
            warn!("  User {} denied admin route {}", user.id, parts.uri.path());
            Err(ApiError(VoiceEaseError::Forbidden))
        }
    }
}

/// JSON body whose rejections are 400 validation errors with our error shape
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError(VoiceEaseError::invalid(rejection.body_text()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; voiceease_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_absent_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("voiceease_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", Duration::from_secs(60), true).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("voiceease_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(cookie.ends_with("; Secure"));
    }
}
