use axum::http::{HeaderMap, header, request::Parts};
use uuid::Uuid;

use crate::{
    App,
    error::{ApiRequestError, AppError},
};

use self::models::profile::Profile;

pub mod models;
pub mod routes;

pub const COOKIE_NAME: &str = "auth_token";

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error(
        "Authentication required, but no cookie `{COOKIE_NAME}` or bearer token found in headers."
    )]
    NoCookie,

    #[error(
        "Unauthorized, please check if you're logged in by refreshing the \
         page. This could be due to an expired session or token has became invalid."
    )]
    Unauthorized,
}

impl ApiRequestError for AuthenticationError {
    fn status_code(&self) -> axum::http::StatusCode {
        match self {
            AuthenticationError::NoCookie => axum::http::StatusCode::BAD_REQUEST,
            AuthenticationError::Unauthorized => axum::http::StatusCode::UNAUTHORIZED,
        }
    }
}

/// The identity of the user making a request. Resolved once per request and
/// handed explicitly to every operation that acts on behalf of a user.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.profile.id
    }
}

/// Sessions are minted by the hosted auth service, which hands the token to
/// the browser as a cookie. API clients may send it as a bearer token instead.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = axum_extra::extract::cookie::CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        return Some(cookie.value().to_owned());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

pub struct MaybeAuthUser(pub Result<Session, AuthenticationError>);

impl axum::extract::FromRequestParts<App> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let token = match session_token(&parts.headers) {
            Some(token) => token,
            None => return Ok(MaybeAuthUser(Err(AuthenticationError::NoCookie))),
        };

        let profile = state.store.session_profile(&token).await?;

        Ok(MaybeAuthUser(
            profile
                .map(|profile| Session { token, profile })
                .ok_or(AuthenticationError::Unauthorized),
        ))
    }
}

pub struct AuthUser(pub Session);

impl axum::extract::FromRequestParts<App> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(session) = MaybeAuthUser::from_request_parts(parts, state).await?;

        Ok(AuthUser(session?))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::store::memory::{MemoryStore, app};
    use axum::{extract::FromRequestParts, http::HeaderValue};

    fn parts_with_cookie(token: Option<&str>) -> Parts {
        let mut request = axum::http::Request::builder();
        if let Some(token) = token {
            request = request.header(header::COOKIE, format!("{COOKIE_NAME}={token}"));
        }
        request.body(()).unwrap().into_parts().0
    }

    async fn resolve(app: &App, token: Option<&str>) -> Result<Session, AuthenticationError> {
        let MaybeAuthUser(session) =
            MaybeAuthUser::from_request_parts(&mut parts_with_cookie(token), app)
                .await
                .ok()
                .unwrap();
        session
    }

    #[tokio::test]
    async fn test_active_session_resolves_to_profile() {
        let store = Arc::new(MemoryStore::new());
        let ada = store.add_profile("ada", None);
        store.add_session("live", ada.id, true);

        let session = resolve(&app(store), Some("live")).await.unwrap();

        assert_eq!(session.token, "live");
        assert_eq!(session.profile, ada);
    }

    #[tokio::test]
    async fn test_inactive_or_unknown_session_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let ada = store.add_profile("ada", None);
        store.add_session("dead", ada.id, false);
        let app = app(store);

        assert!(matches!(
            resolve(&app, Some("dead")).await,
            Err(AuthenticationError::Unauthorized)
        ));
        assert!(matches!(
            resolve(&app, Some("forged")).await,
            Err(AuthenticationError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_missing_token_is_no_cookie() {
        let app = app(Arc::new(MemoryStore::new()));

        assert!(matches!(
            resolve(&app, None).await,
            Err(AuthenticationError::NoCookie)
        ));
    }

    #[tokio::test]
    async fn test_auth_user_rejects_inactive_session() {
        let store = Arc::new(MemoryStore::new());
        let ada = store.add_profile("ada", None);
        store.add_session("dead", ada.id, false);

        let err = AuthUser::from_request_parts(&mut parts_with_cookie(Some("dead")), &app(store))
            .await
            .err()
            .unwrap();

        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_session_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=abc123"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer xyz"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_session_token_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(session_token(&headers).is_none());
    }
}
