use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};

use crate::{App, error::AppError};

use super::{AuthUser, COOKIE_NAME, MaybeAuthUser, models::profile::Profile};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/me", get(handle_whoami))
        .route("/logout", post(logout))
}

async fn handle_whoami(AuthUser(session): AuthUser) -> Json<Profile> {
    Json(session.profile)
}

#[axum::debug_handler(state = App)]
async fn logout(
    State(ctx): State<App>,
    MaybeAuthUser(session): MaybeAuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Ok(session) = session {
        let ended = ctx.store.end_session(&session.token).await?;
        tracing::debug!(user_id = %session.user_id(), ended, "Session ended");
    }

    Ok(jar.remove(Cookie::build(COOKIE_NAME).path("/")))
}
