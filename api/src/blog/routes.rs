use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::App;

use super::{
    comment::{
        create::post_comment, delete::remove_comment, get::get_comments, patch::patch_comment,
    },
    like::like_post,
};

pub fn route() -> Router<App> {
    // TODO rate limit these public endpoints
    Router::<App>::new()
        .route("/{post_id}/comments", get(get_comments).post(post_comment))
        .route(
            "/{post_id}/comments/{id}",
            patch(patch_comment).delete(remove_comment),
        )
        .route("/{post_id}/like", post(like_post))
}
