use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::model::Profile;
use crate::{session, store, AppResult};

#[derive(Deserialize)]
pub(crate) struct ClaimQuery {
    username: String,
    display_name: Option<String>,
}

/// Signup: the signed-in caller picks their username. The store rejects
/// anything outside `[A-Za-z0-9_]{3,20}` and the schema trigger turns a
/// case-insensitive duplicate into a conflict.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn claim(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(ClaimQuery { username, display_name }): Json<ClaimQuery>,
) -> AppResult<Json<Profile>> {
    let user_id = session::current_user(&session).await?;

    let profile = store::profiles::claim_profile(
        &db_pool,
        &user_id,
        &username,
        display_name.as_deref(),
    )
    .await?;

    Ok(Json(profile))
}
