use axum::{debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::store::profiles::ProfileChanges;
use crate::{session, store, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user_id = session::current_user(&session).await?;

    match store::profiles::fetch_profile(&db_pool, &user_id).await? {
        Some(profile) => Ok(Json(profile).into_response()),
        // signed in but not yet claimed
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(changes): Json<ProfileChanges>,
) -> AppResult<Response> {
    let user_id = session::current_user(&session).await?;

    let profile =
        store::profiles::update_profile(&db_pool, &user_id, &user_id, changes).await?;

    Ok(Json(profile).into_response())
}
