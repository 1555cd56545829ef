use axum::{debug_handler, extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppResult};

/// Any authenticated caller may read any profile.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    Path(profile_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    session::current_user(&session).await?;

    match store::profiles::fetch_profile(&db_pool, &profile_id).await? {
        Some(profile) => Ok(Json(profile).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}
