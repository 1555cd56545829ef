use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::model::Profile;
use crate::{session, store, AppResult};

#[derive(Deserialize)]
pub(crate) struct SearchQuery {
    q: String,
    limit: Option<i64>,
}

/// Username prefix lookup backing the new-conversation picker. Debouncing
/// and superseding stale results is the caller's concern; this end just
/// keeps the lookup indexed and bounded.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn search(
    Query(SearchQuery { q, limit }): Query<SearchQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<Profile>>> {
    session::current_user(&session).await?;

    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let profiles = store::profiles::search(&db_pool, &q, limit.unwrap_or(10)).await?;
    Ok(Json(profiles))
}
