use axum::{debug_handler, extract::State, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::model::ConversationEntry;
use crate::{session, store, AppResult};

/// The caller's directory: every conversation they participate in, newest
/// activity first, with membership and the latest message embedded.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<ConversationEntry>>> {
    let user_id = session::current_user(&session).await?;

    let entries = store::directory::fetch_conversations(&db_pool, &user_id).await?;
    Ok(Json(entries))
}
