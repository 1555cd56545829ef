use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppResult};

#[derive(Debug, Deserialize)]
pub(crate) struct NewConversationQuery {
    title: Option<String>,
    participant_ids: Vec<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_conversation(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(NewConversationQuery { title, participant_ids }): Json<NewConversationQuery>,
) -> AppResult<Json<Value>> {
    let user_id = session::current_user(&session).await?;

    let id = store::directory::create_conversation(
        &db_pool,
        &user_id,
        title.as_deref(),
        &participant_ids,
    )
    .await?;

    Ok(Json(json!({ "id": id })))
}
