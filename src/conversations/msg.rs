use axum::{debug_handler, extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::model::Message;
use crate::store::channel::Draft;
use crate::{session, store, AppResult, ChannelEvent};

#[derive(Deserialize)]
pub(crate) struct FetchQuery {
    before: Option<String>,
    limit: Option<i64>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn fetch(
    Path(conversation_id): Path<Uuid>,
    Query(FetchQuery { before, limit }): Query<FetchQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<Message>>> {
    let user_id = session::current_user(&session).await?;

    let messages = store::channel::fetch_messages(
        &db_pool,
        &user_id,
        &conversation_id.to_string(),
        before.as_deref(),
        limit,
    )
    .await?;

    Ok(Json(messages))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send(
    Path(conversation_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ChannelEvent>>,
    session: Session,
    Json(draft): Json<Draft>,
) -> AppResult<Json<Message>> {
    let user_id = session::current_user(&session).await?;

    let message = store::channel::send_message(
        &db_pool,
        &user_id,
        &conversation_id.to_string(),
        draft,
    )
    .await?;

    let _ = tx.send(ChannelEvent {
        conversation_id: message.conversation_id.clone(),
        payload: serde_json::to_string(&message)?,
    });

    Ok(Json(message))
}
