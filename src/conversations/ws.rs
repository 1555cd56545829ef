use axum::{debug_handler, extract::{Path, State, WebSocketUpgrade}, response::{IntoResponse, Response}};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_sessions::Session;
use uuid::Uuid;

use crate::store::channel::Draft;
use crate::{policy, session, store, AppResult, ChannelEvent};

enum Forward {
    Deliver(String),
    Skip,
    Stop,
}

/// An overrun subscriber misses the dropped frames but keeps receiving;
/// only a closed channel ends the feed.
fn next_step(result: Result<ChannelEvent, RecvError>, subscribed: &str) -> Forward {
    match result {
        Ok(event) if event.conversation_id == subscribed => Forward::Deliver(event.payload),
        Ok(_) => Forward::Skip,
        Err(RecvError::Lagged(_)) => Forward::Skip,
        Err(RecvError::Closed) => Forward::Stop,
    }
}

/// Change notification for one conversation: persisted messages are pushed
/// as JSON frames, and inbound frames are treated as message drafts.
/// Membership is checked before the upgrade; the socket never sees rows
/// the caller could not fetch.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn conversation_ws(
    Path(conversation_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ChannelEvent>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let user_id = session::current_user(&session).await?;
    let conversation_id = conversation_id.to_string();

    policy::ensure_participant(&db_pool, &user_id, &conversation_id).await?;

    Ok(ws.on_upgrade(async move |stream| {
        let mut rx = tx.subscribe();
        let (mut sender, mut receiver) = stream.split();

        let subscribed = conversation_id.clone();
        let forward = tokio::spawn(async move {
            loop {
                match next_step(rx.recv().await, &subscribed) {
                    Forward::Deliver(payload) => {
                        if sender.send(payload.into()).await.is_err() {
                            break;
                        }
                    }
                    Forward::Skip => continue,
                    Forward::Stop => break,
                }
            }
        });

        while let Some(Ok(frame)) = receiver.next().await {
            let Ok(draft) = serde_json::from_slice::<Draft>(&frame.into_data()) else {
                continue;
            };

            match store::channel::send_message(&db_pool, &user_id, &conversation_id, draft).await {
                Ok(message) => {
                    let payload = serde_json::to_string(&message).unwrap_or_default();
                    let _ = tx.send(ChannelEvent {
                        conversation_id: message.conversation_id,
                        payload,
                    });
                }
                Err(err) => tracing::debug!(%err, "websocket send rejected"),
            }
        }

        forward.abort();
    })
    .into_response())
}
