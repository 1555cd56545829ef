mod list;
mod msg;
mod new;
mod ws;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list))
        .route("/new", post(new::new_conversation))
        .route("/{id}/messages", get(msg::fetch).post(msg::send))
        .route("/{id}/ws", get(ws::conversation_ws))
}
