mod claim;
mod me;
mod page;
mod search;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::me).patch(me::update))
        .route("/claim", post(claim::claim))
        .route("/search", get(search::search))
        .route("/{id}", get(page::profile))
}
