use axum::{debug_handler, extract::{Query, State}, response::Redirect};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::model::Presence;
use crate::session::USER_ID;
use crate::store;
use crate::AppResult;

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Redirect> {
    if let Some(user_id) = session.get::<String>(USER_ID).await? {
        store::profiles::set_presence(&db_pool, &user_id, Presence::Offline).await?;
    }

    session.clear().await;
    Ok(Redirect::to(return_url.unwrap_or("/".to_string()).as_str()))
}
