pub mod appresult;
pub mod auth;
pub mod conversations;
pub mod db;
pub mod model;
pub mod policy;
pub mod profiles;
pub mod session;
pub mod store;
pub mod uploads;

pub use appresult::{AppError, AppResult};

use axum::extract::FromRef;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
    pub tx: broadcast::Sender<ChannelEvent>,
}

/// One persisted message, fanned out to websocket subscribers of its
/// conversation. The payload is the JSON-serialized stored row.
#[derive(Clone, Debug)]
pub struct ChannelEvent {
    pub conversation_id: String,
    pub payload: String,
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String>;
    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String> {
        Ok(
            self.get(field)
            .ok_or(anyhow::anyhow!("expected {field} in {self}"))?
            .as_str()
            .ok_or(anyhow::anyhow!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value> {
        self.get(field)
        .ok_or(anyhow::anyhow!("expected {field} in {self}"))
    }
}
