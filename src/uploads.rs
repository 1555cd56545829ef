//! Blob store collaborator: accept a binary upload, hand back a publicly
//! dereferenceable URL. Files land under `UPLOAD_DIR` with fresh UUIDv7
//! names and are served read-only from `/u/`.

use std::path::PathBuf;

use axum::{debug_handler, extract::Multipart, Json};
use serde_json::{json, Value};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session, AppResult};

pub fn upload_dir() -> PathBuf {
    PathBuf::from(dotenv::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_owned()))
}

#[debug_handler(state = crate::AppState)]
pub async fn upload(session: Session, mut multipart: Multipart) -> AppResult<Json<Value>> {
    session::current_user(&session).await?;

    while let Some(field) = multipart.next_field().await? {
        let extension = field
            .file_name()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_owned()))
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        let data = field.bytes().await?;

        let name = match extension {
            Some(ext) => format!("{}.{}", Uuid::now_v7(), ext.to_ascii_lowercase()),
            None => Uuid::now_v7().to_string(),
        };

        let dir = upload_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &data).await?;

        tracing::info!(name = %name, bytes = data.len(), "upload stored");

        return Ok(Json(json!({ "url": format!("/u/{name}") })));
    }

    Err(anyhow::anyhow!("multipart upload without a file field").into())
}
