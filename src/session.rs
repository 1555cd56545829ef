use tower_sessions::Session;

use crate::{store::StoreError, AppError, AppResult};

pub const USER_ID: &str = "user_id";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";

/// Resolves the authenticated caller or fails with an auth error,
/// never a hint about what exists.
pub async fn current_user(session: &Session) -> AppResult<String> {
    session
        .get::<String>(USER_ID)
        .await?
        .ok_or_else(|| AppError::from(StoreError::AuthRequired))
}
