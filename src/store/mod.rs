pub mod channel;
pub mod directory;
pub mod profiles;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("authentication required")]
    AuthRequired,
    #[error("access denied")]
    Denied,
    #[error("username already taken")]
    UsernameTaken,
    #[error("username must be 3-20 characters: letters, digits, underscore")]
    InvalidUsername,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// The uniqueness trigger aborts with a fixed message; surface that as a
/// conflict the caller can present, not a generic database failure.
pub(crate) fn map_username_conflict(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.message().contains("username already taken") {
            return StoreError::UsernameTaken;
        }
    }
    StoreError::Database(err)
}
