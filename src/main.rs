use axum::{debug_handler, routing::{get, post}, Json, Router};
use quietwire::{auth, conversations, db, profiles, uploads, AppState};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quietwire=info")),
        )
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(12)));

    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://quietwire.db".to_owned());
    let db_pool = db::connect(&database_url)
        .await
        .expect("database connection failed");
    db::init_schema(&db_pool).await.expect("schema init failed");

    let secret_path =
        dotenv::var("CLIENT_SECRET_PATH").unwrap_or_else(|_| "client_secret.json".to_owned());
    let clients = match auth::Clients::load(&secret_path) {
        Ok(clients) => clients,
        Err(err) => {
            tracing::warn!(%err, path = %secret_path, "oauth secrets unavailable, logins disabled");
            auth::Clients::disabled()
        }
    };

    let app_state = AppState {
        db_pool,
        clients,
        tx: broadcast::channel(64).0,
    };

    let uploads_router = Router::new()
        .route("/new", post(uploads::upload))
        .fallback_service(ServeDir::new(uploads::upload_dir()));

    let app = Router::new()
        .route("/", get(health))
        .merge(auth::router())
        .nest("/c", conversations::router())
        .nest("/p", profiles::router())
        .nest("/u", uploads_router)
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    tracing::info!(addr = %bind_addr, "listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("bind failed");
    axum::serve(listener, app).await.expect("server failed");
}

#[debug_handler]
async fn health() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
