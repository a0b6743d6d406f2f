//! Server assembly and lifecycle.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    domain::{CatalogError, MessageStore, RoomCatalog, RoomName},
    error::ServerError,
    infrastructure::repository::{InMemoryMessageStore, InMemoryRoomCatalog},
    ui::{
        handler::{
            MAX_UPLOAD_BYTES, create_room, get_room_messages, get_rooms, health_check,
            upload_file, websocket_handler,
        },
        signal::shutdown_signal,
        state::AppState,
    },
};

/// Rooms created at startup when absent
const DEFAULT_ROOMS: [&str; 5] = ["general", "coding", "gaming", "movies", "music"];

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Directory where uploaded files are stored and served from
    pub upload_dir: PathBuf,
}

/// Run the chat relay server until a shutdown signal arrives.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let catalog: Arc<dyn RoomCatalog> = Arc::new(InMemoryRoomCatalog::new());
    let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new());

    seed_default_rooms(catalog.as_ref()).await?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = Arc::new(AppState::new(catalog, store, config.upload_dir.clone()));

    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms).post(create_room))
        .route("/api/messages/{room}", get(get_room_messages))
        .route(
            "/api/upload",
            post(upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/ws", get(websocket_handler))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Create the default rooms, skipping the ones that already exist.
async fn seed_default_rooms(catalog: &dyn RoomCatalog) -> Result<(), ServerError> {
    for name in DEFAULT_ROOMS {
        let room = RoomName::new(name.to_string()).unwrap();
        match catalog.create(room).await {
            Ok(_) => {}
            Err(CatalogError::AlreadyExists(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!("Default rooms initialized");
    Ok(())
}
