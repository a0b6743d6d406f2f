//! Server state shared across handlers.

use std::{path::PathBuf, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionRegistry, MessageStore, RoomCatalog},
    infrastructure::BroadcastRouter,
};

/// Shared application state.
///
/// The Connection Registry is the single mutable structure of the hub; it is
/// owned here behind one mutex and handed to every handler by reference, so
/// there is no hidden module-level state.
pub struct AppState {
    /// Live connections and their bindings
    pub registry: Arc<Mutex<ConnectionRegistry>>,
    /// Fan-out router over the connections' outbound channels
    pub router: Arc<BroadcastRouter>,
    /// Room catalog（データアクセス層の抽象化）
    pub catalog: Arc<dyn RoomCatalog>,
    /// Message store（データアクセス層の抽象化）
    pub store: Arc<dyn MessageStore>,
    /// Directory where uploaded files are stored
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Create the shared state over the given collaborators
    pub fn new(
        catalog: Arc<dyn RoomCatalog>,
        store: Arc<dyn MessageStore>,
        upload_dir: PathBuf,
    ) -> Self {
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let router = Arc::new(BroadcastRouter::new(registry.clone()));
        Self {
            registry,
            router,
            catalog,
            store,
            upload_dir,
        }
    }
}
