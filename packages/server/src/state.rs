use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::collaborators::{
    ArtifactResolver, DirectoryProfiles, EventSink, ProfileLookup, StorageUrlResolver,
    TracingEventSink,
};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub profiles: Arc<dyn ProfileLookup>,
    pub artifacts: Arc<dyn ArtifactResolver>,
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    /// Wire up the default collaborators: the local participant directory,
    /// the configured artifact base URL and a logging event sink.
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let profiles = Arc::new(DirectoryProfiles::new(db.clone()));
        let artifacts = Arc::new(StorageUrlResolver::new(config.artifacts.base_url.clone()));

        Self {
            db,
            config: Arc::new(config),
            profiles,
            artifacts,
            events: Arc::new(TracingEventSink),
        }
    }
}
