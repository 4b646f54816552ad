// Application state module
// Everything a handler may touch, built once at startup and shared behind an Arc

use std::path::PathBuf;
use std::sync::Arc;

use super::types::Config;
use crate::routing::Router;
use crate::storage::Storage;
use crate::templates::Templates;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Arc<Router>,
    pub templates: Templates,
    pub storage: Storage,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Build the route table, template environment and storage from `config`
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let router = Arc::new(Router::new()?);
        let templates = Templates::new(Arc::clone(&router))?;

        Ok(Self {
            config: config.clone(),
            router,
            templates,
            storage: Storage::from_config(&config.storage),
            static_dir: PathBuf::from(&config.storage.static_dir),
        })
    }
}
