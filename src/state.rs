use crate::config::Config;
use crate::recognizer::PlateRecognizer;
use crate::storage::DocumentStore;
use std::sync::Arc;

/// Shared by every request on both listeners.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub recognizer: PlateRecognizer,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: DocumentStore) -> Self {
        let recognizer = PlateRecognizer::from_url(config.recognizer_url.clone());
        Self {
            store: Arc::new(store),
            recognizer,
            config: Arc::new(config),
        }
    }
}
