use crate::store::FitnessStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<FitnessStore>>,
}

impl AppState {
    pub fn new(store: FitnessStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}
