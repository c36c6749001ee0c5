pub mod aggregate;
pub mod app;
pub mod backup;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{FileBackend, StorageAdapter};
pub use store::FitnessStore;
