//! Key-value persistence with an in-memory fallback.
//!
//! [`StorageAdapter`] sits in front of a durable [`KeyValueBackend`]. It probes
//! the backend once at construction; if the probe fails, the in-memory map is
//! authoritative for the lifetime of the adapter. A fault on an individual
//! call falls back for that call only. Callers never see backend errors.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, warn};

const PROBE_KEY: &str = "__storage_probe__";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error for {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub trait KeyValueBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;
    fn clear(&mut self) -> Result<(), BackendError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BackendError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BackendError + '_ {
    move |source| BackendError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(io_error(&self.dir)(err)),
        };
        for entry in entries {
            let path = entry.map_err(io_error(&self.dir))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).map_err(io_error(&path))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        self.values.clear();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Probe,
    Get,
    Set,
    Remove,
    Clear,
}

/// Published whenever the adapter routes an operation to the fallback map
/// because the durable backend failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub op: StorageOp,
    pub key: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    pub value: Option<String>,
    /// The durable backend is authoritative but this read failed over.
    pub degraded: bool,
}

pub struct StorageAdapter {
    backend: Box<dyn KeyValueBackend>,
    durable: bool,
    fallback: HashMap<String, String>,
    events: broadcast::Sender<StorageEvent>,
}

impl StorageAdapter {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        let (events, _) = broadcast::channel(64);
        let mut adapter = Self {
            backend: Box::new(backend),
            durable: false,
            fallback: HashMap::new(),
            events,
        };
        adapter.durable = adapter.probe();
        adapter
    }

    fn probe(&mut self) -> bool {
        let result = self
            .backend
            .set(PROBE_KEY, PROBE_KEY)
            .and_then(|()| self.backend.remove(PROBE_KEY));
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("durable storage not available, using fallback storage: {err}");
                self.emit(StorageOp::Probe, None, &err);
                false
            }
        }
    }

    /// True when the durable backend passed the startup probe.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    fn emit(&self, op: StorageOp, key: Option<&str>, err: &BackendError) {
        // No receivers is the normal case.
        let _ = self.events.send(StorageEvent {
            op,
            key: key.map(str::to_string),
            message: err.to_string(),
        });
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read(key).value
    }

    /// Like [`get`](Self::get), but also reports whether the durable backend
    /// failed and the value came from the fallback map instead.
    pub fn read(&self, key: &str) -> Read {
        if !self.durable {
            return Read {
                value: self.fallback.get(key).cloned(),
                degraded: false,
            };
        }
        match self.backend.get(key) {
            Ok(value) => Read {
                value,
                degraded: false,
            },
            Err(err) => {
                error!(key, "error reading data: {err}");
                self.emit(StorageOp::Get, Some(key), &err);
                Read {
                    value: self.fallback.get(key).cloned(),
                    degraded: true,
                }
            }
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if !self.durable {
            self.fallback.insert(key.to_string(), value.to_string());
            return;
        }
        if let Err(err) = self.backend.set(key, value) {
            error!(key, "error saving data: {err}");
            self.emit(StorageOp::Set, Some(key), &err);
            self.fallback.insert(key.to_string(), value.to_string());
        }
    }

    pub fn remove(&mut self, key: &str) {
        if !self.durable {
            self.fallback.remove(key);
            return;
        }
        if let Err(err) = self.backend.remove(key) {
            error!(key, "error removing data: {err}");
            self.emit(StorageOp::Remove, Some(key), &err);
            self.fallback.remove(key);
        }
    }

    pub fn clear(&mut self) {
        if !self.durable {
            self.fallback.clear();
            return;
        }
        if let Err(err) = self.backend.clear() {
            error!("error clearing data: {err}");
            self.emit(StorageOp::Clear, None, &err);
            self.fallback.clear();
        }
    }
}
