//! Session Store: where the single bearer token lives between calls.
//!
//! # Design
//! The store is a trait so `SessionContext` receives it explicitly instead
//! of reaching for process-wide state. `get` never fails: an unreadable token
//! is indistinguishable from a missing one, and both end in `Unauthorized`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::warn;

use crate::error::ApiError;

/// Holds at most one opaque bearer token.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<String>;

    /// Persist `token`, replacing any prior value. Surrounding whitespace is
    /// not part of a token.
    fn set(&self, token: &str) -> Result<(), ApiError>;

    fn clear(&self) -> Result<(), ApiError>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, token: &str) -> Result<(), ApiError> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.trim().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

/// Keeps the token in a single file so it survives restarts.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unable to read session token");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        write_owner_only(&self.path, token.trim())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes `contents` readable by the owner only.
#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &str) -> io::Result<()> {
    use std::fs::Permissions;
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    // `mode` only applies on creation; tighten a file left by an older run.
    fs::set_permissions(path, Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}
