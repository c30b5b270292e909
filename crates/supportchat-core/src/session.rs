use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::WidgetError;

/// Local cache of the server-assigned session id: one file holding a
/// string-encoded integer. The server stays authoritative; this file is
/// only read at startup and written when a session id is first known.
/// There is no eviction or expiry.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Result<Self, WidgetError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            WidgetError::SessionStore(io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine config directory",
            ))
        })?;

        Ok(Self::at(config_dir.join("supportchat").join("session")))
    }

    /// Read the persisted session id. Anything that is missing or does not
    /// parse as an integer is treated as no session.
    pub fn restore(&self) -> Option<i64> {
        fs::read_to_string(&self.path).ok()?.trim().parse().ok()
    }

    pub fn persist(&self, id: i64) -> Result<(), WidgetError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, id.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::at(dir.path().join("session"))
    }

    #[test]
    fn test_restore_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).restore(), None);
    }

    #[test]
    fn test_persist_then_restore() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.persist(42).unwrap();
        assert_eq!(store.restore(), Some(42));
    }

    #[test]
    fn test_restore_tolerates_whitespace() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("session"), " 17\n").unwrap();
        assert_eq!(store.restore(), Some(17));
    }

    #[test]
    fn test_restore_garbage_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("session"), "not-a-number").unwrap();
        assert_eq!(store.restore(), None);
    }

    #[test]
    fn test_persist_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::at(dir.path().join("nested").join("session"));
        store.persist(7).unwrap();
        assert_eq!(store.restore(), Some(7));
    }
}
