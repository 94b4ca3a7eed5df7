use crate::config::Config;
use crate::error::{AppError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

/// Key-value slot holding the serialized auth state.
pub trait AuthStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, contents: &str) -> Result<()>;
}

pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Config::cache_file("auth_state.json")?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl AuthStore for FileAuthStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| AppError::Auth(format!("Failed to read auth state: {}", e)))?;
        Ok(Some(contents))
    }

    fn save(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Auth(format!("Failed to create auth state directory: {}", e))
            })?;
        }

        // The file holds a bearer token, keep it private to the user
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)
            .map_err(|e| AppError::Auth(format!("Failed to create auth state file: {}", e)))?;

        file.write_all(contents.as_bytes())
            .map_err(|e| AppError::Auth(format!("Failed to write auth state file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct MemoryAuthStore {
        pub contents: Arc<Mutex<Option<String>>>,
    }

    impl MemoryAuthStore {
        pub(crate) fn with_contents(contents: &str) -> Self {
            Self {
                contents: Arc::new(Mutex::new(Some(contents.to_string()))),
            }
        }
    }

    impl AuthStore for MemoryAuthStore {
        fn load(&self) -> Result<Option<String>> {
            Ok(self.contents.lock().unwrap().clone())
        }

        fn save(&self, contents: &str) -> Result<()> {
            *self.contents.lock().unwrap() = Some(contents.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAuthStore::with_path(dir.path().join("nested").join("auth_state.json"));

        assert_eq!(store.load().unwrap(), None);

        store.save(r#"{"isSignedIn":true,"accessToken":"t"}"#).unwrap();
        store.save(r#"{"isSignedIn":false,"accessToken":null}"#).unwrap();

        assert_eq!(
            store.load().unwrap().as_deref(),
            Some(r#"{"isSignedIn":false,"accessToken":null}"#)
        );

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
