use std::{
    collections::BTreeMap,
    ffi::OsString,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use pacer_core::persist::{KeyValueStore, PROGRESS_KEY};

#[derive(Debug)]
pub(super) enum FileStoreError {
    Io(io::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for FileStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "session file: {}", err),
            Self::Encode(err) => write!(f, "session file encoding: {}", err),
        }
    }
}

impl std::error::Error for FileStoreError {}

/// JSON object of string values on disk.
///
/// The reading position changes on every word, so it lives in a small
/// sidecar file next to the session file. Writing it never touches the text.
pub(super) struct FileStore {
    path: PathBuf,
    progress_path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Load `path`, starting empty when it is missing or unreadable as JSON.
    pub(super) fn open(path: &Path) -> Result<Self, FileStoreError> {
        let mut entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        "file-store: {} is not a session file ({}), starting empty",
                        path.display(),
                        err
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("file-store: {} not found, starting empty", path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(FileStoreError::Io(err)),
        };

        let progress_path = path.with_extension("progress");
        match fs::read_to_string(&progress_path) {
            Ok(raw) => {
                entries.insert(PROGRESS_KEY.to_owned(), raw.trim().to_owned());
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(FileStoreError::Io(err)),
        }

        Ok(Self {
            path: path.to_path_buf(),
            progress_path,
            entries,
        })
    }

    fn flush_session(&self) -> Result<(), FileStoreError> {
        let session: BTreeMap<&str, &str> = self
            .entries
            .iter()
            .filter(|(key, _)| key.as_str() != PROGRESS_KEY)
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        let encoded = serde_json::to_string_pretty(&session).map_err(FileStoreError::Encode)?;
        replace_file(&self.path, encoded.as_bytes())
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut staging = OsString::from(target.as_os_str());
    staging.push(".tmp");
    PathBuf::from(staging)
}

// Write-then-rename so a crash mid-write leaves the previous file intact.
fn replace_file(target: &Path, contents: &[u8]) -> Result<(), FileStoreError> {
    let staging = staging_path(target);
    fs::write(&staging, contents).map_err(FileStoreError::Io)?;
    fs::rename(&staging, target).map_err(FileStoreError::Io)
}

impl KeyValueStore for FileStore {
    type Error = FileStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }

        self.entries.insert(key.to_owned(), value.to_owned());
        if key == PROGRESS_KEY {
            replace_file(&self.progress_path, value.as_bytes())
        } else {
            self.flush_session()
        }
    }
}
