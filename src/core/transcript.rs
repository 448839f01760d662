//! Conversation persistence.
//!
//! The whole conversation is mirrored to a single JSON file on every
//! mutation: a full re-serialization, last-write-wins, no partial updates.
//! Reads happen once at startup. Storage failures never reach the user;
//! a corrupt transcript is discarded and the session starts empty.

use crate::core::config::data::path_display;
use crate::core::constants::TRANSCRIPT_FILE;
use crate::core::message::Message;
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[derive(Debug)]
pub enum TranscriptError {
    /// The platform data directory could not be determined.
    NoDataDir,

    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    Serialize {
        source: serde_json::Error,
    },
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::NoDataDir => {
                write!(f, "Could not determine a data directory for this platform")
            }
            TranscriptError::Write { path, source } => {
                write!(
                    f,
                    "Failed to write transcript at {}: {}",
                    path_display(path),
                    source
                )
            }
            TranscriptError::Serialize { source } => {
                write!(f, "Failed to serialize transcript: {source}")
            }
        }
    }
}

impl StdError for TranscriptError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TranscriptError::NoDataDir => None,
            TranscriptError::Write { source, .. } => Some(source),
            TranscriptError::Serialize { source } => Some(source),
        }
    }
}

pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn open_default() -> Result<Self, TranscriptError> {
        let proj_dirs =
            ProjectDirs::from("org", "permacommons", "sherpa").ok_or(TranscriptError::NoDataDir)?;
        Ok(Self {
            path: proj_dirs.data_dir().join(TRANSCRIPT_FILE),
        })
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Restore the persisted conversation. Malformed or unreadable data is
    /// discarded and an empty conversation returned; the UI never sees a
    /// persistence failure.
    pub fn load(&self) -> Vec<Message> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("failed to read transcript at {}: {e}", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Message>>(&contents) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(
                    "discarding corrupt transcript at {}: {e}",
                    self.path.display()
                );
                self.clear();
                Vec::new()
            }
        }
    }

    /// Persist the full conversation. Best-effort: quota or permission
    /// problems are logged and the conversation continues in memory.
    pub fn save(&self, messages: &[Message]) {
        if let Err(e) = self.try_save(messages) {
            tracing::warn!("failed to persist transcript: {e}");
        }
    }

    fn try_save(&self, messages: &[Message]) -> Result<(), TranscriptError> {
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|source| TranscriptError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let contents = serde_json::to_string(messages)
            .map_err(|source| TranscriptError::Serialize { source })?;

        // Temp file in the same directory so the final rename is atomic; a
        // torn write must never leave a half-serialized transcript behind.
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|source| TranscriptError::Write {
            path: self.path.clone(),
            source,
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|source| TranscriptError::Write {
                path: self.path.clone(),
                source,
            })?;
        temp_file
            .persist(&self.path)
            .map_err(|e| TranscriptError::Write {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }

    /// Erase the persisted conversation (new chat, or corrupt data).
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to clear transcript: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{MessageId, MessageIdAllocator, Role};

    fn store_in(dir: &tempfile::TempDir) -> TranscriptStore {
        TranscriptStore::at_path(dir.path().join(TRANSCRIPT_FILE))
    }

    fn sample_conversation() -> Vec<Message> {
        let mut ids = MessageIdAllocator::new();
        vec![
            Message::user(ids.allocate(), "What suits a biology grad?"),
            Message::new(ids.allocate(), Role::Model, "Plenty of paths…"),
            Message::user(ids.allocate(), "Tell me about lab work."),
        ]
    }

    #[test]
    fn save_then_load_reproduces_the_sequence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let messages = sample_conversation();

        store.save(&messages);
        let restored = store.load();

        assert_eq!(restored.len(), messages.len());
        for (restored, original) in restored.iter().zip(&messages) {
            assert_eq!(restored.id, original.id);
            assert_eq!(restored.role, original.role);
            assert_eq!(restored.content, original.content);
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn malformed_payload_loads_empty_and_is_discarded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let path = dir.path().join(TRANSCRIPT_FILE);

        fs::write(&path, "{\"not\": \"an array\"}").expect("writes");
        assert!(store.load().is_empty());
        // The corrupt file is gone, so the next run starts clean too.
        assert!(!path.exists());
    }

    #[test]
    fn non_message_array_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(dir.path().join(TRANSCRIPT_FILE), "[1, 2, 3]").expect("writes");
        assert!(store.load().is_empty());
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(&sample_conversation());
        store.clear();
        assert!(store.load().is_empty());
        // Clearing an already-empty store is fine.
        store.clear();
    }

    #[test]
    fn ids_survive_the_round_trip_exactly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let messages = vec![Message::user(MessageId(7), "hi")];
        store.save(&messages);
        assert_eq!(store.load()[0].id, MessageId(7));
    }
}
