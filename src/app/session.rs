// emsctl - app/session.rs
//
// Session persistence: keep the authenticated username and bearer token
// between invocations so each command does not demand a fresh login.
//
// Design principles:
// - The session is saved atomically (write to temp, rename to final) so a
//   crash during save never corrupts the previous good session.
// - Load errors are silently discarded (a corrupt or incompatible session
//   file means "not logged in", not an error the user has to resolve).
// - The data directory is created on first save; no user action required.
// - The token itself is opaque to the console; expiry shows up as a 401
//   from the service, at which point the user logs in again.

use crate::api::auth::Session;
use crate::util::constants::SESSION_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version stamp for forward-compatibility checks.
///
/// Increment this constant whenever `SessionData` gains or removes fields
/// in a breaking way. Version mismatches silently discard the session.
pub const SESSION_VERSION: u32 = 1;

/// Complete persistent session snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    /// Schema version; must equal `SESSION_VERSION` to be accepted.
    pub version: u32,

    /// Account the token was issued to. Needed by the MFA and profile
    /// commands, which address the account by name.
    pub username: String,

    /// Bearer token issued by the service at login.
    pub token: String,
}

impl SessionData {
    pub fn new(session: &Session) -> SessionData {
        SessionData {
            version: SESSION_VERSION,
            username: session.username.clone(),
            token: session.token.clone(),
        }
    }

    pub fn into_session(self) -> Session {
        Session {
            username: self.username,
            token: self.token,
        }
    }
}

/// Resolve the session file path from the platform data directory.
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Save `data` to `path` atomically (write temp, then rename).
///
/// Creates all parent directories as needed. Returns a descriptive error
/// string; the caller decides whether to surface it (login surfaces it,
/// everything else logs and moves on).
pub fn save(data: &SessionData, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "cannot create session directory '{}': {e}",
                parent.display()
            )
        })?;
    }

    let json = serde_json::to_string_pretty(data)
        .map_err(|e| format!("failed to serialise session: {e}"))?;

    // Atomic write: write to a sibling temp file then rename. A crash
    // between write and rename loses the new session but never corrupts
    // the previous one (rename is atomic on all supported platforms).
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())
        .map_err(|e| format!("failed to write session temp file '{}': {e}", tmp.display()))?;

    std::fs::rename(&tmp, path).map_err(|e| {
        // Clean up the temp file on failure; ignore any secondary error.
        let _ = std::fs::remove_file(&tmp);
        format!("failed to finalise session file '{}': {e}", path.display())
    })?;

    tracing::debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Load and validate a `SessionData` from `path`.
///
/// Returns `None` on any error (file not found, JSON parse failure,
/// version mismatch). The caller should treat `None` as "not logged in".
pub fn load(path: &Path) -> Option<SessionData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            // Distinguish "file not found" (normal first run) from other errors.
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read session file");
            }
        })
        .ok()?;

    let data: SessionData = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Session file is malformed, treating as logged out"
            );
        })
        .ok()?;

    if data.version != SESSION_VERSION {
        tracing::warn!(
            found = data.version,
            expected = SESSION_VERSION,
            "Session file version mismatch, treating as logged out"
        );
        return None;
    }

    tracing::debug!(path = %path.display(), username = %data.username, "Session loaded");
    Some(data)
}

/// Remove the session file. Missing file is fine: logging out while
/// already logged out is a no-op.
pub fn delete(path: &Path) -> Result<(), String> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Session deleted");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!(
            "failed to delete session file '{}': {e}",
            path.display()
        )),
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_data() -> SessionData {
        SessionData {
            version: SESSION_VERSION,
            username: "admin".to_string(),
            token: "eyJhbGciOiJIUzI1NiJ9.payload.sig".to_string(),
        }
    }

    /// Save and load must round-trip all fields accurately.
    #[test]
    fn test_session_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let original = sample_data();

        save(&original, &path).expect("save should succeed");
        let loaded = load(&path).expect("load should return Some after valid save");

        assert_eq!(loaded.version, SESSION_VERSION);
        assert_eq!(loaded.username, "admin");
        assert_eq!(loaded.token, original.token);
    }

    /// Save must create missing parent directories.
    #[test]
    fn test_session_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("session.json");
        save(&sample_data(), &path).expect("save should create parents");
        assert!(load(&path).is_some());
    }

    /// Load must return None when the file does not exist (first run).
    #[test]
    fn test_session_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nonexistent.json");
        assert!(load(&path).is_none());
    }

    /// Load must return None when the JSON is malformed rather than panicking.
    #[test]
    fn test_session_load_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not valid json {{{{").unwrap();
        assert!(load(&path).is_none());
    }

    /// Load must return None when the version field is wrong.
    #[test]
    fn test_session_load_wrong_version_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut data = sample_data();
        data.version = 99;
        save(&data, &path).unwrap();
        assert!(load(&path).is_none());
    }

    /// A leftover temp file from a previous crash must not corrupt a save.
    #[test]
    fn test_session_save_atomic_does_not_corrupt_original() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        save(&sample_data(), &path).unwrap();

        // Simulate a leftover temp file (e.g. from a previous crash).
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, b"garbage").unwrap();

        let mut updated = sample_data();
        updated.username = "operator".to_string();
        save(&updated, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.username, "operator");
    }

    /// Delete must remove the file and tolerate a missing one.
    #[test]
    fn test_session_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        save(&sample_data(), &path).unwrap();
        delete(&path).expect("delete should succeed");
        assert!(load(&path).is_none());

        // Second delete: nothing left to remove, still Ok.
        delete(&path).expect("deleting a missing session is a no-op");
    }

    /// Round-tripping through the api Session type must preserve identity.
    #[test]
    fn test_session_data_conversion() {
        let session = Session {
            username: "admin".to_string(),
            token: "tok".to_string(),
        };
        let data = SessionData::new(&session);
        assert_eq!(data.version, SESSION_VERSION);
        assert_eq!(data.into_session(), session);
    }
}
