//! Versioned save documents.
//!
//! A save is `{"version": N, "state": {...}}`. Documents written by a newer
//! engine are refused rather than half-read.
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::constants::SAVE_VERSION;
use crate::state::GameState;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save document is empty")]
    Empty,
    #[error("save document is malformed: {0}")]
    Malformed(String),
    #[error("save document has no version")]
    MissingVersion,
    #[error("save was written by a newer version ({found} > {supported})")]
    NewerVersion { found: u64, supported: u32 },
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SaveDocument<'a> {
    version: u32,
    state: &'a GameState,
}

/// Serialize a state into a versioned document.
///
/// # Errors
///
/// Returns [`PersistenceError::Encode`] if serialization fails.
pub fn save_state(state: &GameState) -> Result<String, PersistenceError> {
    let document = SaveDocument {
        version: SAVE_VERSION,
        state,
    };
    Ok(serde_json::to_string(&document)?)
}

/// Parse a versioned document back into a state.
///
/// Missing state fields take their defaults.
///
/// # Errors
///
/// Empty, malformed, unversioned and newer-version documents are rejected.
pub fn load_state(raw: &str) -> Result<GameState, PersistenceError> {
    if raw.trim().is_empty() {
        return Err(PersistenceError::Empty);
    }
    let document: Value =
        serde_json::from_str(raw).map_err(|err| PersistenceError::Malformed(err.to_string()))?;
    let Value::Object(mut fields) = document else {
        return Err(PersistenceError::Malformed("expected a JSON object".into()));
    };
    let version = match fields.get("version") {
        None | Some(Value::Null) => return Err(PersistenceError::MissingVersion),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| PersistenceError::Malformed(format!("bad version {value}")))?,
    };
    if version > u64::from(SAVE_VERSION) {
        return Err(PersistenceError::NewerVersion {
            found: version,
            supported: SAVE_VERSION,
        });
    }
    let state = fields
        .remove("state")
        .ok_or_else(|| PersistenceError::Malformed("missing 'state'".into()))?;
    let mut state: GameState = serde_json::from_value(state)
        .map_err(|err| PersistenceError::Malformed(err.to_string()))?;
    if version < u64::from(SAVE_VERSION) {
        log::info!("upgrading save from version {version} to {SAVE_VERSION}");
    }
    state.version = SAVE_VERSION;
    Ok(state)
}
