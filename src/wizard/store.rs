//! Persisted flow store abstraction.
//!
//! Provides a trait over the cross-session flow record so that:
//! - the controller never touches the filesystem directly
//! - tests can observe every write and clear

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::StoreError;
use super::state::{FlowState, FlowStatePatch};

/// File name of the persisted record inside the state directory
pub const FLOW_STATE_FILE: &str = "assign_card.json";

/// Key-value store holding the in-progress flow record
pub trait FlowStateStore: Send + Sync {
    /// Current record, `None` when no flow is in progress
    fn read(&self) -> Result<Option<FlowState>, StoreError>;

    /// Merge `patch` into the record, creating it on first write
    fn write(&self, patch: FlowStatePatch) -> Result<(), StoreError>;

    /// Destroy the record. Clearing an absent record succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Flow record persisted as JSON on disk
#[derive(Debug, Clone)]
pub struct FileFlowStore {
    path: PathBuf,
}

impl FileFlowStore {
    /// Store the record as `assign_card.json` under `state_dir`
    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(FLOW_STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FlowStateStore for FileFlowStore {
    fn read(&self) -> Result<Option<FlowState>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&self, patch: FlowStatePatch) -> Result<(), StoreError> {
        let mut state = self.read()?.unwrap_or_default();
        state.apply(patch);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let contents = serde_json::to_string_pretty(&state)?;
        fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// In-memory flow record that also records every mutation
#[derive(Debug, Default)]
pub struct MemoryFlowStore {
    state: Mutex<Option<FlowState>>,
    writes: Mutex<Vec<FlowStatePatch>>,
    clears: Mutex<usize>,
}

impl MemoryFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing record, as if left behind by an earlier mount
    pub fn with_state(state: FlowState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// Every patch written so far, oldest first
    pub fn writes(&self) -> Vec<FlowStatePatch> {
        lock(&self.writes).clone()
    }

    pub fn clear_count(&self) -> usize {
        *lock(&self.clears)
    }
}

impl FlowStateStore for MemoryFlowStore {
    fn read(&self) -> Result<Option<FlowState>, StoreError> {
        Ok(lock(&self.state).clone())
    }

    fn write(&self, patch: FlowStatePatch) -> Result<(), StoreError> {
        lock(&self.state)
            .get_or_insert_with(FlowState::default)
            .apply(patch.clone());
        lock(&self.writes).push(patch);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *lock(&self.state) = None;
        *lock(&self.clears) += 1;
        Ok(())
    }
}
