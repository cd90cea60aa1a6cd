//! Best-effort cache of the last values entered on the calculator forms
//!
//! The cache is advisory. It pre-fills the form on the next visit and is never
//! consulted for correctness: read failures yield an empty record, write
//! failures are dropped. Storage is injected through [`KeyValueStore`].

use crate::errors::StoreError;
use crate::health_metrics::Sex;
use crate::units::{HeightUnit, UnitSystem, WeightUnit};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Fixed key the last inputs live under
pub const DEFAULT_LAST_INPUTS_KEY: &str = "bmi:last";

// ============================================================================
// Storage Interface
// ============================================================================

/// A string-keyed store of opaque blobs
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file mapping keys to blobs
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // a corrupt file is replaced rather than blocking every later write
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StoreError::Serialization(e)) => {
                debug!(path = %self.path.display(), error = %e, "Replacing corrupt store file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

// ============================================================================
// Last Inputs Record
// ============================================================================

/// Last raw values entered on either form; `None` means unset
///
/// `units` is the BMI form's toggle, `weight_unit`/`height_unit` the energy
/// form's. The measurements are shared by both forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<WeightUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_unit: Option<HeightUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ft: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
}

fn field<T: DeserializeOwned>(object: &serde_json::Map<String, serde_json::Value>, name: &str) -> Option<T> {
    object
        .get(name)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

impl LastInputs {
    /// Parse a stored blob field by field
    ///
    /// A field that is missing or has an unexpected shape (an empty string for
    /// a cleared number, an unknown unit system) is left unset; the rest of the
    /// record still loads. Anything that is not a JSON object yields an empty
    /// record.
    pub fn from_blob(blob: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(blob) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Discarding unparseable last-inputs blob");
                return Self::default();
            }
        };
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        Self {
            units: field(object, "units"),
            weight_unit: field(object, "weight_unit"),
            height_unit: field(object, "height_unit"),
            kg: field(object, "kg"),
            cm: field(object, "cm"),
            lbs: field(object, "lbs"),
            ft: field(object, "ft"),
            inch: field(object, "inch"),
            sex: field(object, "sex"),
            age: field(object, "age"),
        }
    }

    pub fn to_blob(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Cache
// ============================================================================

/// The last-inputs record stored under one fixed key
#[derive(Debug)]
pub struct LastInputsCache<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> LastInputsCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_LAST_INPUTS_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the record; any failure gives an empty record
    pub fn load(&self) -> LastInputs {
        match self.store.get(&self.key) {
            Ok(Some(blob)) => LastInputs::from_blob(&blob),
            Ok(None) => LastInputs::default(),
            Err(e) => {
                debug!(key = %self.key, error = %e, "Failed to read last inputs");
                LastInputs::default()
            }
        }
    }

    /// Overwrite the record; failures are logged and dropped
    pub fn save(&self, inputs: &LastInputs) {
        let result = inputs
            .to_blob()
            .and_then(|blob| self.store.set(&self.key, &blob));
        if let Err(e) = result {
            debug!(key = %self.key, error = %e, "Failed to write last inputs");
        }
    }

    /// Apply one form's change to the stored record and save it
    ///
    /// Fields the change leaves alone keep their stored value.
    pub fn update(&self, change: impl FnOnce(&mut LastInputs)) {
        let mut record = self.load();
        change(&mut record);
        self.save(&record);
    }
}
