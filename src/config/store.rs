//! Calibration persistence.
//!
//! The control core keeps a single [`CalibrationRecord`] under
//! [`CALIBRATION_KEY`]. A missing record, a wrong marker or an invalid
//! calibration all read as "absent" and are replaced by defaults.

use heapless::{FnvIndexMap, String};

use crate::error::StoreError;

use super::calibration::{Calibration, CalibrationRecord};

/// Key under which the calibration record is stored.
pub const CALIBRATION_KEY: &str = "calibration";

/// Typed key-value store for calibration records.
///
/// Writes are synchronous and assumed atomic enough; no partial-write
/// recovery beyond the record marker.
pub trait ConfigStore {
    /// Fetch the record stored under `key`, if any.
    fn get(&mut self, key: &str) -> Option<CalibrationRecord>;

    /// Store `record` under `key`.
    fn put(&mut self, key: &str, record: &CalibrationRecord) -> Result<(), StoreError>;
}

/// How [`load_calibration`] obtained its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// An intact record was found.
    Loaded,
    /// No intact record; defaults were written back.
    DefaultsWritten,
    /// No intact record and writing defaults failed; defaults are used anyway.
    DefaultsUnsaved,
}

/// Load the calibration, writing `defaults` back when the stored record is
/// absent or corrupt. Never fails.
pub fn load_calibration<S: ConfigStore>(
    store: &mut S,
    defaults: &Calibration,
) -> (Calibration, LoadOutcome) {
    match store.get(CALIBRATION_KEY) {
        Some(record) if record.is_intact() => {
            info!("calibration loaded");
            let mut calibration = record.calibration;
            if calibration.clamp_to_bounds() {
                warn!("stored calibration out of range, clamped");
                let _ = persist_calibration(store, &calibration);
            }
            (calibration, LoadOutcome::Loaded)
        }
        _ => {
            warn!("calibration missing or corrupt, writing defaults");
            match persist_calibration(store, defaults) {
                Ok(()) => (*defaults, LoadOutcome::DefaultsWritten),
                Err(_) => (*defaults, LoadOutcome::DefaultsUnsaved),
            }
        }
    }
}

/// Persist a calibration under [`CALIBRATION_KEY`].
pub fn persist_calibration<S: ConfigStore>(
    store: &mut S,
    calibration: &Calibration,
) -> Result<(), StoreError> {
    let result = store.put(CALIBRATION_KEY, &CalibrationRecord::new(*calibration));
    if result.is_err() {
        warn!("calibration write failed");
    }
    result
}

/// In-memory store, usable without `std`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: FnvIndexMap<String<16>, CalibrationRecord, 4>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&mut self, key: &str) -> Option<CalibrationRecord> {
        self.records
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| *v)
    }

    fn put(&mut self, key: &str, record: &CalibrationRecord) -> Result<(), StoreError> {
        let full = || StoreError::WriteFailed(String::try_from("store full").unwrap_or_default());
        let key: String<16> = String::try_from(key).map_err(|_| full())?;
        self.records.insert(key, *record).map_err(|_| full())?;
        Ok(())
    }
}

#[cfg(feature = "std")]
pub use file::TomlFileStore;

#[cfg(feature = "std")]
mod file {
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{CalibrationRecord, ConfigStore, StoreError};

    /// Store backed by a TOML file, one table per key.
    #[derive(Debug, Clone)]
    pub struct TomlFileStore {
        path: PathBuf,
    }

    impl TomlFileStore {
        /// Use the file at `path`. It need not exist yet.
        pub fn new<P: AsRef<Path>>(path: P) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        fn read_all(&self) -> BTreeMap<std::string::String, CalibrationRecord> {
            fs::read_to_string(&self.path)
                .ok()
                .and_then(|content| toml::from_str(&content).ok())
                .unwrap_or_default()
        }
    }

    fn write_failed(msg: &str) -> StoreError {
        let mut short = heapless::String::new();
        for c in msg.chars() {
            if short.push(c).is_err() {
                break;
            }
        }
        StoreError::WriteFailed(short)
    }

    impl ConfigStore for TomlFileStore {
        fn get(&mut self, key: &str) -> Option<CalibrationRecord> {
            self.read_all().remove(key)
        }

        fn put(&mut self, key: &str, record: &CalibrationRecord) -> Result<(), StoreError> {
            let mut records = self.read_all();
            records.insert(key.into(), *record);
            let content = toml::to_string(&records).map_err(|e| write_failed(&e.to_string()))?;

            // Write beside the target and rename so a torn write leaves the
            // previous file intact.
            let tmp = self.path.with_extension("tmp");
            fs::write(&tmp, content).map_err(|e| write_failed(&e.to_string()))?;
            fs::rename(&tmp, &self.path).map_err(|e| write_failed(&e.to_string()))
        }
    }
}
