//! Single source of truth for the animation config
//!
//! The whole record sits behind one critical-section mutex that is held only
//! while a snapshot is cloned or a merged config is swapped in. Readers never
//! see a half-applied update.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use log::{info, warn};

use crate::config::STORAGE;
use crate::domain::dto::{ConfigDto, ConfigPatch};
use crate::domain::entity::Config;
use crate::domain::ports::ConfigStorage;

pub struct ConfigStore {
    config: Mutex<CriticalSectionRawMutex, RefCell<Config>>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            config: Mutex::new(RefCell::new(config)),
        }
    }

    /// Build the store from persisted state, falling back to defaults
    pub fn load(storage: &mut impl ConfigStorage) -> Self {
        let defaults = Config::default();
        let config = match storage.load() {
            Ok(document) => match ConfigPatch::from_json(&document) {
                Some(patch) => {
                    info!("config: loaded {}", STORAGE.file_name);
                    defaults.apply(&patch)
                }
                None => {
                    warn!("config: {} is not a JSON object, using defaults", STORAGE.file_name);
                    defaults
                }
            },
            Err(err) => {
                info!("config: no persisted state ({:?}), using defaults", err);
                defaults
            }
        };
        Self::new(config)
    }

    /// Copy of the current config
    pub fn snapshot(&self) -> Config {
        self.config.lock(|config| config.borrow().clone())
    }

    /// Merge a validated patch and return the stored result
    pub fn update(&self, patch: &ConfigPatch) -> Config {
        self.config.lock(|config| {
            let next = config.borrow().apply(patch);
            *config.borrow_mut() = next.clone();
            next
        })
    }

    /// Write the current snapshot to `storage` and return it.
    ///
    /// Storage failures are logged and otherwise ignored.
    pub fn persist(&self, storage: &mut impl ConfigStorage) -> Config {
        let snapshot = self.snapshot();
        match serde_json::to_vec(&ConfigDto::from(&snapshot)) {
            Ok(document) => match storage.save(&document) {
                Ok(()) => info!("config: saved {}", STORAGE.file_name),
                Err(err) => warn!("config: failed to save {}: {:?}", STORAGE.file_name, err),
            },
            Err(_) => warn!("config: failed to serialize snapshot"),
        }
        snapshot
    }
}
