//! Outcome recording and key/value persistence
//!
//! Recorders observe [`GameEvent`]s and keep their own counters. They never feed
//! anything back into the simulation. Storage is LocalStorage in the browser and
//! an in-memory map natively.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RecordError;
use crate::sim::GameEvent;

/// Receives every outcome the engine produces
pub trait OutcomeRecorder {
    fn record(&mut self, event: &GameEvent) -> Result<(), RecordError>;

    /// Persist anything buffered
    fn flush(&mut self) -> Result<(), RecordError> {
        Ok(())
    }
}

/// Lets the host keep a handle on a recorder the engine also owns
impl<R: OutcomeRecorder> OutcomeRecorder for Rc<RefCell<R>> {
    fn record(&mut self, event: &GameEvent) -> Result<(), RecordError> {
        self.borrow_mut().record(event)
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        self.borrow_mut().flush()
    }
}

/// String key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, RecordError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), RecordError>;
}

/// Volatile store (native runs, tests)
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, RecordError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RecordError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::KeyValueStore;
    use crate::error::RecordError;

    /// Browser LocalStorage
    pub struct LocalStore {
        storage: web_sys::Storage,
    }

    impl LocalStore {
        pub fn open() -> Result<Self, RecordError> {
            let storage = web_sys::window()
                .ok_or_else(|| RecordError::Storage("no window".into()))?
                .local_storage()
                .map_err(|e| RecordError::Storage(format!("{e:?}")))?
                .ok_or_else(|| RecordError::Storage("localStorage disabled".into()))?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>, RecordError> {
            self.storage
                .get_item(key)
                .map_err(|e| RecordError::Storage(format!("{e:?}")))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), RecordError> {
            self.storage
                .set_item(key, value)
                .map_err(|e| RecordError::Storage(format!("{e:?}")))
        }
    }
}

/// The platform's persistent store, falling back to memory if it is unavailable
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("LocalStorage unavailable ({e}), using memory store");
            Box::new(MemoryStore::default())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(MemoryStore::default())
}

/// Load a JSON document, falling back to the default on a missing or corrupt entry
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => {
                log::info!("Loaded {}", key);
                value
            }
            Err(e) => {
                log::warn!("Discarding corrupt {}: {}", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Could not read {}: {}", key, e);
            T::default()
        }
    }
}

pub fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), RecordError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// A persisted tally updated from game events
pub trait Tally: Serialize + DeserializeOwned + Default {
    const STORAGE_KEY: &'static str;

    fn apply(&mut self, event: &GameEvent);
}

/// Keeps a [`Tally`] in a store, saving at level and session boundaries
pub struct StoredRecorder<T: Tally> {
    data: T,
    store: Box<dyn KeyValueStore>,
    dirty: bool,
}

impl<T: Tally> StoredRecorder<T> {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let data = load_json(store.as_ref(), T::STORAGE_KEY);
        Self {
            data,
            store,
            dirty: false,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T: Tally> OutcomeRecorder for StoredRecorder<T> {
    fn record(&mut self, event: &GameEvent) -> Result<(), RecordError> {
        self.data.apply(event);
        self.dirty = true;
        if matches!(event, GameEvent::LevelComplete { .. } | GameEvent::GameOver { .. }) {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        if !self.dirty {
            return Ok(());
        }
        save_json(self.store.as_mut(), T::STORAGE_KEY, &self.data)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        events: u32,
    }

    impl Tally for Counter {
        const STORAGE_KEY: &'static str = "test_counter";

        fn apply(&mut self, _event: &GameEvent) {
            self.events += 1;
        }
    }

    #[test]
    fn test_corrupt_entry_falls_back_to_default() {
        let mut store = MemoryStore::default();
        store.set("test_counter", "{not json").unwrap();
        let counter: Counter = load_json(&store, "test_counter");
        assert_eq!(counter, Counter::default());
    }

    #[test]
    fn test_recorder_saves_on_session_boundary() {
        let mut recorder = StoredRecorder::<Counter>::load(Box::new(MemoryStore::default()));
        recorder.record(&GameEvent::PowerUpExpired).unwrap();
        assert!(recorder.dirty);
        recorder.record(&GameEvent::GameOver { score: 10, level: 1 }).unwrap();
        assert!(!recorder.dirty);

        let saved: Counter = load_json(recorder.store.as_ref(), Counter::STORAGE_KEY);
        assert_eq!(saved.events, 2);
    }

    #[test]
    fn test_shared_handle_records() {
        let shared = Rc::new(RefCell::new(StoredRecorder::<Counter>::load(Box::new(MemoryStore::default()))));
        let mut handle: Box<dyn OutcomeRecorder> = Box::new(Rc::clone(&shared));
        handle.record(&GameEvent::PowerUpExpired).unwrap();
        assert_eq!(shared.borrow().data().events, 1);
    }
}
