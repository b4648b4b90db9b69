//! In-memory practice data slots.
//!
//! Clones share the same slots, so a test can hand one clone to an engine,
//! drop the engine to simulate a crash, and open a second engine on another
//! clone. Data is stored serialized so loads go through the same serde path
//! as files do.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use super::PracticeStore;
use crate::error::{PracticeError, Result};
use crate::types::{ActiveSession, PracticeData};

#[derive(Debug, Default)]
struct Slots {
    data: Option<String>,
    active: Option<String>,
    fail_data_saves: bool,
    data_saves: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<Slots>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the main slot with raw content, e.g. a corrupt blob.
    pub fn with_raw_data(raw: &str) -> Self {
        let store = Self::default();
        store.slots.borrow_mut().data = Some(raw.to_string());
        store
    }

    /// Makes subsequent `save_data` calls fail until reset.
    pub fn fail_data_saves(&self, fail: bool) {
        self.slots.borrow_mut().fail_data_saves = fail;
    }

    /// Number of successful `save_data` calls so far.
    pub fn data_save_count(&self) -> usize {
        self.slots.borrow().data_saves
    }

    /// Current shadow slot content.
    pub fn active(&self) -> Option<ActiveSession> {
        self.load_active().ok().flatten()
    }
}

impl PracticeStore for MemoryStore {
    fn load_data(&self) -> Result<PracticeData> {
        let slots = self.slots.borrow();
        let Some(raw) = slots.data.as_deref() else {
            return Ok(PracticeData::default());
        };
        serde_json::from_str(raw).map_err(|e| PracticeError::CorruptDurableState {
            path: "memory:data".into(),
            details: e.to_string(),
        })
    }

    fn save_data(&mut self, data: &PracticeData) -> Result<()> {
        let mut slots = self.slots.borrow_mut();
        if slots.fail_data_saves {
            return Err(PracticeError::Io {
                context: "writing practice data".to_string(),
                source: io::Error::new(io::ErrorKind::Other, "injected write failure"),
            });
        }
        let raw = serde_json::to_string(data).map_err(|e| PracticeError::Json {
            context: "serializing practice data".to_string(),
            source: e,
        })?;
        slots.data = Some(raw);
        slots.data_saves += 1;
        Ok(())
    }

    fn load_active(&self) -> Result<Option<ActiveSession>> {
        let slots = self.slots.borrow();
        let Some(raw) = slots.active.as_deref() else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| PracticeError::CorruptDurableState {
                path: "memory:active".into(),
                details: e.to_string(),
            })
    }

    fn save_active(&mut self, session: Option<&ActiveSession>) -> Result<()> {
        let raw = session
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| PracticeError::Json {
                context: "serializing active session".to_string(),
                source: e,
            })?;
        self.slots.borrow_mut().active = raw;
        Ok(())
    }
}
