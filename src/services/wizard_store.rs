use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::RngCore;
use serde::Serialize;
use serde_json::Value;

use crate::wizard::{DatasetWizard, TrainingWizard};

/// A live wizard held for an API client.
#[derive(Debug)]
pub enum WizardSession {
    Dataset(DatasetWizard),
    Training(TrainingWizard),
}

impl WizardSession {
    pub fn kind(&self) -> &'static str {
        match self {
            WizardSession::Dataset(_) => "dataset",
            WizardSession::Training(_) => "training",
        }
    }

    /// JSON snapshot including the session id. Drains pending notices.
    pub fn view(&mut self, id: &str) -> Result<Value, serde_json::Error> {
        #[derive(Serialize)]
        struct Envelope<'a, V: Serialize> {
            id: &'a str,
            kind: &'static str,
            #[serde(flatten)]
            view: V,
        }
        let kind = self.kind();
        match self {
            WizardSession::Dataset(w) => serde_json::to_value(Envelope { id, kind, view: w.view() }),
            WizardSession::Training(w) => serde_json::to_value(Envelope { id, kind, view: w.view() }),
        }
    }
}

pub fn random_session_id() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex::encode(b)
}

/// In-memory wizard sessions keyed by a random id.
///
/// The lock is only ever held for synchronous wizard calls. Remote fetches
/// run after it is released, so two clients driving the same session can
/// race; the wizards' load tickets decide which response wins.
#[derive(Debug, Clone, Default)]
pub struct WizardStore {
    sessions: Arc<Mutex<HashMap<String, WizardSession>>>,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, session: WizardSession) -> String {
        let id = random_session_id();
        tracing::info!(id = %id, kind = session.kind(), "Wizard session created");
        self.sessions.lock().unwrap().insert(id.clone(), session);
        id
    }

    /// Run `f` against the session, or return `None` if it does not exist.
    pub fn with<R>(&self, id: &str, f: impl FnOnce(&mut WizardSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.get_mut(id).map(f)
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.lock().unwrap().remove(id).is_some();
        if removed {
            tracing::info!(id = %id, "Wizard session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_hex_and_distinct() {
        let a = random_session_id();
        let b = random_session_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn removed_sessions_are_gone() {
        let store = WizardStore::new();
        let id = store.create(WizardSession::Dataset(DatasetWizard::new()));
        assert_eq!(store.with(&id, |s| s.kind()), Some("dataset"));
        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(store.with(&id, |s| s.kind()).is_none());
        assert!(store.is_empty());
    }
}
