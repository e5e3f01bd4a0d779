use std::collections::BTreeMap;
use std::sync::Arc;

use gai_core::config::Config;
use gai_core::inbox::RelayInbox;
use gai_core::store::{MemoryStore, RecordStore};
use gai_core::{GaiError, RecordKind};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub system_name: Arc<str>,
    pub peer_name: Arc<str>,
    pub api_key: Arc<str>,
    inboxes: Arc<BTreeMap<RecordKind, Arc<RelayInbox>>>,
}

impl AppState {
    /// One in-memory store per record kind, all accepting `api_key`.
    pub fn new(
        system_name: impl Into<String>,
        peer_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let peer_name: String = peer_name.into();
        let inboxes = RecordKind::all()
            .iter()
            .map(|&kind| {
                let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
                (kind, Arc::new(RelayInbox::new(kind, &peer_name, store)))
            })
            .collect();
        Self {
            system_name: Arc::from(system_name.into()),
            peer_name: Arc::from(peer_name),
            api_key: Arc::from(api_key.into()),
            inboxes: Arc::new(inboxes),
        }
    }

    pub fn from_config(config: &Config) -> gai_core::Result<Self> {
        let key = config.require_inbound_key()?;
        Ok(Self::new(&config.system_name, &config.peer.name, key))
    }

    /// Replace the store backing `kind`. The kind keeps its id generator.
    pub fn with_store(mut self, kind: RecordKind, store: Arc<dyn RecordStore>) -> Self {
        let mut inboxes = (*self.inboxes).clone();
        let inbox = match inboxes.get(&kind) {
            Some(existing) => existing.with_store(store),
            None => RelayInbox::new(kind, self.peer_name.as_ref(), store),
        };
        inboxes.insert(kind, Arc::new(inbox));
        self.inboxes = Arc::new(inboxes);
        self
    }

    pub fn inbox(&self, kind: RecordKind) -> gai_core::Result<&Arc<RelayInbox>> {
        self.inboxes
            .get(&kind)
            .ok_or_else(|| GaiError::UnknownKind(kind.to_string()))
    }
}
