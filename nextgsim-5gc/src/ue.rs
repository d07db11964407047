//! UE context held by the core

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use nextgsim_common::{NrLocation, SNssai};

use crate::context::SessionContext;
use crate::error::EstablishmentError;

/// A registered UE and its PDU sessions
#[derive(Debug)]
pub struct UeContext {
    supi: String,
    default_snssai: SNssai,
    location: RwLock<NrLocation>,
    sessions: RwLock<HashMap<u8, Arc<SessionContext>>>,
}

impl UeContext {
    /// Create a UE context with no sessions
    pub fn new(supi: impl Into<String>, default_snssai: SNssai, location: NrLocation) -> Self {
        Self {
            supi: supi.into(),
            default_snssai,
            location: RwLock::new(location),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Subscription permanent identifier
    pub fn supi(&self) -> &str {
        &self.supi
    }

    /// Slice used when a request does not name one
    pub fn default_snssai(&self) -> SNssai {
        self.default_snssai
    }

    /// Copy of the current location
    pub fn location_snapshot(&self) -> NrLocation {
        self.location.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the current location
    pub fn update_location(&self, location: NrLocation) {
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = location;
    }

    /// Register a session. Fails if the PDU session identity is taken.
    pub fn add_session(&self, session: Arc<SessionContext>) -> Result<(), EstablishmentError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let psi = session.session_id();
        if sessions.contains_key(&psi) {
            return Err(EstablishmentError::SessionIdInUse(psi));
        }
        sessions.insert(psi, session);
        Ok(())
    }

    /// Look up a session
    pub fn session(&self, psi: u8) -> Option<Arc<SessionContext>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&psi)
            .cloned()
    }

    /// Identities of all sessions, ascending
    pub fn session_ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Release a session. Its address is not returned to the pool.
    pub fn remove_session(&self, psi: u8) -> Option<Arc<SessionContext>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&psi)
    }

    /// Number of sessions
    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
