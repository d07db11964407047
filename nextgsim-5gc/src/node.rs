//! The simulated core node: subscribers plus the session service.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use nextgsim_common::{log_nas_message, CoreConfig, Direction, Error, Plmn};
use nextgsim_nas::{DlNasTransport, NasTransportError, PlainSmHeader, UlNasTransport};
use tracing::{debug, info};

use crate::codec::NasSmCodec;
use crate::context::SessionContext;
use crate::error::EstablishmentError;
use crate::establishment::create_pdu_session;
use crate::reply::{build_establishment_accept, build_establishment_reject};
use crate::service::SessionService;
use crate::ue::UeContext;

/// Simulated 5G core
#[derive(Debug)]
pub struct FiveGc {
    plmn: Plmn,
    session: SessionService,
    ues: RwLock<HashMap<String, Arc<UeContext>>>,
    codec: NasSmCodec,
}

impl FiveGc {
    /// Create a core serving `plmn` around an existing session service
    pub fn new(plmn: Plmn, session: SessionService) -> Self {
        Self {
            plmn,
            session,
            ues: RwLock::new(HashMap::new()),
            codec: NasSmCodec,
        }
    }

    /// Build a core from its configuration
    pub fn from_config(config: &CoreConfig) -> Result<Self, Error> {
        let session = SessionService::from_config(config)?;
        info!(
            plmn = %config.plmn,
            dnns = ?config.dnn_list,
            pool = %config.ue_address_pool.subnet,
            "5GC session management ready"
        );
        Ok(Self::new(config.plmn, session))
    }

    /// Serving PLMN
    pub fn plmn(&self) -> Plmn {
        self.plmn
    }

    /// Session service
    pub fn session_service(&self) -> &SessionService {
        &self.session
    }

    /// Register a UE, replacing any previous context with the same SUPI
    pub fn add_ue(&self, ue: UeContext) -> Arc<UeContext> {
        let ue = Arc::new(ue);
        let previous = self
            .ues
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ue.supi().to_string(), Arc::clone(&ue));
        if previous.is_some() {
            debug!(supi = ue.supi(), "replaced UE context");
        }
        ue
    }

    /// Look up a UE by SUPI
    pub fn ue(&self, supi: &str) -> Option<Arc<UeContext>> {
        self.ues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(supi)
            .cloned()
    }

    /// Deregister a UE. Its sessions go with it; their addresses stay consumed.
    pub fn remove_ue(&self, supi: &str) -> Option<Arc<UeContext>> {
        self.ues
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(supi)
    }

    /// Number of registered UEs
    pub fn ue_count(&self) -> usize {
        self.ues.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Establish PDU session `psi` for `ue` from a decoded UL NAS Transport
    pub fn establish_pdu_session(
        &self,
        ue: &UeContext,
        transport: &UlNasTransport,
        psi: u8,
    ) -> Result<Arc<SessionContext>, EstablishmentError> {
        create_pdu_session(&self.codec, transport, ue, &self.session, psi)
    }

    /// Handle an encoded UL NAS Transport carrying a PDU Session
    /// Establishment Request and produce the DL NAS Transport answering it.
    ///
    /// Only a malformed 5GMM envelope is an error. Every establishment
    /// failure is answered with a PDU Session Establishment Reject.
    pub fn handle_ul_nas_transport(
        &self,
        ue: &UeContext,
        nas_pdu: &[u8],
    ) -> Result<DlNasTransport, NasTransportError> {
        log_nas_message(Direction::Rx, "UL NAS Transport", nas_pdu);
        let transport = UlNasTransport::decode_message(nas_pdu)?;

        let header = PlainSmHeader::decode(&mut transport.payload_container.as_slice()).ok();
        let psi = transport
            .pdu_session_id
            .or(header.map(|h| h.pdu_session_id))
            .unwrap_or_default();
        let pti = header.map(|h| h.pti).unwrap_or_default();

        let sm_message = match self.establish_pdu_session(ue, &transport, psi) {
            Ok(ctx) => build_establishment_accept(&ctx).to_bytes(),
            Err(e) => build_establishment_reject(psi, pti, &e).to_bytes(),
        };

        let reply = DlNasTransport::n1_sm(psi, sm_message);
        let mut encoded = Vec::new();
        reply.encode(&mut encoded);
        log_nas_message(Direction::Tx, "DL NAS Transport", &encoded);
        Ok(reply)
    }
}
