//! PDU session establishment procedure
//!
//! Turns a UL NAS Transport carrying a PDU Session Establishment Request into
//! a registered [`SessionContext`]. Resolution order:
//!
//! 1. slice: the S-NSSAI of the transport, else the UE's default slice
//! 2. DNN: the DNN of the transport (must be configured), else the first configured DNN
//! 3. data network: resolved from the DNN
//! 4. location: a copy of the UE's current location
//! 5. request: PTI and PDU session type (IPv4 when absent)
//! 6. policy: the first session rule, default QFI 1
//! 7. address: next address from the pool
//! 8. ePCO: requested options, unknown containers ignored
//!
//! Any failure before step 7 consumes nothing. A failure after it (a bad ePCO,
//! or losing a registration race) leaves the pool cursor advanced.

use std::sync::Arc;

use nextgsim_common::{HexDump, SNssai};
use nextgsim_nas::{PduSessionType, SmMessage, UlNasTransport};
use tracing::{debug, info, trace, warn};

use crate::codec::SmCodec;
use crate::context::{SessionContext, SessionType};
use crate::error::{DecodeError, EstablishmentError};
use crate::service::SessionService;
use crate::ue::UeContext;

/// QFI of the default QoS flow of every session
pub const DEFAULT_QFI: u8 = 1;

/// Highest PDU session identity (TS 24.007 11.2.3.1b)
const MAX_PSI: u8 = 15;

/// Run the establishment procedure for PDU session `psi` of `ue`.
pub fn create_pdu_session<C: SmCodec + ?Sized>(
    codec: &C,
    transport: &UlNasTransport,
    ue: &UeContext,
    service: &SessionService,
    psi: u8,
) -> Result<Arc<SessionContext>, EstablishmentError> {
    match establish(codec, transport, ue, service, psi) {
        Ok(ctx) => {
            info!(
                supi = ue.supi(),
                psi,
                addr = ?ctx.pdu_address(),
                snssai = %ctx.snssai(),
                "PDU session established"
            );
            Ok(ctx)
        }
        Err(e) => {
            warn!(supi = ue.supi(), psi, kind = ?e.kind(), "PDU session establishment failed: {e}");
            if matches!(e, EstablishmentError::Decode(_)) {
                trace!(payload = %HexDump(&transport.payload_container), "rejected 5GSM payload");
            }
            Err(e)
        }
    }
}

fn establish<C: SmCodec + ?Sized>(
    codec: &C,
    transport: &UlNasTransport,
    ue: &UeContext,
    service: &SessionService,
    psi: u8,
) -> Result<Arc<SessionContext>, EstablishmentError> {
    if psi == 0 || psi > MAX_PSI {
        return Err(DecodeError::InvalidSessionId(psi).into());
    }
    if ue.session(psi).is_some() {
        return Err(EstablishmentError::SessionIdInUse(psi));
    }

    let snssai = match transport.s_nssai.as_deref() {
        Some(bytes) => SNssai::decode(bytes).ok_or(DecodeError::MalformedSnssai(bytes.len()))?,
        None => ue.default_snssai(),
    };
    debug!(psi, %snssai, "slice selected");

    let dnn = match transport.dnn.as_ref() {
        Some(ie) => {
            let dnn = ie.to_dnn_string().map_err(DecodeError::from)?;
            if !service.is_configured_dnn(&dnn) {
                return Err(EstablishmentError::UnknownDnn(dnn));
            }
            dnn
        }
        None => service.default_dnn().to_string(),
    };
    debug!(psi, dnn = %dnn, "DNN selected");

    let mut ctx = SessionContext::new(psi);
    ctx.set_snssai(snssai);
    ctx.set_data_network(service.resolve(&dnn)?);
    ctx.set_user_location(ue.location_snapshot());

    let request = match codec.decode_sm(&transport.payload_container)? {
        SmMessage::EstablishmentRequest(request) => request,
        other => return Err(DecodeError::UnexpectedMessageType(other.message_type()).into()),
    };
    let session_type =
        SessionType::try_from(request.pdu_session_type.unwrap_or(PduSessionType::Ipv4))?;
    ctx.set_pti(request.pti);
    ctx.set_session_type(session_type);
    ctx.set_session_rule(Arc::clone(service.first_rule()));
    ctx.set_default_qfi(DEFAULT_QFI);

    let addr = service.address_pool().next()?;
    ctx.set_pdu_address(addr);

    if let Some(epco) = request.extended_protocol_configuration_options.as_deref() {
        for container in codec.decode_epco(epco)? {
            if !ctx.protocol_options_mut().mark(container.id) {
                debug!(psi, id = container.id, "ignoring ePCO container");
            }
        }
    }

    let ctx = Arc::new(ctx);
    ue.add_session(Arc::clone(&ctx))?;
    Ok(ctx)
}
