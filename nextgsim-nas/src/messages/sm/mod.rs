//! NAS 5GSM (Session Management) Messages
//!
//! PDU Session Establishment messages live in [`pdu_session_establishment`];
//! [`decode_sm_message`] dispatches a plain 5GSM PDU on its header.

pub mod pdu_session_establishment;

pub use pdu_session_establishment::*;

use thiserror::Error;

use crate::enums::SmMessageType;
use crate::header::{HeaderError, PlainSmHeader};

/// Error returned by [`decode_sm_message`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmDecodeError {
    /// The plain 5GSM header could not be decoded
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),
    /// The message body could not be decoded
    #[error("Body error: {0}")]
    Body(#[from] PduSessionEstablishmentError),
}

/// A decoded plain 5GSM message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmMessage {
    /// PDU Session Establishment Request
    EstablishmentRequest(PduSessionEstablishmentRequest),
    /// PDU Session Establishment Accept
    EstablishmentAccept(PduSessionEstablishmentAccept),
    /// PDU Session Establishment Reject
    EstablishmentReject(PduSessionEstablishmentReject),
    /// Any other valid 5GSM message type; the body is not decoded
    Other {
        /// Decoded header
        header: PlainSmHeader,
    },
}

impl SmMessage {
    /// The 5GSM message type
    pub fn message_type(&self) -> SmMessageType {
        match self {
            SmMessage::EstablishmentRequest(_) => SmMessageType::PduSessionEstablishmentRequest,
            SmMessage::EstablishmentAccept(_) => SmMessageType::PduSessionEstablishmentAccept,
            SmMessage::EstablishmentReject(_) => SmMessageType::PduSessionEstablishmentReject,
            SmMessage::Other { header } => header.message_type,
        }
    }
}

/// Decode a plain 5GSM message (header included)
pub fn decode_sm_message(data: &[u8]) -> Result<SmMessage, SmDecodeError> {
    let mut buf = data;
    let header = PlainSmHeader::decode(&mut buf)?;
    let (psi, pti) = (header.pdu_session_id, header.pti);

    let msg = match header.message_type {
        SmMessageType::PduSessionEstablishmentRequest => SmMessage::EstablishmentRequest(
            PduSessionEstablishmentRequest::decode(&mut buf, psi, pti)?,
        ),
        SmMessageType::PduSessionEstablishmentAccept => SmMessage::EstablishmentAccept(
            PduSessionEstablishmentAccept::decode(&mut buf, psi, pti)?,
        ),
        SmMessageType::PduSessionEstablishmentReject => SmMessage::EstablishmentReject(
            PduSessionEstablishmentReject::decode(&mut buf, psi, pti)?,
        ),
        _ => SmMessage::Other { header },
    };
    Ok(msg)
}
