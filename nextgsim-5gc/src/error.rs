//! Errors raised while establishing a PDU session

use std::net::Ipv4Addr;

use nextgsim_common::Ipv4Block;
use nextgsim_nas::{EpcoError, IeError, PduSessionType, SmCause, SmDecodeError, SmMessageType};
use thiserror::Error;

/// Address pool errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No address follows the cursor inside the block
    #[error("Address pool {block} exhausted after {last}")]
    Exhausted {
        /// Pool block
        block: Ipv4Block,
        /// Last address handed out
        last: Ipv4Addr,
    },
    /// Initial cursor does not belong to the block
    #[error("Cursor {cursor} is outside block {block}")]
    CursorOutsideBlock {
        /// Pool block
        block: Ipv4Block,
        /// Offending cursor
        cursor: Ipv4Addr,
    },
}

/// Data network resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The DNN is listed but no descriptor is configured for it
    #[error("No data network configured for DNN {0:?}")]
    UnknownDataNetwork(String),
}

/// Malformed or unexpected signalling content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The 5GSM payload could not be decoded
    #[error("5GSM decode failed: {0}")]
    Sm(#[from] SmDecodeError),
    /// The 5GSM payload is not a PDU Session Establishment Request
    #[error("Unexpected 5GSM message type {0:?}")]
    UnexpectedMessageType(SmMessageType),
    /// The ePCO contents could not be decoded
    #[error("ePCO decode failed: {0}")]
    Epco(#[from] EpcoError),
    /// The S-NSSAI IE has a length other than 1 or 4
    #[error("Malformed S-NSSAI of {0} bytes")]
    MalformedSnssai(usize),
    /// The DNN IE is not a valid label sequence
    #[error("Malformed DNN: {0}")]
    MalformedDnn(#[from] IeError),
    /// The requested PDU session type is not an IP type
    #[error("Unsupported PDU session type {0:?}")]
    UnsupportedSessionType(PduSessionType),
    /// The PDU session identity is outside 1..=15
    #[error("Invalid PDU session identity {0}")]
    InvalidSessionId(u8),
}

/// Classification of an [`EstablishmentError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Requested data network is not configured
    Selection,
    /// Malformed signalling, wrong message type or bad ePCO
    ProtocolDecode,
    /// Address pool exhausted
    ResourceExhaustion,
    /// Data network listed but not resolvable
    Resolution,
    /// PDU session identity already held by the UE
    Conflict,
}

/// PDU session establishment failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstablishmentError {
    /// The requested DNN is not in the configured list
    #[error("Unknown DNN {0:?}")]
    UnknownDnn(String),
    /// Signalling content could not be used
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// No address could be allocated
    #[error(transparent)]
    AddressPool(#[from] PoolError),
    /// The DNN could not be resolved to a data network
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The UE already has a session with this identity
    #[error("PDU session {0} already exists")]
    SessionIdInUse(u8),
}

impl EstablishmentError {
    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            EstablishmentError::UnknownDnn(_) => ErrorKind::Selection,
            EstablishmentError::Decode(_) => ErrorKind::ProtocolDecode,
            EstablishmentError::AddressPool(_) => ErrorKind::ResourceExhaustion,
            EstablishmentError::Resolution(_) => ErrorKind::Resolution,
            EstablishmentError::SessionIdInUse(_) => ErrorKind::Conflict,
        }
    }

    /// 5GSM cause reported to the UE in a PDU Session Establishment Reject
    pub fn sm_cause(&self) -> SmCause {
        match self {
            EstablishmentError::UnknownDnn(_) | EstablishmentError::Resolution(_) => {
                SmCause::MissingOrUnknownDnn
            }
            EstablishmentError::AddressPool(_) => SmCause::InsufficientResources,
            EstablishmentError::SessionIdInUse(_) => SmCause::InvalidPduSessionIdentity,
            EstablishmentError::Decode(e) => match e {
                DecodeError::UnsupportedSessionType(_) => SmCause::UnknownPduSessionType,
                DecodeError::UnexpectedMessageType(_) => SmCause::MessageTypeNonExistent,
                DecodeError::InvalidSessionId(_) => SmCause::InvalidPduSessionIdentity,
                DecodeError::Sm(_) => SmCause::InvalidMandatoryInformation,
                DecodeError::Epco(_) | DecodeError::MalformedSnssai(_) | DecodeError::MalformedDnn(_) => {
                    SmCause::SemanticallyIncorrectMessage
                }
            },
        }
    }
}
