//! NAS (Non-Access Stratum) protocol library
//!
//! Implements the 5G NAS messages a core needs to run PDU session
//! establishment, as defined in 3GPP TS 24.501:
//!
//! - UL/DL NAS Transport (5GMM envelope of a 5GSM payload)
//! - PDU Session Establishment Request/Accept/Reject (5GSM)
//! - Extended Protocol Configuration Options (ePCO) contents
//!
//! # Example
//!
//! ```rust
//! use nextgsim_nas::{decode_sm_message, PduSessionEstablishmentRequest, PduSessionType, SmMessage};
//!
//! let mut req = PduSessionEstablishmentRequest::new(1, 1);
//! req.pdu_session_type = Some(PduSessionType::Ipv4);
//!
//! let mut buf = Vec::new();
//! req.encode(&mut buf);
//!
//! let decoded = decode_sm_message(&buf).unwrap();
//! assert!(matches!(decoded, SmMessage::EstablishmentRequest(_)));
//! ```

pub mod enums;
pub mod epco;
pub mod header;
pub mod ies;
pub mod messages;

pub use enums::{ExtendedProtocolDiscriminator, MmMessageType, SecurityHeaderType, SmMessageType};
pub use epco::{EpcoError, ExtendedProtocolConfigurationOptions, ProtocolContainer};
pub use header::{HeaderError, PlainMmHeader, PlainSmHeader};
pub use ies::{
    IeDnn, IeError, IeIntegrityProtectionMaxDataRate, IePduAddress, IeQosFlowDescriptions,
    IeQosRules, IeSessionAmbr, MaxDataRate, PayloadContainerType, PduSessionType, RequestType,
    SmCause, SscMode,
};
pub use messages::{
    decode_sm_message, DlNasTransport, NasTransportError, PduSessionEstablishmentAccept,
    PduSessionEstablishmentError, PduSessionEstablishmentReject, PduSessionEstablishmentRequest,
    SmDecodeError, SmMessage, UlNasTransport,
};
