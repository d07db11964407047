//! NAS Transport Messages (3GPP TS 24.501 Section 8.2.10-8.2.11)
//!
//! - UL NAS Transport (UE to network, Section 8.2.10)
//! - DL NAS Transport (network to UE, Section 8.2.11)

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::enums::MmMessageType;
use crate::header::{HeaderError, PlainMmHeader};
use crate::ies::{decode_nibble, IeDnn, IeError, PayloadContainerType, RequestType};

/// Error type for NAS Transport message encoding/decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NasTransportError {
    /// Buffer too short for decoding
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Expected minimum bytes
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },
    /// Unexpected 5GMM message type
    #[error("Unexpected message type: {0:?}")]
    UnexpectedMessageType(MmMessageType),
    /// Invalid IE value
    #[error("Invalid IE value: {0}")]
    InvalidIeValue(#[from] IeError),
    /// Header decoding error
    #[error("Header error: {0}")]
    HeaderError(#[from] HeaderError),
}

// ============================================================================
// IEI Constants for NAS Transport Messages
// ============================================================================

/// IEI values for DL NAS Transport optional IEs
mod dl_nas_transport_iei {
    /// PDU session ID
    pub const PDU_SESSION_ID: u8 = 0x12;
    /// 5GMM cause
    pub const MM_CAUSE: u8 = 0x58;
}

/// IEI values for UL NAS Transport optional IEs
mod ul_nas_transport_iei {
    /// PDU session ID
    pub const PDU_SESSION_ID: u8 = 0x12;
    /// Old PDU session ID
    pub const OLD_PDU_SESSION_ID: u8 = 0x59;
    /// Request type (Type 1, IEI high nibble 0x8)
    pub const REQUEST_TYPE_HIGH_NIBBLE: u8 = 0x8;
    /// S-NSSAI
    pub const S_NSSAI: u8 = 0x22;
    /// DNN
    pub const DNN: u8 = 0x25;
}

fn take_lv<B: Buf>(buf: &mut B) -> Result<Vec<u8>, NasTransportError> {
    if buf.remaining() < 1 {
        return Err(NasTransportError::BufferTooShort {
            expected: 1,
            actual: 0,
        });
    }
    let len = buf.get_u8() as usize;
    if buf.remaining() < len {
        return Err(NasTransportError::BufferTooShort {
            expected: len,
            actual: buf.remaining(),
        });
    }
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(data)
}

fn take_u8<B: Buf>(buf: &mut B) -> Result<u8, NasTransportError> {
    if buf.remaining() < 1 {
        return Err(NasTransportError::BufferTooShort {
            expected: 1,
            actual: 0,
        });
    }
    Ok(buf.get_u8())
}

/// Decode the mandatory payload container type and payload container.
fn decode_payload<B: Buf>(buf: &mut B) -> Result<(PayloadContainerType, Vec<u8>), NasTransportError> {
    let pct_byte = take_u8(buf)?;
    let payload_container_type = decode_nibble(pct_byte, 0x0F, "PayloadContainerType")?;

    if buf.remaining() < 2 {
        return Err(NasTransportError::BufferTooShort {
            expected: 2,
            actual: buf.remaining(),
        });
    }
    let pc_len = buf.get_u16() as usize;
    if buf.remaining() < pc_len {
        return Err(NasTransportError::BufferTooShort {
            expected: pc_len,
            actual: buf.remaining(),
        });
    }
    let mut payload_container = vec![0u8; pc_len];
    buf.copy_to_slice(&mut payload_container);
    Ok((payload_container_type, payload_container))
}

fn encode_payload<B: BufMut>(buf: &mut B, pct: PayloadContainerType, payload: &[u8]) {
    buf.put_u8(u8::from(pct) & 0x0F);
    buf.put_u16(payload.len() as u16);
    buf.put_slice(payload);
}

// ============================================================================
// UL NAS Transport (3GPP TS 24.501 Section 8.2.10)
// ============================================================================

/// UL NAS Transport message (UE to network)
///
/// Carries an N1 SM container together with the routing hints the network
/// uses to pick the session's slice and data network.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UlNasTransport {
    /// Payload container type (mandatory, 4 bits)
    pub payload_container_type: PayloadContainerType,
    /// Payload container (mandatory, LV-E)
    pub payload_container: Vec<u8>,
    /// PDU session ID (optional, Type 3, IEI 0x12)
    pub pdu_session_id: Option<u8>,
    /// Old PDU session ID (optional, Type 3, IEI 0x59)
    pub old_pdu_session_id: Option<u8>,
    /// Request type (optional, Type 1, IEI high nibble 0x8)
    pub request_type: Option<RequestType>,
    /// S-NSSAI contents (optional, Type 4, IEI 0x22)
    pub s_nssai: Option<Vec<u8>>,
    /// DNN (optional, Type 4, IEI 0x25)
    pub dnn: Option<IeDnn>,
}

impl UlNasTransport {
    /// Create a new UL NAS Transport message
    pub fn new(payload_container_type: PayloadContainerType, payload_container: Vec<u8>) -> Self {
        Self {
            payload_container_type,
            payload_container,
            ..Default::default()
        }
    }

    /// Decode a complete message, header included
    pub fn decode_message(data: &[u8]) -> Result<Self, NasTransportError> {
        let mut buf = data;
        let header = PlainMmHeader::decode(&mut buf)?;
        if header.message_type != MmMessageType::UlNasTransport {
            return Err(NasTransportError::UnexpectedMessageType(header.message_type));
        }
        Self::decode(&mut buf)
    }

    /// Decode from bytes (after header has been parsed)
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, NasTransportError> {
        let (payload_container_type, payload_container) = decode_payload(buf)?;
        let mut msg = Self::new(payload_container_type, payload_container);

        while buf.remaining() > 0 {
            let iei = buf.chunk()[0];

            if iei >> 4 == ul_nas_transport_iei::REQUEST_TYPE_HIGH_NIBBLE {
                buf.advance(1);
                msg.request_type = Some(decode_nibble(iei, 0x07, "RequestType")?);
                continue;
            }

            buf.advance(1);
            match iei {
                ul_nas_transport_iei::PDU_SESSION_ID => {
                    msg.pdu_session_id = Some(take_u8(buf)?);
                }
                ul_nas_transport_iei::OLD_PDU_SESSION_ID => {
                    msg.old_pdu_session_id = Some(take_u8(buf)?);
                }
                ul_nas_transport_iei::S_NSSAI => {
                    msg.s_nssai = Some(take_lv(buf)?);
                }
                ul_nas_transport_iei::DNN => {
                    msg.dnn = Some(IeDnn::new(take_lv(buf)?));
                }
                _ if iei & 0x80 != 0 => {
                    // Unknown Type 1 IE, value already consumed with the IEI
                }
                _ => {
                    // Unknown TLV, skip it
                    take_lv(buf)?;
                }
            }
        }

        Ok(msg)
    }

    /// Encode to bytes (including header)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        PlainMmHeader::new(MmMessageType::UlNasTransport).encode(buf);
        encode_payload(buf, self.payload_container_type, &self.payload_container);

        if let Some(psi) = self.pdu_session_id {
            buf.put_u8(ul_nas_transport_iei::PDU_SESSION_ID);
            buf.put_u8(psi);
        }

        if let Some(old_psi) = self.old_pdu_session_id {
            buf.put_u8(ul_nas_transport_iei::OLD_PDU_SESSION_ID);
            buf.put_u8(old_psi);
        }

        if let Some(rt) = self.request_type {
            let rt_val: u8 = rt.into();
            buf.put_u8((ul_nas_transport_iei::REQUEST_TYPE_HIGH_NIBBLE << 4) | (rt_val & 0x07));
        }

        if let Some(ref nssai) = self.s_nssai {
            buf.put_u8(ul_nas_transport_iei::S_NSSAI);
            buf.put_u8(nssai.len() as u8);
            buf.put_slice(nssai);
        }

        if let Some(ref dnn) = self.dnn {
            buf.put_u8(ul_nas_transport_iei::DNN);
            dnn.encode(buf);
        }
    }

    /// Get the message type
    pub fn message_type() -> MmMessageType {
        MmMessageType::UlNasTransport
    }
}

// ============================================================================
// DL NAS Transport (3GPP TS 24.501 Section 8.2.11)
// ============================================================================

/// DL NAS Transport message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DlNasTransport {
    /// Payload container type (mandatory, 4 bits)
    pub payload_container_type: PayloadContainerType,
    /// Payload container (mandatory, LV-E)
    pub payload_container: Vec<u8>,
    /// PDU session ID (optional, Type 3, IEI 0x12)
    pub pdu_session_id: Option<u8>,
    /// 5GMM cause (optional, Type 3, IEI 0x58)
    pub mm_cause: Option<u8>,
}

impl DlNasTransport {
    /// Create a DL NAS Transport carrying an N1 SM message for a PDU session
    pub fn n1_sm(pdu_session_id: u8, sm_message: Vec<u8>) -> Self {
        Self {
            payload_container_type: PayloadContainerType::N1SmInformation,
            payload_container: sm_message,
            pdu_session_id: Some(pdu_session_id),
            mm_cause: None,
        }
    }

    /// Decode from bytes (after header has been parsed)
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, NasTransportError> {
        let (payload_container_type, payload_container) = decode_payload(buf)?;
        let mut msg = Self {
            payload_container_type,
            payload_container,
            ..Default::default()
        };

        while buf.remaining() > 0 {
            let iei = buf.get_u8();
            match iei {
                dl_nas_transport_iei::PDU_SESSION_ID => msg.pdu_session_id = Some(take_u8(buf)?),
                dl_nas_transport_iei::MM_CAUSE => msg.mm_cause = Some(take_u8(buf)?),
                _ if iei & 0x80 != 0 => {}
                _ => {
                    take_lv(buf)?;
                }
            }
        }

        Ok(msg)
    }

    /// Encode to bytes (including header)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        PlainMmHeader::new(MmMessageType::DlNasTransport).encode(buf);
        encode_payload(buf, self.payload_container_type, &self.payload_container);

        if let Some(psi) = self.pdu_session_id {
            buf.put_u8(dl_nas_transport_iei::PDU_SESSION_ID);
            buf.put_u8(psi);
        }

        if let Some(cause) = self.mm_cause {
            buf.put_u8(dl_nas_transport_iei::MM_CAUSE);
            buf.put_u8(cause);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
