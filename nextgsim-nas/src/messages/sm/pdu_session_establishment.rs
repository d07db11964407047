//! PDU Session Establishment Messages (3GPP TS 24.501 Section 8.3.1-8.3.3)
//!
//! - PDU Session Establishment Request (UE to network)
//! - PDU Session Establishment Accept (network to UE)
//! - PDU Session Establishment Reject (network to UE)

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::enums::SmMessageType;
use crate::header::{HeaderError, PlainSmHeader};
use crate::ies::{
    decode_nibble, IeDnn, IeError, IeIntegrityProtectionMaxDataRate, IePduAddress, IeQosFlowDescriptions, IeQosRules,
    IeSessionAmbr, PduSessionType, SmCause, SscMode,
};

/// Error type for PDU Session Establishment message encoding/decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PduSessionEstablishmentError {
    /// Buffer too short for decoding
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Expected minimum bytes
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },
    /// Invalid IE value
    #[error("Invalid IE value: {0}")]
    InvalidIeValue(#[from] IeError),
    /// Header decoding error
    #[error("Header error: {0}")]
    HeaderError(#[from] HeaderError),
}

// ============================================================================
// IEI Constants
// ============================================================================

/// IEI values for PDU Session Establishment Request optional IEs
mod establishment_request_iei {
    /// PDU session type (Type 1, high nibble)
    pub const PDU_SESSION_TYPE_HIGH_NIBBLE: u8 = 0x9;
    /// SSC mode (Type 1, high nibble)
    pub const SSC_MODE_HIGH_NIBBLE: u8 = 0xA;
    /// Always-on PDU session requested (Type 1, high nibble)
    pub const ALWAYS_ON_HIGH_NIBBLE: u8 = 0xB;
    /// 5GSM capability
    pub const SM_CAPABILITY: u8 = 0x28;
    /// Maximum number of supported packet filters
    pub const MAX_PACKET_FILTERS: u8 = 0x55;
    /// SM PDU DN request container
    pub const SM_PDU_DN_REQUEST_CONTAINER: u8 = 0x39;
    /// Extended protocol configuration options
    pub const EXTENDED_PROTOCOL_CONFIG_OPTIONS: u8 = 0x7B;
}

/// IEI values for PDU Session Establishment Accept optional IEs
mod establishment_accept_iei {
    /// 5GSM cause
    pub const SM_CAUSE: u8 = 0x59;
    /// PDU address
    pub const PDU_ADDRESS: u8 = 0x29;
    /// RQ timer value
    pub const RQ_TIMER_VALUE: u8 = 0x56;
    /// S-NSSAI
    pub const S_NSSAI: u8 = 0x22;
    /// Authorized QoS flow descriptions
    pub const AUTHORIZED_QOS_FLOW_DESCRIPTIONS: u8 = 0x79;
    /// Extended protocol configuration options
    pub const EXTENDED_PROTOCOL_CONFIG_OPTIONS: u8 = 0x7B;
    /// DNN
    pub const DNN: u8 = 0x25;
}

/// IEI values for PDU Session Establishment Reject optional IEs
mod establishment_reject_iei {
    /// Back-off timer value
    pub const BACK_OFF_TIMER_VALUE: u8 = 0x37;
    /// Allowed SSC mode (Type 1, high nibble)
    pub const ALLOWED_SSC_MODE_HIGH_NIBBLE: u8 = 0xF;
    /// Extended protocol configuration options
    pub const EXTENDED_PROTOCOL_CONFIG_OPTIONS: u8 = 0x7B;
}

// ============================================================================
// IE readers shared by the three messages
// ============================================================================

fn need<B: Buf>(buf: &B, expected: usize) -> Result<(), PduSessionEstablishmentError> {
    if buf.remaining() < expected {
        return Err(PduSessionEstablishmentError::BufferTooShort {
            expected,
            actual: buf.remaining(),
        });
    }
    Ok(())
}

/// Read the value of a TLV (1-byte length)
fn read_lv<B: Buf>(buf: &mut B) -> Result<Vec<u8>, PduSessionEstablishmentError> {
    need(&*buf, 1)?;
    let len = buf.get_u8() as usize;
    need(&*buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(data)
}

/// Read the value of a TLV-E (2-byte length)
fn read_lve<B: Buf>(buf: &mut B) -> Result<Vec<u8>, PduSessionEstablishmentError> {
    need(&*buf, 2)?;
    let len = buf.get_u16() as usize;
    need(&*buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(data)
}

/// Skip an IE this crate does not model. The IEI has already been consumed.
fn skip_unknown<B: Buf>(buf: &mut B, iei: u8) -> Result<(), PduSessionEstablishmentError> {
    match iei {
        // Type 1 and Type 2: the IEI octet is the whole IE
        0x80..=0xFF => Ok(()),
        // TLV-E
        0x70..=0x7F => read_lve(buf).map(|_| ()),
        _ => read_lv(buf).map(|_| ()),
    }
}

fn put_tlv<B: BufMut>(buf: &mut B, iei: u8, value: &[u8]) {
    buf.put_u8(iei);
    buf.put_u8(value.len() as u8);
    buf.put_slice(value);
}

fn put_tlv_e<B: BufMut>(buf: &mut B, iei: u8, value: &[u8]) {
    buf.put_u8(iei);
    buf.put_u16(value.len() as u16);
    buf.put_slice(value);
}

// ============================================================================
// PDU Session Establishment Request (3GPP TS 24.501 Section 8.3.1)
// ============================================================================

/// PDU Session Establishment Request message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PduSessionEstablishmentRequest {
    /// PDU session ID (from header)
    pub pdu_session_id: u8,
    /// PTI (from header)
    pub pti: u8,
    /// Integrity protection maximum data rate (mandatory)
    pub integrity_protection_max_data_rate: IeIntegrityProtectionMaxDataRate,
    /// PDU session type (optional, Type 1, IEI 0x9-)
    pub pdu_session_type: Option<PduSessionType>,
    /// SSC mode (optional, Type 1, IEI 0xA-)
    pub ssc_mode: Option<SscMode>,
    /// 5GSM capability (optional, Type 4, IEI 0x28)
    pub sm_capability: Option<Vec<u8>>,
    /// Maximum number of supported packet filters (optional, Type 3, IEI 0x55)
    pub max_packet_filters: Option<u16>,
    /// Always-on PDU session requested (optional, Type 1, IEI 0xB-)
    pub always_on_pdu_session_requested: Option<bool>,
    /// SM PDU DN request container (optional, Type 4, IEI 0x39)
    pub sm_pdu_dn_request_container: Option<Vec<u8>>,
    /// Extended protocol configuration options contents (optional, Type 6, IEI 0x7B)
    pub extended_protocol_configuration_options: Option<Vec<u8>>,
}

impl PduSessionEstablishmentRequest {
    /// Create a new request with full-rate integrity protection
    pub fn new(pdu_session_id: u8, pti: u8) -> Self {
        Self {
            pdu_session_id,
            pti,
            integrity_protection_max_data_rate: IeIntegrityProtectionMaxDataRate::full_rate(),
            ..Default::default()
        }
    }

    /// Decode from bytes (after header has been parsed)
    pub fn decode<B: Buf>(
        buf: &mut B,
        pdu_session_id: u8,
        pti: u8,
    ) -> Result<Self, PduSessionEstablishmentError> {
        let integrity_protection_max_data_rate = IeIntegrityProtectionMaxDataRate::decode(buf)?;
        let mut msg = Self {
            pdu_session_id,
            pti,
            integrity_protection_max_data_rate,
            ..Default::default()
        };

        while buf.remaining() > 0 {
            let iei = buf.get_u8();

            match iei >> 4 {
                establishment_request_iei::PDU_SESSION_TYPE_HIGH_NIBBLE => {
                    msg.pdu_session_type = Some(decode_nibble(iei, 0x07, "PduSessionType")?);
                    continue;
                }
                establishment_request_iei::SSC_MODE_HIGH_NIBBLE => {
                    msg.ssc_mode = Some(decode_nibble(iei, 0x07, "SscMode")?);
                    continue;
                }
                establishment_request_iei::ALWAYS_ON_HIGH_NIBBLE => {
                    msg.always_on_pdu_session_requested = Some(iei & 0x01 == 0x01);
                    continue;
                }
                _ => {}
            }

            match iei {
                establishment_request_iei::SM_CAPABILITY => {
                    msg.sm_capability = Some(read_lv(buf)?);
                }
                establishment_request_iei::MAX_PACKET_FILTERS => {
                    need(&*buf, 2)?;
                    let high = buf.get_u8() as u16;
                    let low = buf.get_u8() as u16;
                    msg.max_packet_filters = Some((high << 3) | ((low >> 5) & 0x07));
                }
                establishment_request_iei::SM_PDU_DN_REQUEST_CONTAINER => {
                    msg.sm_pdu_dn_request_container = Some(read_lv(buf)?);
                }
                establishment_request_iei::EXTENDED_PROTOCOL_CONFIG_OPTIONS => {
                    msg.extended_protocol_configuration_options = Some(read_lve(buf)?);
                }
                _ => skip_unknown(buf, iei)?,
            }
        }

        Ok(msg)
    }

    /// Encode to bytes (including header)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        PlainSmHeader::new(
            self.pdu_session_id,
            self.pti,
            SmMessageType::PduSessionEstablishmentRequest,
        )
        .encode(buf);

        self.integrity_protection_max_data_rate.encode(buf);

        if let Some(t) = self.pdu_session_type {
            buf.put_u8((establishment_request_iei::PDU_SESSION_TYPE_HIGH_NIBBLE << 4) | (u8::from(t) & 0x07));
        }
        if let Some(m) = self.ssc_mode {
            buf.put_u8((establishment_request_iei::SSC_MODE_HIGH_NIBBLE << 4) | (u8::from(m) & 0x07));
        }
        if let Some(ref cap) = self.sm_capability {
            put_tlv(buf, establishment_request_iei::SM_CAPABILITY, cap);
        }
        if let Some(n) = self.max_packet_filters {
            buf.put_u8(establishment_request_iei::MAX_PACKET_FILTERS);
            buf.put_u8((n >> 3) as u8);
            buf.put_u8(((n & 0x07) << 5) as u8);
        }
        if let Some(on) = self.always_on_pdu_session_requested {
            buf.put_u8((establishment_request_iei::ALWAYS_ON_HIGH_NIBBLE << 4) | u8::from(on));
        }
        if let Some(ref container) = self.sm_pdu_dn_request_container {
            put_tlv(buf, establishment_request_iei::SM_PDU_DN_REQUEST_CONTAINER, container);
        }
        if let Some(ref epco) = self.extended_protocol_configuration_options {
            put_tlv_e(buf, establishment_request_iei::EXTENDED_PROTOCOL_CONFIG_OPTIONS, epco);
        }
    }

    /// Get the message type
    pub fn message_type() -> SmMessageType {
        SmMessageType::PduSessionEstablishmentRequest
    }
}

// ============================================================================
// PDU Session Establishment Accept (3GPP TS 24.501 Section 8.3.2)
// ============================================================================

/// PDU Session Establishment Accept message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PduSessionEstablishmentAccept {
    /// PDU session ID (from header)
    pub pdu_session_id: u8,
    /// PTI (from header)
    pub pti: u8,
    /// Selected PDU session type (mandatory, low half-octet)
    pub selected_pdu_session_type: PduSessionType,
    /// Selected SSC mode (mandatory, high half-octet)
    pub selected_ssc_mode: SscMode,
    /// Authorized QoS rules (mandatory, LV-E)
    pub authorized_qos_rules: IeQosRules,
    /// Session AMBR (mandatory, LV)
    pub session_ambr: IeSessionAmbr,
    /// 5GSM cause (optional, Type 3, IEI 0x59)
    pub sm_cause: Option<SmCause>,
    /// PDU address (optional, Type 4, IEI 0x29)
    pub pdu_address: Option<IePduAddress>,
    /// S-NSSAI contents (optional, Type 4, IEI 0x22)
    pub s_nssai: Option<Vec<u8>>,
    /// Authorized QoS flow descriptions (optional, Type 6, IEI 0x79)
    pub authorized_qos_flow_descriptions: Option<IeQosFlowDescriptions>,
    /// Extended protocol configuration options contents (optional, Type 6, IEI 0x7B)
    pub extended_protocol_configuration_options: Option<Vec<u8>>,
    /// DNN (optional, Type 4, IEI 0x25)
    pub dnn: Option<IeDnn>,
}

impl PduSessionEstablishmentAccept {
    /// Decode from bytes (after header has been parsed)
    pub fn decode<B: Buf>(
        buf: &mut B,
        pdu_session_id: u8,
        pti: u8,
    ) -> Result<Self, PduSessionEstablishmentError> {
        need(&*buf, 1)?;
        let octet = buf.get_u8();
        let selected_pdu_session_type = decode_nibble(octet, 0x07, "PduSessionType")?;
        let selected_ssc_mode = decode_nibble(octet >> 4, 0x07, "SscMode")?;
        let authorized_qos_rules = IeQosRules::decode(buf)?;
        let session_ambr = IeSessionAmbr::decode(buf)?;

        let mut msg = Self {
            pdu_session_id,
            pti,
            selected_pdu_session_type,
            selected_ssc_mode,
            authorized_qos_rules,
            session_ambr,
            ..Default::default()
        };

        while buf.remaining() > 0 {
            let iei = buf.get_u8();
            match iei {
                establishment_accept_iei::SM_CAUSE => {
                    need(&*buf, 1)?;
                    let val = buf.get_u8();
                    msg.sm_cause = Some(
                        SmCause::try_from(val).map_err(|_| IeError::InvalidValue(val, "SmCause"))?,
                    );
                }
                establishment_accept_iei::PDU_ADDRESS => {
                    msg.pdu_address = Some(IePduAddress::decode(buf)?);
                }
                establishment_accept_iei::S_NSSAI => {
                    msg.s_nssai = Some(read_lv(buf)?);
                }
                establishment_accept_iei::AUTHORIZED_QOS_FLOW_DESCRIPTIONS => {
                    msg.authorized_qos_flow_descriptions = Some(IeQosFlowDescriptions::decode(buf)?);
                }
                establishment_accept_iei::EXTENDED_PROTOCOL_CONFIG_OPTIONS => {
                    msg.extended_protocol_configuration_options = Some(read_lve(buf)?);
                }
                establishment_accept_iei::DNN => {
                    msg.dnn = Some(IeDnn::decode(buf)?);
                }
                establishment_accept_iei::RQ_TIMER_VALUE => {
                    need(&*buf, 1)?;
                    buf.advance(1);
                }
                _ => skip_unknown(buf, iei)?,
            }
        }

        Ok(msg)
    }

    /// Encode to bytes (including header)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        PlainSmHeader::new(
            self.pdu_session_id,
            self.pti,
            SmMessageType::PduSessionEstablishmentAccept,
        )
        .encode(buf);

        let ssc: u8 = self.selected_ssc_mode.into();
        let pdu_type: u8 = self.selected_pdu_session_type.into();
        buf.put_u8(((ssc & 0x07) << 4) | (pdu_type & 0x07));
        self.authorized_qos_rules.encode(buf);
        self.session_ambr.encode(buf);

        if let Some(cause) = self.sm_cause {
            buf.put_u8(establishment_accept_iei::SM_CAUSE);
            buf.put_u8(cause.into());
        }
        if let Some(ref addr) = self.pdu_address {
            buf.put_u8(establishment_accept_iei::PDU_ADDRESS);
            addr.encode(buf);
        }
        if let Some(ref nssai) = self.s_nssai {
            put_tlv(buf, establishment_accept_iei::S_NSSAI, nssai);
        }
        if let Some(ref flows) = self.authorized_qos_flow_descriptions {
            buf.put_u8(establishment_accept_iei::AUTHORIZED_QOS_FLOW_DESCRIPTIONS);
            flows.encode(buf);
        }
        if let Some(ref epco) = self.extended_protocol_configuration_options {
            put_tlv_e(buf, establishment_accept_iei::EXTENDED_PROTOCOL_CONFIG_OPTIONS, epco);
        }
        if let Some(ref dnn) = self.dnn {
            buf.put_u8(establishment_accept_iei::DNN);
            dnn.encode(buf);
        }
    }

    /// Encode to a new vector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

// ============================================================================
// PDU Session Establishment Reject (3GPP TS 24.501 Section 8.3.3)
// ============================================================================

/// PDU Session Establishment Reject message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PduSessionEstablishmentReject {
    /// PDU session ID (from header)
    pub pdu_session_id: u8,
    /// PTI (from header)
    pub pti: u8,
    /// 5GSM cause (mandatory)
    pub sm_cause: SmCause,
    /// Back-off timer value (optional, Type 4, IEI 0x37)
    pub back_off_timer_value: Option<u8>,
    /// Allowed SSC mode bitmap (optional, Type 1, IEI 0xF-)
    pub allowed_ssc_mode: Option<u8>,
    /// Extended protocol configuration options contents (optional, Type 6, IEI 0x7B)
    pub extended_protocol_configuration_options: Option<Vec<u8>>,
}

impl PduSessionEstablishmentReject {
    /// Create a reject with the given cause
    pub fn new(pdu_session_id: u8, pti: u8, sm_cause: SmCause) -> Self {
        Self {
            pdu_session_id,
            pti,
            sm_cause,
            ..Default::default()
        }
    }

    /// Decode from bytes (after header has been parsed)
    pub fn decode<B: Buf>(
        buf: &mut B,
        pdu_session_id: u8,
        pti: u8,
    ) -> Result<Self, PduSessionEstablishmentError> {
        need(&*buf, 1)?;
        let val = buf.get_u8();
        let sm_cause = SmCause::try_from(val).map_err(|_| IeError::InvalidValue(val, "SmCause"))?;
        let mut msg = Self::new(pdu_session_id, pti, sm_cause);

        while buf.remaining() > 0 {
            let iei = buf.get_u8();
            if iei >> 4 == establishment_reject_iei::ALLOWED_SSC_MODE_HIGH_NIBBLE {
                msg.allowed_ssc_mode = Some(iei & 0x07);
                continue;
            }
            match iei {
                establishment_reject_iei::BACK_OFF_TIMER_VALUE => {
                    msg.back_off_timer_value = read_lv(buf)?.first().copied();
                }
                establishment_reject_iei::EXTENDED_PROTOCOL_CONFIG_OPTIONS => {
                    msg.extended_protocol_configuration_options = Some(read_lve(buf)?);
                }
                _ => skip_unknown(buf, iei)?,
            }
        }

        Ok(msg)
    }

    /// Encode to bytes (including header)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        PlainSmHeader::new(
            self.pdu_session_id,
            self.pti,
            SmMessageType::PduSessionEstablishmentReject,
        )
        .encode(buf);

        buf.put_u8(self.sm_cause.into());

        if let Some(timer) = self.back_off_timer_value {
            put_tlv(buf, establishment_reject_iei::BACK_OFF_TIMER_VALUE, &[timer]);
        }
        if let Some(mode) = self.allowed_ssc_mode {
            buf.put_u8((establishment_reject_iei::ALLOWED_SSC_MODE_HIGH_NIBBLE << 4) | (mode & 0x07));
        }
        if let Some(ref epco) = self.extended_protocol_configuration_options {
            put_tlv_e(buf, establishment_reject_iei::EXTENDED_PROTOCOL_CONFIG_OPTIONS, epco);
        }
    }

    /// Encode to a new vector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

// ============================================================================
// Tests
// ============================================================================
