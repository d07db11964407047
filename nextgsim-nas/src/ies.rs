//! Information Elements used by the session management messages
//!
//! Based on 3GPP TS 24.501 Section 9.11.

use bytes::{Buf, BufMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Error type for IE decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IeError {
    /// Buffer too short for the IE
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Expected minimum bytes
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },
    /// Invalid value for the IE type
    #[error("Invalid value 0x{0:X} for {1}")]
    InvalidValue(u8, &'static str),
    /// Malformed DNN label encoding
    #[error("Malformed DNN: {0}")]
    MalformedDnn(String),
}

fn ensure_remaining(actual: usize, expected: usize) -> Result<(), IeError> {
    if actual < expected {
        return Err(IeError::BufferTooShort { expected, actual });
    }
    Ok(())
}

// ============================================================================
// Half-octet enumerations
// ============================================================================

/// Payload container type (3GPP TS 24.501 Section 9.11.3.40)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PayloadContainerType {
    /// N1 SM information
    #[default]
    N1SmInformation = 0b0001,
    /// SMS
    Sms = 0b0010,
    /// LPP message
    LppMessage = 0b0011,
    /// SOR transparent container
    SorTransparentContainer = 0b0100,
    /// UE policy container
    UePolicyContainer = 0b0101,
    /// UE parameters update transparent container
    UeParametersUpdateTransparentContainer = 0b0110,
    /// Multiple payloads
    MultiplePayloads = 0b1111,
}

/// PDU session type (3GPP TS 24.501 Section 9.11.4.11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PduSessionType {
    /// IPv4
    #[default]
    Ipv4 = 0b001,
    /// IPv6
    Ipv6 = 0b010,
    /// IPv4v6
    Ipv4v6 = 0b011,
    /// Unstructured
    Unstructured = 0b100,
    /// Ethernet
    Ethernet = 0b101,
}

/// Request type (3GPP TS 24.501 Section 9.11.3.47)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RequestType {
    /// Initial request
    #[default]
    InitialRequest = 0b001,
    /// Existing PDU session
    ExistingPduSession = 0b010,
    /// Initial emergency request
    InitialEmergencyRequest = 0b011,
    /// Existing emergency PDU session
    ExistingEmergencyPduSession = 0b100,
    /// Modification request
    ModificationRequest = 0b101,
}

/// SSC mode (3GPP TS 24.501 Section 9.11.4.16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SscMode {
    /// SSC mode 1
    #[default]
    SscMode1 = 0b001,
    /// SSC mode 2
    SscMode2 = 0b010,
    /// SSC mode 3
    SscMode3 = 0b011,
}

/// Decode a half-octet value carried in the low bits of `val`.
pub(crate) fn decode_nibble<T: TryFromPrimitive<Primitive = u8>>(
    val: u8,
    mask: u8,
    name: &'static str,
) -> Result<T, IeError> {
    T::try_from_primitive(val & mask).map_err(|_| IeError::InvalidValue(val, name))
}

// ============================================================================
// 5GSM Cause (Type 3)
// ============================================================================

/// 5GSM Cause values (3GPP TS 24.501 Section 9.11.4.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SmCause {
    /// Operator determined barring
    OperatorDeterminedBarring = 0x08,
    /// Insufficient resources
    InsufficientResources = 0x1A,
    /// Missing or unknown DNN
    MissingOrUnknownDnn = 0x1B,
    /// Unknown PDU session type
    UnknownPduSessionType = 0x1C,
    /// User authentication or authorization failed
    UserAuthFailed = 0x1D,
    /// Request rejected, unspecified
    RequestRejectedUnspecified = 0x1F,
    /// Service option temporarily out of order
    ServiceOptionTemporarilyOutOfOrder = 0x22,
    /// PTI already in use
    PtiAlreadyInUse = 0x23,
    /// Regular deactivation
    RegularDeactivation = 0x24,
    /// Network failure
    NetworkFailure = 0x26,
    /// Invalid PDU session identity
    InvalidPduSessionIdentity = 0x2B,
    /// PDU session type IPv4 only allowed
    PduSessionTypeIpv4OnlyAllowed = 0x32,
    /// PDU session type IPv6 only allowed
    PduSessionTypeIpv6OnlyAllowed = 0x33,
    /// PDU session does not exist
    PduSessionDoesNotExist = 0x36,
    /// Insufficient resources for specific slice and DNN
    InsufficientResourcesForSliceAndDnn = 0x43,
    /// Not supported SSC mode
    NotSupportedSscMode = 0x44,
    /// Missing or unknown DNN in a slice
    MissingOrUnknownDnnInSlice = 0x46,
    /// Semantically incorrect message
    #[default]
    SemanticallyIncorrectMessage = 0x5F,
    /// Invalid mandatory information
    InvalidMandatoryInformation = 0x60,
    /// Message type non-existent or not implemented
    MessageTypeNonExistent = 0x61,
    /// Conditional IE error
    ConditionalIeError = 0x64,
    /// Protocol error, unspecified
    ProtocolErrorUnspecified = 0x6F,
}

// ============================================================================
// Integrity Protection Maximum Data Rate (Type 3, 2 octets)
// ============================================================================

/// Maximum data rate for user-plane integrity protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxDataRate {
    /// 64 kbps
    Rate64Kbps,
    /// Full data rate
    #[default]
    FullRate,
}

impl From<u8> for MaxDataRate {
    fn from(value: u8) -> Self {
        // Spare values are interpreted as 64 kbps (TS 24.501 9.11.4.7)
        match value {
            0xFF => MaxDataRate::FullRate,
            _ => MaxDataRate::Rate64Kbps,
        }
    }
}

impl From<MaxDataRate> for u8 {
    fn from(rate: MaxDataRate) -> Self {
        match rate {
            MaxDataRate::Rate64Kbps => 0x00,
            MaxDataRate::FullRate => 0xFF,
        }
    }
}

/// Integrity Protection Maximum Data Rate IE (3GPP TS 24.501 Section 9.11.4.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeIntegrityProtectionMaxDataRate {
    /// Maximum data rate for uplink
    pub uplink: MaxDataRate,
    /// Maximum data rate for downlink
    pub downlink: MaxDataRate,
}

impl IeIntegrityProtectionMaxDataRate {
    /// Create with full rate for both directions
    pub fn full_rate() -> Self {
        Self {
            uplink: MaxDataRate::FullRate,
            downlink: MaxDataRate::FullRate,
        }
    }

    /// Decode the two value octets
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, IeError> {
        ensure_remaining(buf.remaining(), 2)?;
        let uplink = MaxDataRate::from(buf.get_u8());
        let downlink = MaxDataRate::from(buf.get_u8());
        Ok(Self { uplink, downlink })
    }

    /// Encode the two value octets
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.uplink.into());
        buf.put_u8(self.downlink.into());
    }
}

// ============================================================================
// DNN (Type 4)
// ============================================================================

/// DNN IE (3GPP TS 24.501 Section 9.11.2.1B)
///
/// The value is an APN-style sequence of length-prefixed labels
/// (TS 23.003 9.1), e.g. `"internet"` is `08 69 6e 74 65 72 6e 65 74`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeDnn {
    /// Label-encoded DNN value
    pub value: Vec<u8>,
}

impl IeDnn {
    /// Create a DNN IE from raw label-encoded data
    pub fn new(value: Vec<u8>) -> Self {
        Self { value }
    }

    /// Create a DNN IE from its dotted form (e.g. "ims.mnc001.mcc001")
    pub fn from_string(dnn: &str) -> Self {
        let mut value = Vec::with_capacity(dnn.len() + 1);
        for label in dnn.split('.') {
            value.push(label.len() as u8);
            value.extend_from_slice(label.as_bytes());
        }
        Self { value }
    }

    /// Render the label encoding back to its dotted form.
    ///
    /// Fails on an empty value, an empty or truncated label, or non-UTF-8 bytes.
    pub fn to_dnn_string(&self) -> Result<String, IeError> {
        if self.value.is_empty() {
            return Err(IeError::MalformedDnn("empty value".to_string()));
        }

        let mut labels = Vec::new();
        let mut rest = &self.value[..];
        while let Some((&len, tail)) = rest.split_first() {
            let len = len as usize;
            if len == 0 || tail.len() < len {
                return Err(IeError::MalformedDnn(format!(
                    "bad label length {len} with {} bytes left",
                    tail.len()
                )));
            }
            let label = std::str::from_utf8(&tail[..len])
                .map_err(|e| IeError::MalformedDnn(e.to_string()))?;
            labels.push(label);
            rest = &tail[len..];
        }
        Ok(labels.join("."))
    }

    /// Decode from bytes (without IEI, with 1-byte length)
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, IeError> {
        ensure_remaining(buf.remaining(), 1)?;
        let length = buf.get_u8() as usize;
        ensure_remaining(buf.remaining(), length)?;
        let mut value = vec![0u8; length];
        buf.copy_to_slice(&mut value);
        Ok(Self { value })
    }

    /// Encode to bytes (without IEI, with 1-byte length)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.value.len() as u8);
        buf.put_slice(&self.value);
    }
}

// ============================================================================
// PDU Address (Type 4)
// ============================================================================

/// PDU Address IE (3GPP TS 24.501 Section 9.11.4.10)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IePduAddress {
    /// PDU session type value the address was assigned for
    pub session_type: PduSessionType,
    /// Address information (4 octets IPv4, 8 octets IPv6 IID, 12 octets IPv4v6)
    pub address: Vec<u8>,
}

impl IePduAddress {
    /// Create a PDU address IE
    pub fn new(session_type: PduSessionType, address: Vec<u8>) -> Self {
        Self {
            session_type,
            address,
        }
    }

    /// Decode from bytes (without IEI, with 1-byte length)
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, IeError> {
        ensure_remaining(buf.remaining(), 1)?;
        let length = buf.get_u8() as usize;
        if length == 0 {
            return Err(IeError::InvalidValue(0, "PduAddressLength"));
        }
        ensure_remaining(buf.remaining(), length)?;
        let session_type = decode_nibble(buf.get_u8(), 0x07, "PduAddressType")?;
        let mut address = vec![0u8; length.saturating_sub(1)];
        buf.copy_to_slice(&mut address);
        Ok(Self {
            session_type,
            address,
        })
    }

    /// Encode to bytes (without IEI, with 1-byte length)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8((1 + self.address.len()) as u8);
        buf.put_u8(self.session_type.into());
        buf.put_slice(&self.address);
    }
}

// ============================================================================
// Session-AMBR (Type 4)
// ============================================================================

/// Unit of a session AMBR value: 1 Kbps (TS 24.501 Table 9.11.4.14.1)
pub const AMBR_UNIT_1_KBPS: u8 = 0x01;
/// Unit of a session AMBR value: 1 Mbps
pub const AMBR_UNIT_1_MBPS: u8 = 0x06;

/// Session-AMBR IE (3GPP TS 24.501 Section 9.11.4.14)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeSessionAmbr {
    /// Unit for downlink session AMBR
    pub downlink_unit: u8,
    /// Downlink session AMBR value
    pub downlink: u16,
    /// Unit for uplink session AMBR
    pub uplink_unit: u8,
    /// Uplink session AMBR value
    pub uplink: u16,
}

impl IeSessionAmbr {
    /// Build an AMBR from kbps figures, switching to Mbps when the value
    /// does not fit a 16-bit Kbps field.
    pub fn from_kbps(downlink_kbps: u32, uplink_kbps: u32) -> Self {
        let (downlink_unit, downlink) = Self::scale(downlink_kbps);
        let (uplink_unit, uplink) = Self::scale(uplink_kbps);
        Self {
            downlink_unit,
            downlink,
            uplink_unit,
            uplink,
        }
    }

    fn scale(kbps: u32) -> (u8, u16) {
        match u16::try_from(kbps) {
            Ok(v) => (AMBR_UNIT_1_KBPS, v),
            Err(_) => (
                AMBR_UNIT_1_MBPS,
                u16::try_from(kbps / 1000).unwrap_or(u16::MAX),
            ),
        }
    }

    /// Decode from bytes (without IEI, with 1-byte length)
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, IeError> {
        ensure_remaining(buf.remaining(), 1)?;
        let length = buf.get_u8() as usize;
        ensure_remaining(buf.remaining(), length.max(6))?;

        let downlink_unit = buf.get_u8();
        let downlink = buf.get_u16();
        let uplink_unit = buf.get_u8();
        let uplink = buf.get_u16();

        if length > 6 {
            buf.advance(length - 6);
        }

        Ok(Self {
            downlink_unit,
            downlink,
            uplink_unit,
            uplink,
        })
    }

    /// Encode to bytes (without IEI, with 1-byte length)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(6);
        buf.put_u8(self.downlink_unit);
        buf.put_u16(self.downlink);
        buf.put_u8(self.uplink_unit);
        buf.put_u16(self.uplink);
    }
}

// ============================================================================
// QoS rules (Type 6)
// ============================================================================

/// Authorized QoS Rules IE (3GPP TS 24.501 Section 9.11.4.13), kept as raw rule bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeQosRules {
    /// Encoded QoS rules
    pub data: Vec<u8>,
}

impl IeQosRules {
    /// Single default rule: match-all packet filter, precedence 255, bound to `qfi`.
    pub fn default_rule(qfi: u8) -> Self {
        let mut data = Vec::with_capacity(9);
        // QoS rule identifier
        data.push(0x01);
        // Rule length
        data.extend_from_slice(&[0x00, 0x06]);
        // Create new QoS rule, DQR bit set, one packet filter
        data.push(0b0011_0001);
        // Packet filter: bidirectional, id 1, length 1, match-all component
        data.extend_from_slice(&[0x31, 0x01, 0x01]);
        // Precedence
        data.push(0xFF);
        // Segregation off, QFI
        data.push(qfi & 0x3F);
        Self { data }
    }

    /// Decode from bytes (without IEI, with 2-byte length)
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, IeError> {
        ensure_remaining(buf.remaining(), 2)?;
        let length = buf.get_u16() as usize;
        ensure_remaining(buf.remaining(), length)?;
        let mut data = vec![0u8; length];
        buf.copy_to_slice(&mut data);
        Ok(Self { data })
    }

    /// Encode to bytes (without IEI, with 2-byte length)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.data.len() as u16);
        buf.put_slice(&self.data);
    }
}

// ============================================================================
// QoS flow descriptions (Type 6)
// ============================================================================

/// QoS flow description operation code: create new QoS flow description
pub const QOS_FLOW_CREATE: u8 = 0x01;
/// QoS flow parameter identifier: 5QI
pub const QOS_FLOW_PARAM_5QI: u8 = 0x01;

/// Authorized QoS Flow Descriptions IE (3GPP TS 24.501 Section 9.11.4.12),
/// kept as raw description bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeQosFlowDescriptions {
    /// Encoded QoS flow descriptions
    pub data: Vec<u8>,
}

impl IeQosFlowDescriptions {
    /// Single "create" description for `qfi` carrying only its 5QI.
    pub fn default_flow(qfi: u8, five_qi: u8) -> Self {
        let data = vec![
            qfi & 0x3F,
            QOS_FLOW_CREATE << 5,
            // E bit set, one parameter
            0x40 | 0x01,
            QOS_FLOW_PARAM_5QI,
            0x01,
            five_qi,
        ];
        Self { data }
    }

    /// 5QI of the description for `qfi`, if present.
    pub fn five_qi(&self, qfi: u8) -> Option<u8> {
        let mut rest = &self.data[..];
        while let [id, _op, params, tail @ ..] = rest {
            let mut tail = tail;
            let mut found = None;
            for _ in 0..(params & 0x3F) {
                let [param_id, len, after @ ..] = tail else {
                    return None;
                };
                let len = *len as usize;
                if after.len() < len {
                    return None;
                }
                if *param_id == QOS_FLOW_PARAM_5QI && len == 1 {
                    found = Some(after[0]);
                }
                tail = &after[len..];
            }
            if id & 0x3F == qfi & 0x3F {
                return found;
            }
            rest = tail;
        }
        None
    }

    /// Decode from bytes (without IEI, with 2-byte length)
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, IeError> {
        ensure_remaining(buf.remaining(), 2)?;
        let length = buf.get_u16() as usize;
        ensure_remaining(buf.remaining(), length)?;
        let mut data = vec![0u8; length];
        buf.copy_to_slice(&mut data);
        Ok(Self { data })
    }

    /// Encode to bytes (without IEI, with 2-byte length)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.data.len() as u16);
        buf.put_slice(&self.data);
    }
}
