//! NAS message header structures
//!
//! Implements the plain 5G NAS message headers of 3GPP TS 24.501.
//!
//! ## Plain 5GMM Header (3 bytes)
//! ```text
//! +------------------+------------------+------------------+
//! |       EPD        |  Security Header |   Message Type   |
//! |     (1 byte)     |  Type (4 bits)   |    (1 byte)      |
//! |                  |  Spare (4 bits)  |                  |
//! +------------------+------------------+------------------+
//! ```
//!
//! ## Plain 5GSM Header (4 bytes)
//! ```text
//! +------------------+------------------+------------------+------------------+
//! |       EPD        | PDU Session ID   |       PTI        |   Message Type   |
//! |     (1 byte)     |    (1 byte)      |    (1 byte)      |    (1 byte)      |
//! +------------------+------------------+------------------+------------------+
//! ```

use crate::enums::{ExtendedProtocolDiscriminator, MmMessageType, SecurityHeaderType, SmMessageType};
use bytes::{Buf, BufMut};
use thiserror::Error;

/// NAS header decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Invalid extended protocol discriminator: 0x{0:02X}")]
    InvalidEpd(u8),

    #[error("Invalid security header type: 0x{0:02X}")]
    InvalidSecurityHeaderType(u8),

    #[error("Invalid message type: 0x{0:02X}")]
    InvalidMessageType(u8),

    #[error("EPD mismatch: expected {expected:?}, got {actual:?}")]
    EpdMismatch {
        expected: ExtendedProtocolDiscriminator,
        actual: ExtendedProtocolDiscriminator,
    },
}

fn check_epd(byte: u8, expected: ExtendedProtocolDiscriminator) -> Result<(), HeaderError> {
    let epd = ExtendedProtocolDiscriminator::try_from(byte).map_err(|_| HeaderError::InvalidEpd(byte))?;
    if epd != expected {
        return Err(HeaderError::EpdMismatch {
            expected,
            actual: epd,
        });
    }
    Ok(())
}

/// Plain 5GMM NAS message header (3 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainMmHeader {
    /// Security header type (NotProtected for plain messages)
    pub security_header_type: SecurityHeaderType,
    /// Message type
    pub message_type: MmMessageType,
}

impl PlainMmHeader {
    /// Size of the plain MM header in bytes
    pub const SIZE: usize = 3;

    /// Create a new plain MM header
    pub fn new(message_type: MmMessageType) -> Self {
        Self {
            security_header_type: SecurityHeaderType::NotProtected,
            message_type,
        }
    }

    /// Decode a plain MM header from bytes
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, HeaderError> {
        if buf.remaining() < Self::SIZE {
            return Err(HeaderError::BufferTooShort {
                expected: Self::SIZE,
                actual: buf.remaining(),
            });
        }

        check_epd(buf.get_u8(), ExtendedProtocolDiscriminator::MobilityManagement)?;

        let sht_byte = buf.get_u8();
        // Security header type is in the lower 4 bits
        let security_header_type = SecurityHeaderType::try_from(sht_byte & 0x0F)
            .map_err(|_| HeaderError::InvalidSecurityHeaderType(sht_byte))?;

        let mt_byte = buf.get_u8();
        let message_type =
            MmMessageType::try_from(mt_byte).map_err(|_| HeaderError::InvalidMessageType(mt_byte))?;

        Ok(Self {
            security_header_type,
            message_type,
        })
    }

    /// Encode the header to bytes
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(ExtendedProtocolDiscriminator::MobilityManagement.into());
        buf.put_u8(u8::from(self.security_header_type) & 0x0F);
        buf.put_u8(self.message_type.into());
    }
}

/// Plain 5GSM NAS message header (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainSmHeader {
    /// PDU Session Identity
    pub pdu_session_id: u8,
    /// Procedure Transaction Identity
    pub pti: u8,
    /// Message type
    pub message_type: SmMessageType,
}

impl PlainSmHeader {
    /// Size of the plain SM header in bytes
    pub const SIZE: usize = 4;

    /// Create a new plain SM header
    pub fn new(pdu_session_id: u8, pti: u8, message_type: SmMessageType) -> Self {
        Self {
            pdu_session_id,
            pti,
            message_type,
        }
    }

    /// Decode a plain SM header from bytes
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, HeaderError> {
        if buf.remaining() < Self::SIZE {
            return Err(HeaderError::BufferTooShort {
                expected: Self::SIZE,
                actual: buf.remaining(),
            });
        }

        check_epd(buf.get_u8(), ExtendedProtocolDiscriminator::SessionManagement)?;

        let pdu_session_id = buf.get_u8();
        let pti = buf.get_u8();

        let mt_byte = buf.get_u8();
        let message_type =
            SmMessageType::try_from(mt_byte).map_err(|_| HeaderError::InvalidMessageType(mt_byte))?;

        Ok(Self {
            pdu_session_id,
            pti,
            message_type,
        })
    }

    /// Encode the header to bytes
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(ExtendedProtocolDiscriminator::SessionManagement.into());
        buf.put_u8(self.pdu_session_id);
        buf.put_u8(self.pti);
        buf.put_u8(self.message_type.into());
    }
}
