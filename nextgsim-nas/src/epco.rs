//! Extended Protocol Configuration Options (3GPP TS 24.501 Section 9.11.4.6)
//!
//! The ePCO value shares the layout of the PCO IE of TS 24.008 10.5.6.3:
//!
//! ```text
//! +------+-------+-------------------+
//! | ext  | spare | config protocol   |   1 octet, ext bit must be 1
//! +------+-------+-------------------+
//! | container id (2) | len (1) | contents (len) |   repeated
//! +------------------+---------+----------------+
//! ```

use bytes::{Buf, BufMut};
use thiserror::Error;

/// P-CSCF IPv6 Address Request (UE to network)
pub const PCSCF_IPV6_ADDRESS_REQUEST: u16 = 0x0001;
/// DNS Server IPv6 Address Request (UE to network)
pub const DNS_SERVER_IPV6_ADDRESS_REQUEST: u16 = 0x0003;
/// P-CSCF IPv4 Address Request (UE to network)
pub const PCSCF_IPV4_ADDRESS_REQUEST: u16 = 0x000C;
/// DNS Server IPv4 Address Request (UE to network)
pub const DNS_SERVER_IPV4_ADDRESS_REQUEST: u16 = 0x000D;
/// IPv4 Link MTU Request (UE to network)
pub const IPV4_LINK_MTU_REQUEST: u16 = 0x0010;

/// P-CSCF IPv6 Address (network to UE)
pub const PCSCF_IPV6_ADDRESS: u16 = 0x0001;
/// DNS Server IPv6 Address (network to UE)
pub const DNS_SERVER_IPV6_ADDRESS: u16 = 0x0003;
/// P-CSCF IPv4 Address (network to UE)
pub const PCSCF_IPV4_ADDRESS: u16 = 0x000C;
/// DNS Server IPv4 Address (network to UE)
pub const DNS_SERVER_IPV4_ADDRESS: u16 = 0x000D;
/// IPv4 Link MTU (network to UE)
pub const IPV4_LINK_MTU: u16 = 0x0010;

/// Configuration protocol octet: extension bit set, PPP for use with IP PDP type
const CONFIG_PROTOCOL_PPP: u8 = 0x80;

/// Error type for ePCO decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpcoError {
    /// Contents are empty
    #[error("Empty protocol configuration options")]
    Empty,
    /// Extension bit of the configuration protocol octet is not set
    #[error("Configuration protocol octet without extension bit: 0x{0:02X}")]
    ExtensionBitNotSet(u8),
    /// A container unit runs past the end of the contents
    #[error("Truncated container 0x{id:04X}: expected {expected} bytes, got {actual}")]
    TruncatedContainer {
        /// Container identifier (0 if the identifier itself is cut)
        id: u16,
        /// Expected bytes
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },
}

/// A single protocol or container unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolContainer {
    /// Protocol or container identifier
    pub id: u16,
    /// Unit contents
    pub contents: Vec<u8>,
}

impl ProtocolContainer {
    /// Create a unit with contents
    pub fn new(id: u16, contents: Vec<u8>) -> Self {
        Self { id, contents }
    }

    /// Create a request unit (no contents)
    pub fn request(id: u16) -> Self {
        Self {
            id,
            contents: Vec::new(),
        }
    }
}

/// Decoded ePCO contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedProtocolConfigurationOptions {
    /// Configuration protocol (low 3 bits of the first octet)
    pub config_protocol: u8,
    /// Units in wire order
    pub containers: Vec<ProtocolContainer>,
}

impl Default for ExtendedProtocolConfigurationOptions {
    fn default() -> Self {
        Self {
            config_protocol: CONFIG_PROTOCOL_PPP & 0x07,
            containers: Vec::new(),
        }
    }
}

impl ExtendedProtocolConfigurationOptions {
    /// Create an empty option list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit
    pub fn push(&mut self, container: ProtocolContainer) {
        self.containers.push(container);
    }

    /// Iterate the container identifiers in wire order
    pub fn container_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.containers.iter().map(|c| c.id)
    }

    /// Decode the ePCO contents (the value part, without IEI and length)
    pub fn decode(data: &[u8]) -> Result<Self, EpcoError> {
        let mut buf = data;
        if !buf.has_remaining() {
            return Err(EpcoError::Empty);
        }

        let first = buf.get_u8();
        if first & 0x80 == 0 {
            return Err(EpcoError::ExtensionBitNotSet(first));
        }

        let mut containers = Vec::new();
        while buf.has_remaining() {
            if buf.remaining() < 3 {
                return Err(EpcoError::TruncatedContainer {
                    id: 0,
                    expected: 3,
                    actual: buf.remaining(),
                });
            }
            let id = buf.get_u16();
            let len = buf.get_u8() as usize;
            if buf.remaining() < len {
                return Err(EpcoError::TruncatedContainer {
                    id,
                    expected: len,
                    actual: buf.remaining(),
                });
            }
            let mut contents = vec![0u8; len];
            buf.copy_to_slice(&mut contents);
            containers.push(ProtocolContainer { id, contents });
        }

        Ok(Self {
            config_protocol: first & 0x07,
            containers,
        })
    }

    /// Encode the ePCO contents (without IEI and length)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(0x80 | (self.config_protocol & 0x07));
        for c in &self.containers {
            buf.put_u16(c.id);
            buf.put_u8(c.contents.len() as u8);
            buf.put_slice(&c.contents);
        }
    }

    /// Encode to a new vector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.containers.iter().map(|c| 3 + c.contents.len()).sum::<usize>());
        self.encode(&mut buf);
        buf
    }
}
