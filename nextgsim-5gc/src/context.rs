//! PDU session context

use std::net::Ipv4Addr;
use std::sync::Arc;

use nextgsim_common::{NrLocation, SNssai};
use nextgsim_nas::epco::{
    DNS_SERVER_IPV4_ADDRESS_REQUEST, DNS_SERVER_IPV6_ADDRESS_REQUEST, IPV4_LINK_MTU_REQUEST,
    PCSCF_IPV4_ADDRESS_REQUEST,
};
use nextgsim_nas::PduSessionType;

use crate::error::DecodeError;
use crate::service::{DataNetwork, SessionRule};

/// IP session types the core serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionType {
    /// IPv4 only
    #[default]
    Ipv4,
    /// IPv6 only
    Ipv6,
    /// Dual stack
    Ipv4v6,
}

impl TryFrom<PduSessionType> for SessionType {
    type Error = DecodeError;

    fn try_from(t: PduSessionType) -> Result<Self, Self::Error> {
        match t {
            PduSessionType::Ipv4 => Ok(SessionType::Ipv4),
            PduSessionType::Ipv6 => Ok(SessionType::Ipv6),
            PduSessionType::Ipv4v6 => Ok(SessionType::Ipv4v6),
            other => Err(DecodeError::UnsupportedSessionType(other)),
        }
    }
}

impl From<SessionType> for PduSessionType {
    fn from(t: SessionType) -> Self {
        match t {
            SessionType::Ipv4 => PduSessionType::Ipv4,
            SessionType::Ipv6 => PduSessionType::Ipv6,
            SessionType::Ipv4v6 => PduSessionType::Ipv4v6,
        }
    }
}

/// Options the UE asked for in its ePCO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolConfigurationOptions {
    /// DNS server IPv4 address requested
    pub dns_ipv4_request: bool,
    /// DNS server IPv6 address requested
    pub dns_ipv6_request: bool,
    /// P-CSCF IPv4 address requested
    pub pcscf_ipv4_request: bool,
    /// IPv4 link MTU requested
    pub ipv4_link_mtu_request: bool,
}

impl ProtocolConfigurationOptions {
    /// Record a requested container. Returns false for identifiers the core
    /// does not answer; those leave the flags untouched.
    pub fn mark(&mut self, container_id: u16) -> bool {
        match container_id {
            DNS_SERVER_IPV4_ADDRESS_REQUEST => self.dns_ipv4_request = true,
            DNS_SERVER_IPV6_ADDRESS_REQUEST => self.dns_ipv6_request = true,
            PCSCF_IPV4_ADDRESS_REQUEST => self.pcscf_ipv4_request = true,
            IPV4_LINK_MTU_REQUEST => self.ipv4_link_mtu_request = true,
            _ => return false,
        }
        true
    }

    /// True if any option was requested
    pub fn any(&self) -> bool {
        self.dns_ipv4_request
            || self.dns_ipv6_request
            || self.pcscf_ipv4_request
            || self.ipv4_link_mtu_request
    }
}

/// Length of the PDU address wire buffer
pub const PDU_ADDRESS_LEN: usize = 12;

/// One PDU session of a UE.
///
/// Filled in by the establishment procedure and frozen once registered
/// with the UE (it is shared as `Arc<SessionContext>` from then on).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: u8,
    snssai: SNssai,
    pdu_address: Option<Ipv4Addr>,
    data_network: Option<Arc<DataNetwork>>,
    user_location: NrLocation,
    session_type: SessionType,
    pti: u8,
    protocol_options: ProtocolConfigurationOptions,
    session_rule: Option<Arc<SessionRule>>,
    default_qfi: u8,
}

impl SessionContext {
    /// Create an empty context for PDU session `session_id`
    pub fn new(session_id: u8) -> Self {
        Self {
            session_id,
            snssai: SNssai::default(),
            pdu_address: None,
            data_network: None,
            user_location: NrLocation::default(),
            session_type: SessionType::default(),
            pti: 0,
            protocol_options: ProtocolConfigurationOptions::default(),
            session_rule: None,
            default_qfi: 0,
        }
    }

    /// PDU session identity
    pub fn session_id(&self) -> u8 {
        self.session_id
    }

    /// Slice of the session
    pub fn snssai(&self) -> SNssai {
        self.snssai
    }

    /// Set the slice
    pub fn set_snssai(&mut self, snssai: SNssai) {
        self.snssai = snssai;
    }

    /// Address assigned to the UE
    pub fn pdu_address(&self) -> Option<Ipv4Addr> {
        self.pdu_address
    }

    /// Set the UE address
    pub fn set_pdu_address(&mut self, addr: Ipv4Addr) {
        self.pdu_address = Some(addr);
    }

    /// Data network of the session
    pub fn data_network(&self) -> Option<&Arc<DataNetwork>> {
        self.data_network.as_ref()
    }

    /// Set the data network
    pub fn set_data_network(&mut self, dn: Arc<DataNetwork>) {
        self.data_network = Some(dn);
    }

    /// UE location when the session was created
    pub fn user_location(&self) -> &NrLocation {
        &self.user_location
    }

    /// Set the location snapshot
    pub fn set_user_location(&mut self, location: NrLocation) {
        self.user_location = location;
    }

    /// Session type
    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// Set the session type
    pub fn set_session_type(&mut self, session_type: SessionType) {
        self.session_type = session_type;
    }

    /// Procedure transaction identity of the establishment request
    pub fn pti(&self) -> u8 {
        self.pti
    }

    /// Set the procedure transaction identity
    pub fn set_pti(&mut self, pti: u8) {
        self.pti = pti;
    }

    /// Negotiated ePCO flags
    pub fn protocol_options(&self) -> &ProtocolConfigurationOptions {
        &self.protocol_options
    }

    /// Mutable access to the ePCO flags
    pub fn protocol_options_mut(&mut self) -> &mut ProtocolConfigurationOptions {
        &mut self.protocol_options
    }

    /// Policy rule of the session
    pub fn session_rule(&self) -> Option<&Arc<SessionRule>> {
        self.session_rule.as_ref()
    }

    /// Set the policy rule
    pub fn set_session_rule(&mut self, rule: Arc<SessionRule>) {
        self.session_rule = Some(rule);
    }

    /// Default QoS flow identifier
    pub fn default_qfi(&self) -> u8 {
        self.default_qfi
    }

    /// Set the default QoS flow identifier
    pub fn set_default_qfi(&mut self, qfi: u8) {
        self.default_qfi = qfi;
    }

    /// PDU address in its NAS form: a 12-byte buffer and the PDU address IE
    /// length (address bytes plus the type octet).
    ///
    /// IPv4 fills bytes 0..4 (length 5). IPv4v6 puts an interface identifier
    /// derived from the IPv4 address in bytes 0..8 and the address in 8..12
    /// (length 13). IPv6-only sessions have no address to render and yield a
    /// zeroed buffer with length 0, as does a context without an address.
    pub fn address_to_nas(&self) -> ([u8; PDU_ADDRESS_LEN], u8) {
        let mut buf = [0u8; PDU_ADDRESS_LEN];
        let Some(addr) = self.pdu_address else {
            return (buf, 0);
        };
        let octets = addr.octets();
        match self.session_type {
            SessionType::Ipv4 => {
                buf[..4].copy_from_slice(&octets);
                (buf, 4 + 1)
            }
            SessionType::Ipv4v6 => {
                buf[4..8].copy_from_slice(&octets);
                buf[8..12].copy_from_slice(&octets);
                (buf, 12 + 1)
            }
            SessionType::Ipv6 => (buf, 0),
        }
    }
}
