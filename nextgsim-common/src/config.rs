//! Configuration of the simulated 5G core
//!
//! The core is configured from YAML. A minimal file looks like:
//!
//! ```yaml
//! plmn:
//!   mcc: 1
//!   mnc: 1
//! dnn_list: [internet, ims]
//! data_networks:
//!   - dnn: internet
//!     dns_ipv4: 8.8.8.8
//!     mtu: 1400
//!   - dnn: ims
//!     pcscf_ipv4: 10.255.0.10
//! session_rules:
//!   - id: default
//!     ambr_uplink_kbps: 100000
//!     ambr_downlink_kbps: 200000
//!     default_5qi: 9
//! ue_address_pool:
//!   subnet: 10.0.0.0/8
//!   last_allocated: 10.0.0.0
//! ```

use std::fmt;
use std::fs;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Plmn;

/// Default DNN served by the simulated core.
pub const DEFAULT_DNN: &str = "internet";

/// Default UE address block.
pub const DEFAULT_UE_SUBNET: &str = "10.0.0.0/8";

/// An IPv4 address block in CIDR notation (e.g. `10.0.0.0/8`).
///
/// The network address is normalised on parse, so `10.1.2.3/8` becomes `10.0.0.0/8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Block {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Block {
    /// Creates a block, masking `network` down to `prefix_len` bits.
    ///
    /// Returns None if `prefix_len` is greater than 32.
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Option<Self> {
        if prefix_len > 32 {
            return None;
        }
        let masked = u32::from(network) & Self::mask(prefix_len);
        Some(Self {
            network: Ipv4Addr::from(masked),
            prefix_len,
        })
    }

    /// Network address of the block
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length in bits
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true if `addr` lies inside the block.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & Self::mask(self.prefix_len) == u32::from(self.network)
    }

    fn mask(prefix_len: u8) -> u32 {
        match prefix_len {
            0 => 0,
            n => u32::MAX << (32 - u32::from(n)),
        }
    }
}

impl fmt::Display for Ipv4Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Ipv4Block {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| Error::Config(format!("missing prefix length in subnet '{s}'")))?;
        let network: Ipv4Addr = addr
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid subnet address '{addr}'")))?;
        let prefix_len: u8 = len
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid prefix length '{len}'")))?;
        Self::new(network, prefix_len)
            .ok_or_else(|| Error::Config(format!("prefix length {prefix_len} exceeds 32")))
    }
}

impl TryFrom<String> for Ipv4Block {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ipv4Block> for String {
    fn from(block: Ipv4Block) -> Self {
        block.to_string()
    }
}

/// Descriptor of a data network reachable through the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNetworkConfig {
    /// Data network name (e.g. "internet")
    pub dnn: String,
    /// DNS server offered to IPv4 sessions
    #[serde(default)]
    pub dns_ipv4: Option<Ipv4Addr>,
    /// DNS server offered to IPv6 sessions
    #[serde(default)]
    pub dns_ipv6: Option<Ipv6Addr>,
    /// P-CSCF offered to IPv4 sessions
    #[serde(default)]
    pub pcscf_ipv4: Option<Ipv4Addr>,
    /// IPv4 link MTU
    #[serde(default)]
    pub mtu: Option<u16>,
}

impl DataNetworkConfig {
    /// Creates a descriptor with no upstream parameters.
    pub fn new(dnn: impl Into<String>) -> Self {
        Self {
            dnn: dnn.into(),
            dns_ipv4: None,
            dns_ipv6: None,
            pcscf_ipv4: None,
            mtu: None,
        }
    }
}

/// Session management policy rule applied to new PDU sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRuleConfig {
    /// Rule identifier
    pub id: String,
    /// Session AMBR uplink in kbps
    pub ambr_uplink_kbps: u32,
    /// Session AMBR downlink in kbps
    pub ambr_downlink_kbps: u32,
    /// 5QI of the default QoS flow
    #[serde(default = "default_5qi")]
    pub default_5qi: u8,
}

fn default_5qi() -> u8 {
    9
}

impl Default for SessionRuleConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            ambr_uplink_kbps: 1_000_000,
            ambr_downlink_kbps: 1_000_000,
            default_5qi: default_5qi(),
        }
    }
}

/// UE address pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPoolConfig {
    /// Block UE addresses are drawn from
    pub subnet: Ipv4Block,
    /// Address the allocation cursor starts after
    pub last_allocated: Ipv4Addr,
}

impl Default for AddressPoolConfig {
    fn default() -> Self {
        let subnet = Ipv4Block {
            network: Ipv4Addr::new(10, 0, 0, 0),
            prefix_len: 8,
        };
        Self {
            subnet,
            last_allocated: subnet.network(),
        }
    }
}

/// Configuration of the simulated 5G core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Serving PLMN
    pub plmn: Plmn,
    /// Configured DNNs in preference order; the first one is the default
    pub dnn_list: Vec<String>,
    /// Data network descriptors
    #[serde(default)]
    pub data_networks: Vec<DataNetworkConfig>,
    /// Session management rules; the first one applies to new sessions
    pub session_rules: Vec<SessionRuleConfig>,
    /// UE address pool
    #[serde(default)]
    pub ue_address_pool: AddressPoolConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            plmn: Plmn::new(1, 1, false),
            dnn_list: vec![DEFAULT_DNN.to_string()],
            data_networks: vec![DataNetworkConfig {
                dns_ipv4: Some(Ipv4Addr::new(8, 8, 8, 8)),
                mtu: Some(1400),
                ..DataNetworkConfig::new(DEFAULT_DNN)
            }],
            session_rules: vec![SessionRuleConfig::default()],
            ue_address_pool: AddressPoolConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Parses a core configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a core configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the configuration to a YAML string.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validates the configuration.
    ///
    /// # Validation Rules
    ///
    /// - At least one DNN must be configured
    /// - At least one session rule must be configured
    /// - The pool cursor must lie inside the pool subnet
    ///
    /// A DNN without a descriptor is accepted here; it fails when a session
    /// is established against it.
    pub fn validate(&self) -> Result<(), Error> {
        if self.dnn_list.is_empty() {
            return Err(Error::Config("dnn_list must not be empty".to_string()));
        }
        if self.session_rules.is_empty() {
            return Err(Error::Config("session_rules must not be empty".to_string()));
        }
        let dnns = self
            .dnn_list
            .iter()
            .chain(self.data_networks.iter().map(|dn| &dn.dnn));
        for dnn in dnns {
            validate_dnn(dnn)?;
        }
        let pool = &self.ue_address_pool;
        if !pool.subnet.contains(pool.last_allocated) {
            return Err(Error::Config(format!(
                "last_allocated {} is outside subnet {}",
                pool.last_allocated, pool.subnet
            )));
        }
        Ok(())
    }
}

/// Longest DNN label (TS 23.003 9.1)
pub const MAX_DNN_LABEL_LEN: usize = 63;

/// Checks that every label of a dotted DNN fits its one-octet length prefix.
pub fn validate_dnn(dnn: &str) -> Result<(), Error> {
    if let Some(label) = dnn
        .split('.')
        .find(|label| label.is_empty() || label.len() > MAX_DNN_LABEL_LEN)
    {
        return Err(Error::Config(format!(
            "DNN {dnn:?} has a label of {} octets, expected 1 to {MAX_DNN_LABEL_LEN}",
            label.len()
        )));
    }
    Ok(())
}
