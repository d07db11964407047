//! Session service: the DNN list, data networks, session rules and the
//! UE address pool shared by every PDU session of the core.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use nextgsim_common::{validate_dnn, CoreConfig, DataNetworkConfig, Error, SessionRuleConfig};

use crate::error::ResolutionError;
use crate::pool::AddressPool;

/// A data network reachable through the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataNetwork {
    /// Data network name
    pub dnn: String,
    /// DNS server offered on request
    pub dns_ipv4: Option<Ipv4Addr>,
    /// IPv6 DNS server offered on request
    pub dns_ipv6: Option<Ipv6Addr>,
    /// P-CSCF offered on request
    pub pcscf_ipv4: Option<Ipv4Addr>,
    /// IPv4 link MTU offered on request
    pub mtu: Option<u16>,
}

impl From<DataNetworkConfig> for DataNetwork {
    fn from(c: DataNetworkConfig) -> Self {
        Self {
            dnn: c.dnn,
            dns_ipv4: c.dns_ipv4,
            dns_ipv6: c.dns_ipv6,
            pcscf_ipv4: c.pcscf_ipv4,
            mtu: c.mtu,
        }
    }
}

/// Session management policy rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRule {
    /// Rule identifier
    pub id: String,
    /// Session AMBR uplink in kbps
    pub ambr_uplink_kbps: u32,
    /// Session AMBR downlink in kbps
    pub ambr_downlink_kbps: u32,
    /// 5QI of the default QoS flow
    pub default_5qi: u8,
}

impl From<SessionRuleConfig> for SessionRule {
    fn from(c: SessionRuleConfig) -> Self {
        Self {
            id: c.id,
            ambr_uplink_kbps: c.ambr_uplink_kbps,
            ambr_downlink_kbps: c.ambr_downlink_kbps,
            default_5qi: c.default_5qi,
        }
    }
}

/// Registry of session parameters owned by the core
#[derive(Debug)]
pub struct SessionService {
    dnn_list: Vec<String>,
    data_networks: HashMap<String, Arc<DataNetwork>>,
    session_rules: Vec<Arc<SessionRule>>,
    pool: AddressPool,
}

impl SessionService {
    /// Create a service.
    ///
    /// `dnn_list` and `session_rules` must not be empty.
    pub fn new(
        dnn_list: Vec<String>,
        data_networks: Vec<DataNetwork>,
        session_rules: Vec<SessionRule>,
        pool: AddressPool,
    ) -> Result<Self, Error> {
        if dnn_list.is_empty() {
            return Err(Error::Config("dnn_list must not be empty".to_string()));
        }
        if session_rules.is_empty() {
            return Err(Error::Config("session_rules must not be empty".to_string()));
        }
        for dnn in dnn_list.iter().chain(data_networks.iter().map(|dn| &dn.dnn)) {
            validate_dnn(dnn)?;
        }
        Ok(Self {
            dnn_list,
            data_networks: data_networks
                .into_iter()
                .map(|dn| (dn.dnn.clone(), Arc::new(dn)))
                .collect(),
            session_rules: session_rules.into_iter().map(Arc::new).collect(),
            pool,
        })
    }

    /// Build the service from a validated core configuration
    pub fn from_config(config: &CoreConfig) -> Result<Self, Error> {
        config.validate()?;
        let pool = AddressPool::from_config(&config.ue_address_pool)
            .map_err(|e| Error::Config(e.to_string()))?;
        Self::new(
            config.dnn_list.clone(),
            config.data_networks.iter().cloned().map(DataNetwork::from).collect(),
            config.session_rules.iter().cloned().map(SessionRule::from).collect(),
            pool,
        )
    }

    /// Configured DNNs in preference order
    pub fn dnn_list(&self) -> &[String] {
        &self.dnn_list
    }

    /// DNN used when the UE does not name one
    pub fn default_dnn(&self) -> &str {
        &self.dnn_list[0]
    }

    /// True if `dnn` is in the configured list
    pub fn is_configured_dnn(&self, dnn: &str) -> bool {
        self.dnn_list.iter().any(|d| d == dnn)
    }

    /// Resolve a DNN to its data network descriptor
    pub fn resolve(&self, dnn: &str) -> Result<Arc<DataNetwork>, ResolutionError> {
        self.data_networks
            .get(dnn)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownDataNetwork(dnn.to_string()))
    }

    /// Session rules in table order
    pub fn session_rules(&self) -> &[Arc<SessionRule>] {
        &self.session_rules
    }

    /// Rule applied to every new session
    pub fn first_rule(&self) -> &Arc<SessionRule> {
        &self.session_rules[0]
    }

    /// UE address pool
    pub fn address_pool(&self) -> &AddressPool {
        &self.pool
    }
}
