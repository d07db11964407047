//! Test fixtures and configuration helpers
//!
//! Provides a core configuration with two data networks, UE configurations,
//! and a builder for UL NAS Transport messages carrying a PDU Session
//! Establishment Request.

use std::net::{Ipv4Addr, Ipv6Addr};

use nextgsim_5gc::{FiveGc, UeContext};
use nextgsim_common::{
    AddressPoolConfig, CoreConfig, DataNetworkConfig, Ncgi, NrLocation, Plmn, SNssai,
    SessionRuleConfig, Tai,
};
use nextgsim_nas::{
    ExtendedProtocolConfigurationOptions, IeDnn, PayloadContainerType,
    PduSessionEstablishmentRequest, PduSessionType, ProtocolContainer, RequestType,
    UlNasTransport,
};

/// Test configuration container
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Core configuration
    pub core: TestCoreConfig,
    /// UE configuration
    pub ue: TestUeConfig,
}

/// Test core configuration
#[derive(Debug, Clone)]
pub struct TestCoreConfig {
    /// Serving PLMN
    pub plmn: Plmn,
    /// Configured DNNs, first is the default
    pub dnn_list: Vec<String>,
    /// UE address pool
    pub pool: AddressPoolConfig,
}

impl Default for TestCoreConfig {
    fn default() -> Self {
        Self {
            plmn: Plmn::new(1, 1, false),
            dnn_list: vec!["internet".to_string(), "ims".to_string()],
            pool: AddressPoolConfig {
                subnet: "10.45.0.0/16".parse().expect("valid subnet"),
                last_allocated: Ipv4Addr::new(10, 45, 0, 1),
            },
        }
    }
}

impl TestCoreConfig {
    /// Use a custom UE address pool
    pub fn with_pool(mut self, subnet: &str, last_allocated: Ipv4Addr) -> Self {
        self.pool = AddressPoolConfig {
            subnet: subnet.parse().expect("valid subnet"),
            last_allocated,
        };
        self
    }

    /// Append a DNN without a data network descriptor
    pub fn with_unresolvable_dnn(mut self, dnn: &str) -> Self {
        self.dnn_list.push(dnn.to_string());
        self
    }

    /// Build the full core configuration.
    ///
    /// `internet` offers DNS v4/v6 and an MTU, `ims` offers a P-CSCF.
    pub fn to_core_config(&self) -> CoreConfig {
        CoreConfig {
            plmn: self.plmn,
            dnn_list: self.dnn_list.clone(),
            data_networks: vec![
                DataNetworkConfig {
                    dns_ipv4: Some(Ipv4Addr::new(8, 8, 8, 8)),
                    dns_ipv6: Some(Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888)),
                    mtu: Some(1400),
                    ..DataNetworkConfig::new("internet")
                },
                DataNetworkConfig {
                    pcscf_ipv4: Some(Ipv4Addr::new(10, 100, 0, 10)),
                    ..DataNetworkConfig::new("ims")
                },
            ],
            session_rules: vec![SessionRuleConfig {
                id: "internet-default".to_string(),
                ambr_uplink_kbps: 100_000,
                ambr_downlink_kbps: 200_000,
                ..SessionRuleConfig::default()
            }],
            ue_address_pool: self.pool.clone(),
        }
    }

    /// Build a core from this configuration
    pub fn build(&self) -> FiveGc {
        FiveGc::from_config(&self.to_core_config()).expect("valid test core configuration")
    }
}

/// Test UE configuration
#[derive(Debug, Clone)]
pub struct TestUeConfig {
    /// SUPI (IMSI)
    pub supi: String,
    /// Default slice of the subscription
    pub default_snssai: SNssai,
    /// Tracking area code
    pub tac: u32,
    /// Serving NR cell identity
    pub nr_cell_id: u64,
}

impl Default for TestUeConfig {
    fn default() -> Self {
        Self {
            supi: "imsi-001010000000001".to_string(),
            default_snssai: SNssai::with_sd_u32(1, 0x010203),
            tac: 1,
            nr_cell_id: 0x000000010,
        }
    }
}

impl TestUeConfig {
    /// Create a new test UE config with custom IMSI
    pub fn with_imsi(mut self, imsi: &str) -> Self {
        self.supi = format!("imsi-{imsi}");
        self
    }

    /// Set the serving tracking area
    pub fn with_tac(mut self, tac: u32) -> Self {
        self.tac = tac;
        self
    }

    /// Current location of the UE
    pub fn location(&self) -> NrLocation {
        let plmn = Plmn::new(1, 1, false);
        NrLocation::new(Tai::new(plmn, self.tac), Ncgi::new(plmn, self.nr_cell_id))
    }

    /// Create the UE context
    pub fn to_context(&self) -> UeContext {
        UeContext::new(self.supi.clone(), self.default_snssai, self.location())
    }
}

/// Builder for a UL NAS Transport carrying a PDU Session Establishment Request
#[derive(Debug, Clone)]
pub struct UlNasBuilder {
    psi: u8,
    pti: u8,
    session_type: Option<PduSessionType>,
    dnn: Option<String>,
    snssai: Option<Vec<u8>>,
    epco: Option<Vec<u8>>,
}

impl UlNasBuilder {
    /// Initial request for PDU session `psi`
    pub fn new(psi: u8) -> Self {
        Self {
            psi,
            pti: 1,
            session_type: Some(PduSessionType::Ipv4),
            dnn: None,
            snssai: None,
            epco: None,
        }
    }

    /// Set the procedure transaction identity
    pub fn with_pti(mut self, pti: u8) -> Self {
        self.pti = pti;
        self
    }

    /// Set or clear the requested PDU session type
    pub fn with_session_type(mut self, session_type: Option<PduSessionType>) -> Self {
        self.session_type = session_type;
        self
    }

    /// Name a DNN in the envelope
    pub fn with_dnn(mut self, dnn: &str) -> Self {
        self.dnn = Some(dnn.to_string());
        self
    }

    /// Name a slice in the envelope
    pub fn with_snssai(mut self, snssai: SNssai) -> Self {
        self.snssai = Some(snssai.encode());
        self
    }

    /// Put raw S-NSSAI contents in the envelope
    pub fn with_raw_snssai(mut self, contents: Vec<u8>) -> Self {
        self.snssai = Some(contents);
        self
    }

    /// Request ePCO containers by identifier
    pub fn with_epco_requests(mut self, ids: &[u16]) -> Self {
        let mut epco = ExtendedProtocolConfigurationOptions::new();
        for id in ids {
            epco.push(ProtocolContainer::request(*id));
        }
        self.epco = Some(epco.to_bytes());
        self
    }

    /// Put raw ePCO contents in the request
    pub fn with_raw_epco(mut self, contents: Vec<u8>) -> Self {
        self.epco = Some(contents);
        self
    }

    /// Encoded 5GSM request
    pub fn sm_message(&self) -> Vec<u8> {
        let mut req = PduSessionEstablishmentRequest::new(self.psi, self.pti);
        req.pdu_session_type = self.session_type;
        req.extended_protocol_configuration_options = self.epco.clone();
        let mut buf = Vec::new();
        req.encode(&mut buf);
        buf
    }

    /// UL NAS Transport message
    pub fn transport(&self) -> UlNasTransport {
        let mut transport =
            UlNasTransport::new(PayloadContainerType::N1SmInformation, self.sm_message());
        transport.pdu_session_id = Some(self.psi);
        transport.request_type = Some(RequestType::InitialRequest);
        transport.s_nssai = self.snssai.clone();
        transport.dnn = self.dnn.as_deref().map(IeDnn::from_string);
        transport
    }

    /// Encoded UL NAS Transport, header included
    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.transport().encode(&mut buf);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextgsim_nas::{decode_sm_message, SmMessage};

    #[test]
    fn test_core_config_is_valid() {
        let config = TestCoreConfig::default().to_core_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.dnn_list[0], "internet");
    }

    #[test]
    fn test_ue_config_with_imsi() {
        let ue = TestUeConfig::default().with_imsi("001010000000042").with_tac(7);
        assert_eq!(ue.supi, "imsi-001010000000042");
        assert_eq!(ue.location().tai.tac, 7);
    }

    #[test]
    fn test_builder_round_trips_through_nas() {
        let bytes = UlNasBuilder::new(3).with_pti(9).with_dnn("ims").build();
        let transport = UlNasTransport::decode_message(&bytes).unwrap();
        assert_eq!(transport.pdu_session_id, Some(3));
        assert_eq!(transport.dnn.unwrap().to_dnn_string().unwrap(), "ims");

        match decode_sm_message(&transport.payload_container).unwrap() {
            SmMessage::EstablishmentRequest(req) => {
                assert_eq!(req.pdu_session_id, 3);
                assert_eq!(req.pti, 9);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
