//! 5GSM replies to a PDU Session Establishment Request

use nextgsim_nas::epco::{
    DNS_SERVER_IPV4_ADDRESS, DNS_SERVER_IPV6_ADDRESS, IPV4_LINK_MTU, PCSCF_IPV4_ADDRESS,
};
use nextgsim_nas::{
    ExtendedProtocolConfigurationOptions, IeDnn, IePduAddress, IeQosFlowDescriptions, IeQosRules,
    IeSessionAmbr,
    PduSessionEstablishmentAccept, PduSessionEstablishmentReject, PduSessionType,
    ProtocolContainer, SscMode,
};

use crate::context::SessionContext;
use crate::error::EstablishmentError;
use crate::service::DataNetwork;

/// Build the accept for an established session
pub fn build_establishment_accept(ctx: &SessionContext) -> PduSessionEstablishmentAccept {
    let session_type = PduSessionType::from(ctx.session_type());

    let (addr, len) = ctx.address_to_nas();
    let pdu_address = (len > 0)
        .then(|| IePduAddress::new(session_type, addr[..usize::from(len) - 1].to_vec()));

    let session_ambr = ctx
        .session_rule()
        .map(|rule| IeSessionAmbr::from_kbps(rule.ambr_downlink_kbps, rule.ambr_uplink_kbps))
        .unwrap_or_default();

    let dn = ctx.data_network();

    PduSessionEstablishmentAccept {
        pdu_session_id: ctx.session_id(),
        pti: ctx.pti(),
        selected_pdu_session_type: session_type,
        selected_ssc_mode: SscMode::SscMode1,
        authorized_qos_rules: IeQosRules::default_rule(ctx.default_qfi()),
        session_ambr,
        sm_cause: None,
        pdu_address,
        s_nssai: Some(ctx.snssai().encode()),
        authorized_qos_flow_descriptions: ctx
            .session_rule()
            .map(|rule| IeQosFlowDescriptions::default_flow(ctx.default_qfi(), rule.default_5qi)),
        extended_protocol_configuration_options: dn
            .and_then(|dn| answer_options(ctx, dn))
            .map(|epco| epco.to_bytes()),
        dnn: dn.map(|dn| IeDnn::from_string(&dn.dnn)),
    }
}

/// Build the reject for a failed establishment
pub fn build_establishment_reject(
    psi: u8,
    pti: u8,
    err: &EstablishmentError,
) -> PduSessionEstablishmentReject {
    PduSessionEstablishmentReject::new(psi, pti, err.sm_cause())
}

// Only requested options the data network has a value for are answered.
fn answer_options(
    ctx: &SessionContext,
    dn: &DataNetwork,
) -> Option<ExtendedProtocolConfigurationOptions> {
    let requested = ctx.protocol_options();
    let mut epco = ExtendedProtocolConfigurationOptions::new();

    if let Some(dns) = dn.dns_ipv6.filter(|_| requested.dns_ipv6_request) {
        epco.push(ProtocolContainer::new(DNS_SERVER_IPV6_ADDRESS, dns.octets().to_vec()));
    }
    if let Some(pcscf) = dn.pcscf_ipv4.filter(|_| requested.pcscf_ipv4_request) {
        epco.push(ProtocolContainer::new(PCSCF_IPV4_ADDRESS, pcscf.octets().to_vec()));
    }
    if let Some(dns) = dn.dns_ipv4.filter(|_| requested.dns_ipv4_request) {
        epco.push(ProtocolContainer::new(DNS_SERVER_IPV4_ADDRESS, dns.octets().to_vec()));
    }
    if let Some(mtu) = dn.mtu.filter(|_| requested.ipv4_link_mtu_request) {
        epco.push(ProtocolContainer::new(IPV4_LINK_MTU, mtu.to_be_bytes().to_vec()));
    }

    (!epco.containers.is_empty()).then_some(epco)
}
