//! PDU Session integration tests
//!
//! Drives PDU session establishment through the core with encoded NAS
//! messages and checks the registered context and the 5GSM reply.

use std::net::Ipv4Addr;

use integration_tests::{
    expect_accept, expect_reject, init_test_logging, TestConfig, TestCoreConfig, TestResult,
    TestUeConfig, UlNasBuilder,
};
use nextgsim_5gc::{DecodeError, ErrorKind, EstablishmentError, SessionType};
use nextgsim_common::SNssai;
use nextgsim_nas::epco::{
    DNS_SERVER_IPV4_ADDRESS, DNS_SERVER_IPV4_ADDRESS_REQUEST, DNS_SERVER_IPV6_ADDRESS_REQUEST,
    IPV4_LINK_MTU, IPV4_LINK_MTU_REQUEST, PCSCF_IPV4_ADDRESS, PCSCF_IPV4_ADDRESS_REQUEST,
};
use nextgsim_nas::{
    ExtendedProtocolConfigurationOptions, PduSessionType, SmCause, SmMessageType, UlNasTransport,
};

/// Test PDU session establishment with every default applied
#[tokio::test]
async fn test_pdu_session_establishment_defaults() -> TestResult {
    init_test_logging();

    let config = TestConfig::default();
    let core = config.core.build();
    let ue = core.add_ue(config.ue.to_context());

    let reply = core.handle_ul_nas_transport(&ue, &UlNasBuilder::new(1).with_pti(5).build())?;
    assert_eq!(reply.pdu_session_id, Some(1));

    let accept = expect_accept(&reply)?;
    assert_eq!(accept.pti, 5);
    assert_eq!(accept.selected_pdu_session_type, PduSessionType::Ipv4);
    assert_eq!(accept.pdu_address.map(|a| a.address), Some(vec![10, 45, 0, 2]));
    assert_eq!(accept.s_nssai, Some(config.ue.default_snssai.encode()));
    assert_eq!(accept.dnn.map(|d| d.to_dnn_string()).transpose()?, Some("internet".into()));
    assert!(accept.extended_protocol_configuration_options.is_none());
    let flows = accept.authorized_qos_flow_descriptions.ok_or("missing QoS flow descriptions")?;
    assert_eq!(flows.five_qi(1), Some(9));

    let session = ue.session(1).ok_or("session not registered")?;
    assert_eq!(session.snssai(), config.ue.default_snssai);
    assert_eq!(session.data_network().map(|dn| dn.dnn.as_str()), Some("internet"));
    assert_eq!(session.session_rule().map(|r| r.id.as_str()), Some("internet-default"));
    assert_eq!(session.default_qfi(), 1);
    assert_eq!(session.user_location(), &config.ue.location());
    Ok(())
}

/// Test explicit slice and DNN selection
#[tokio::test]
async fn test_pdu_session_explicit_slice_and_dnn() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let msg = UlNasBuilder::new(2)
        .with_snssai(SNssai::new(2))
        .with_dnn("ims")
        .with_epco_requests(&[PCSCF_IPV4_ADDRESS_REQUEST, DNS_SERVER_IPV4_ADDRESS_REQUEST])
        .build();
    let accept = expect_accept(&core.handle_ul_nas_transport(&ue, &msg)?)?;
    assert_eq!(accept.s_nssai, Some(vec![2]));

    // ims has no DNS server, so only the P-CSCF is answered
    let epco = ExtendedProtocolConfigurationOptions::decode(
        accept
            .extended_protocol_configuration_options
            .as_deref()
            .ok_or("missing ePCO")?,
    )?;
    assert_eq!(epco.container_ids().collect::<Vec<_>>(), vec![PCSCF_IPV4_ADDRESS]);
    assert_eq!(epco.containers[0].contents, vec![10, 100, 0, 10]);

    let session = ue.session(2).ok_or("session not registered")?;
    assert_eq!(session.snssai(), SNssai::new(2));
    assert!(session.protocol_options().pcscf_ipv4_request);
    assert!(session.protocol_options().dns_ipv4_request);
    Ok(())
}

/// Test that requested DNS and MTU options are recorded and answered
#[tokio::test]
async fn test_pdu_session_epco_negotiation() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let msg = UlNasBuilder::new(1)
        .with_epco_requests(&[
            DNS_SERVER_IPV6_ADDRESS_REQUEST,
            IPV4_LINK_MTU_REQUEST,
            DNS_SERVER_IPV4_ADDRESS_REQUEST,
            0x0001,
        ])
        .build();
    let accept = expect_accept(&core.handle_ul_nas_transport(&ue, &msg)?)?;

    let opts = *ue.session(1).ok_or("session not registered")?.protocol_options();
    assert!(opts.dns_ipv6_request);
    assert!(opts.ipv4_link_mtu_request);
    assert!(opts.dns_ipv4_request);
    assert!(!opts.pcscf_ipv4_request);

    let epco = ExtendedProtocolConfigurationOptions::decode(
        accept
            .extended_protocol_configuration_options
            .as_deref()
            .ok_or("missing ePCO")?,
    )?;
    let ids: Vec<u16> = epco.container_ids().collect();
    assert!(ids.contains(&DNS_SERVER_IPV4_ADDRESS));
    assert!(ids.contains(&IPV4_LINK_MTU));
    assert_eq!(ids.len(), 3);
    Ok(())
}

/// Test dual-stack address rendering in the accept
#[tokio::test]
async fn test_pdu_session_ipv4v6() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let msg = UlNasBuilder::new(1)
        .with_session_type(Some(PduSessionType::Ipv4v6))
        .build();
    let accept = expect_accept(&core.handle_ul_nas_transport(&ue, &msg)?)?;
    let addr = accept.pdu_address.ok_or("missing PDU address")?;
    assert_eq!(addr.session_type, PduSessionType::Ipv4v6);
    assert_eq!(addr.address, vec![0, 0, 0, 0, 10, 45, 0, 2, 10, 45, 0, 2]);

    let session = ue.session(1).ok_or("session not registered")?;
    assert_eq!(session.session_type(), SessionType::Ipv4v6);
    assert_eq!(session.address_to_nas().1, 13);
    Ok(())
}

/// Test rejection of an unconfigured DNN
#[tokio::test]
async fn test_pdu_session_unknown_dnn_rejected() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let msg = UlNasBuilder::new(1).with_pti(3).with_dnn("enterprise").build();
    let reject = expect_reject(&core.handle_ul_nas_transport(&ue, &msg)?)?;
    assert_eq!(reject.pti, 3);
    assert_eq!(reject.sm_cause, SmCause::MissingOrUnknownDnn);
    assert_eq!(ue.session_count(), 0);
    assert_eq!(
        core.session_service().address_pool().last_allocated(),
        Ipv4Addr::new(10, 45, 0, 1)
    );
    Ok(())
}

/// Test a listed DNN without a data network descriptor
#[tokio::test]
async fn test_pdu_session_unresolvable_dnn() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().with_unresolvable_dnn("iot").build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let transport = UlNasBuilder::new(1).with_dnn("iot").transport();
    let err = core
        .establish_pdu_session(&ue, &transport, 1)
        .expect_err("iot has no descriptor");
    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert_eq!(ue.session_count(), 0);
    Ok(())
}

/// Test rejection of a 5GSM message that is not an establishment request
#[tokio::test]
async fn test_pdu_session_wrong_message_type() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let mut transport = UlNasBuilder::new(1).transport();
    // Rewrite the message type octet of the 5GSM header
    transport.payload_container[3] = u8::from(SmMessageType::PduSessionModificationRequest);

    let err = core
        .establish_pdu_session(&ue, &transport, 1)
        .expect_err("modification request must not establish");
    assert_eq!(
        err,
        EstablishmentError::Decode(DecodeError::UnexpectedMessageType(
            SmMessageType::PduSessionModificationRequest
        ))
    );
    assert_eq!(ue.session_count(), 0);
    Ok(())
}

/// Test that a malformed ePCO consumes an address without registering a session
#[tokio::test]
async fn test_pdu_session_malformed_epco() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let msg = UlNasBuilder::new(1).with_raw_epco(vec![0x80, 0x00, 0x0D]).build();
    let reject = expect_reject(&core.handle_ul_nas_transport(&ue, &msg)?)?;
    assert_eq!(reject.sm_cause, SmCause::SemanticallyIncorrectMessage);
    assert_eq!(ue.session_count(), 0);
    assert_eq!(
        core.session_service().address_pool().last_allocated(),
        Ipv4Addr::new(10, 45, 0, 2)
    );

    let accept = expect_accept(&core.handle_ul_nas_transport(&ue, &UlNasBuilder::new(1).build())?)?;
    assert_eq!(accept.pdu_address.map(|a| a.address), Some(vec![10, 45, 0, 3]));
    Ok(())
}

/// Test malformed slice contents in the envelope
#[tokio::test]
async fn test_pdu_session_malformed_snssai() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let msg = UlNasBuilder::new(1).with_raw_snssai(vec![1, 2, 3]).build();
    let reject = expect_reject(&core.handle_ul_nas_transport(&ue, &msg)?)?;
    assert_eq!(reject.sm_cause, SmCause::SemanticallyIncorrectMessage);
    Ok(())
}

/// Test slices carrying a mapped home network S-NSSAI
#[tokio::test]
async fn test_pdu_session_roaming_snssai_forms() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let forms = [
        (1, vec![2, 1], SNssai::new(2)),
        (2, vec![1, 0, 0, 7, 1], SNssai::with_sd_u32(1, 7)),
        (3, vec![1, 0, 0, 7, 1, 0, 0, 9], SNssai::with_sd_u32(1, 7)),
    ];
    for (psi, raw, expected) in forms {
        let msg = UlNasBuilder::new(psi).with_raw_snssai(raw).build();
        let accept = expect_accept(&core.handle_ul_nas_transport(&ue, &msg)?)?;
        assert_eq!(accept.s_nssai, Some(expected.encode()));
        let session = ue.session(psi).ok_or("session not registered")?;
        assert_eq!(session.snssai(), expected);
    }
    assert_eq!(ue.session_count(), 3);
    Ok(())
}

/// Test a second establishment for an identity the UE already holds
#[tokio::test]
async fn test_pdu_session_duplicate_psi() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    expect_accept(&core.handle_ul_nas_transport(&ue, &UlNasBuilder::new(1).build())?)?;
    let reject =
        expect_reject(&core.handle_ul_nas_transport(&ue, &UlNasBuilder::new(1).with_pti(2).build())?)?;
    assert_eq!(reject.sm_cause, SmCause::InvalidPduSessionIdentity);
    assert_eq!(ue.session_count(), 1);
    Ok(())
}

/// Test multiple PDU sessions for one UE
#[tokio::test]
async fn test_multiple_pdu_sessions() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let mut last = 0u32;
    for psi in 1..=5 {
        let session = core.establish_pdu_session(&ue, &UlNasBuilder::new(psi).transport(), psi)?;
        let addr = u32::from(session.pdu_address().ok_or("no address")?);
        assert!(addr > last);
        last = addr;
    }
    assert_eq!(ue.session_ids(), vec![1, 2, 3, 4, 5]);

    let released = ue.remove_session(3).ok_or("session 3 missing")?;
    assert_eq!(released.session_id(), 3);
    assert_eq!(ue.session_ids(), vec![1, 2, 4, 5]);

    // A released address is not handed out again
    let session = core.establish_pdu_session(&ue, &UlNasBuilder::new(3).transport(), 3)?;
    assert_eq!(u32::from(session.pdu_address().ok_or("no address")?), last + 1);
    Ok(())
}

/// Test that later location updates do not reach an established session
#[tokio::test]
async fn test_pdu_session_location_snapshot() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let ue_config = TestUeConfig::default().with_tac(100);
    let ue = core.add_ue(ue_config.to_context());

    core.establish_pdu_session(&ue, &UlNasBuilder::new(1).transport(), 1)?;
    ue.update_location(ue_config.clone().with_tac(200).location());
    core.establish_pdu_session(&ue, &UlNasBuilder::new(2).transport(), 2)?;

    assert_eq!(ue.session(1).ok_or("missing")?.user_location().tai.tac, 100);
    assert_eq!(ue.session(2).ok_or("missing")?.user_location().tai.tac, 200);
    Ok(())
}

/// Test that pool exhaustion is reported and the core keeps serving
#[tokio::test]
async fn test_pdu_session_pool_exhaustion() -> TestResult {
    init_test_logging();

    let core = TestCoreConfig::default()
        .with_pool("192.168.0.0/30", Ipv4Addr::new(192, 168, 0, 1))
        .build();
    let ue = core.add_ue(TestUeConfig::default().to_context());

    for psi in 1..=2 {
        expect_accept(&core.handle_ul_nas_transport(&ue, &UlNasBuilder::new(psi).build())?)?;
    }
    let reject = expect_reject(&core.handle_ul_nas_transport(&ue, &UlNasBuilder::new(3).build())?)?;
    assert_eq!(reject.sm_cause, SmCause::InsufficientResources);

    let err = core
        .establish_pdu_session(&ue, &UlNasBuilder::new(4).transport(), 4)
        .expect_err("pool is exhausted");
    assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
    assert_eq!(ue.session_count(), 2);
    Ok(())
}

/// Test that a decoded envelope equals the one the builder produced
#[tokio::test]
async fn test_ul_nas_transport_wire_format() -> TestResult {
    let builder = UlNasBuilder::new(4).with_dnn("internet").with_snssai(SNssai::new(1));
    let decoded = UlNasTransport::decode_message(&builder.build())?;
    assert_eq!(decoded, builder.transport());
    Ok(())
}
