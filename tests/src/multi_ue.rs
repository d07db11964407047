//! Multiple UE scenario integration tests
//!
//! Tests concurrent PDU session establishment over one shared core:
//! - Independent session tables per UE
//! - Unique UE addresses across all UEs
//! - Per-UE serialisation of session identities

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

use integration_tests::{
    expect_accept, init_test_logging, wait_for_condition, TestCoreConfig, TestResult,
    TestUeConfig, UlNasBuilder, DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};
use nextgsim_5gc::{ErrorKind, FiveGc, UeContext};

fn imsi(i: usize) -> String {
    format!("0010100000000{:02}", i + 1)
}

async fn establish_all(
    core: Arc<FiveGc>,
    ue: Arc<UeContext>,
    sessions: u8,
) -> TestResult<Vec<Ipv4Addr>> {
    let mut addrs = Vec::new();
    for psi in 1..=sessions {
        let reply = core.handle_ul_nas_transport(&ue, &UlNasBuilder::new(psi).build())?;
        let accept = expect_accept(&reply)?;
        let addr = accept.pdu_address.ok_or("missing PDU address")?.address;
        addrs.push(Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3]));
    }
    Ok(addrs)
}

/// Test multiple UE registration with the core
#[tokio::test]
async fn test_multiple_ue_registration() {
    init_test_logging();

    let core = TestCoreConfig::default().build();
    let num_ues = 10;
    for i in 0..num_ues {
        core.add_ue(TestUeConfig::default().with_imsi(&imsi(i)).to_context());
    }
    assert_eq!(core.ue_count(), num_ues);

    for i in 0..num_ues {
        let supi = format!("imsi-{}", imsi(i));
        let ue = core.ue(&supi).expect("UE context not found");
        assert_eq!(ue.supi(), supi);
        assert_eq!(ue.session_count(), 0);
    }

    assert!(core.remove_ue("imsi-001010000000001").is_some());
    assert_eq!(core.ue_count(), num_ues - 1);
}

/// Test concurrent establishments from many UEs
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pdu_sessions() -> TestResult {
    init_test_logging();

    let core = Arc::new(TestCoreConfig::default().build());
    let num_ues = 16;
    let sessions_per_ue = 4u8;

    let mut handles = Vec::new();
    for i in 0..num_ues {
        let core = Arc::clone(&core);
        let ue = core.add_ue(TestUeConfig::default().with_imsi(&imsi(i)).to_context());
        handles.push(tokio::spawn(establish_all(core, ue, sessions_per_ue)));
    }

    let mut all = HashSet::new();
    for handle in handles {
        for addr in handle.await?? {
            assert!(all.insert(addr), "address {addr} handed out twice");
        }
    }
    assert_eq!(all.len(), num_ues * usize::from(sessions_per_ue));

    for i in 0..num_ues {
        let ue = core.ue(&format!("imsi-{}", imsi(i))).ok_or("UE missing")?;
        assert_eq!(ue.session_ids(), (1..=sessions_per_ue).collect::<Vec<_>>());
    }
    Ok(())
}

/// Test concurrent establishments from blocking OS threads
#[tokio::test]
async fn test_concurrent_pdu_sessions_from_threads() -> TestResult {
    init_test_logging();

    let core = Arc::new(TestCoreConfig::default().build());
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let threads: Vec<_> = (1..=15u8)
        .map(|psi| {
            let core = Arc::clone(&core);
            let ue = Arc::clone(&ue);
            std::thread::spawn(move || {
                core.establish_pdu_session(&ue, &UlNasBuilder::new(psi).transport(), psi)
            })
        })
        .collect();

    wait_for_condition(
        || threads.iter().all(|t| t.is_finished()),
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await?;

    let mut addrs = HashSet::new();
    for t in threads {
        let session = t.join().map_err(|_| "establishment thread panicked")??;
        assert!(addrs.insert(session.pdu_address().ok_or("no address")?));
    }
    assert_eq!(ue.session_count(), 15);
    assert_eq!(
        core.session_service().address_pool().last_allocated(),
        Ipv4Addr::new(10, 45, 0, 16)
    );
    Ok(())
}

/// Test that racing requests for one identity leave exactly one session
#[tokio::test]
async fn test_racing_same_psi() -> TestResult {
    init_test_logging();

    let core: Arc<FiveGc> = Arc::new(TestCoreConfig::default().build());
    let ue = core.add_ue(TestUeConfig::default().to_context());

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let core = Arc::clone(&core);
            let ue = Arc::clone(&ue);
            std::thread::spawn(move || {
                core.establish_pdu_session(&ue, &UlNasBuilder::new(7).transport(), 7)
            })
        })
        .collect();

    let mut established = 0;
    for t in threads {
        match t.join().map_err(|_| "establishment thread panicked")? {
            Ok(_) => established += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
        }
    }
    assert_eq!(established, 1);
    assert_eq!(ue.session_ids(), vec![7]);
    Ok(())
}
