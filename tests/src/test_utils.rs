//! Test utility functions for integration tests
//!
//! Logging setup, polling, and unwrapping of the core's NAS replies.

use std::time::Duration;

use nextgsim_nas::{
    decode_sm_message, DlNasTransport, PduSessionEstablishmentAccept,
    PduSessionEstablishmentReject, SmMessage,
};
use tokio::time::{sleep, timeout};
use tracing_subscriber::{fmt, EnvFilter};

/// Result type for integration tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize logging for tests
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Wait for a condition to become true, polling every `poll_interval`
pub async fn wait_for_condition<F>(
    mut condition: F,
    timeout_duration: Duration,
    poll_interval: Duration,
) -> TestResult
where
    F: FnMut() -> bool,
{
    let result = timeout(timeout_duration, async {
        while !condition() {
            sleep(poll_interval).await;
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => Err("Condition not met within timeout".into()),
    }
}

/// Default timeout for test operations
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default poll interval for condition checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Decode the 5GSM payload of a DL NAS Transport, expecting an accept
pub fn expect_accept(reply: &DlNasTransport) -> TestResult<PduSessionEstablishmentAccept> {
    match decode_sm_message(&reply.payload_container)? {
        SmMessage::EstablishmentAccept(accept) => Ok(accept),
        other => Err(format!("expected accept, got {:?}", other.message_type()).into()),
    }
}

/// Decode the 5GSM payload of a DL NAS Transport, expecting a reject
pub fn expect_reject(reply: &DlNasTransport) -> TestResult<PduSessionEstablishmentReject> {
    match decode_sm_message(&reply.payload_container)? {
        SmMessage::EstablishmentReject(reject) => Ok(reject),
        other => Err(format!("expected reject, got {:?}", other.message_type()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_wait_for_condition_success() {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();

        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            flag_clone.store(true, Ordering::SeqCst);
        });

        let result = wait_for_condition(
            || flag.load(Ordering::SeqCst),
            Duration::from_secs(1),
            Duration::from_millis(10),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_condition_timeout() {
        let result =
            wait_for_condition(|| false, Duration::from_millis(100), Duration::from_millis(10))
                .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_expect_accept_rejects_other_messages() {
        let reject = PduSessionEstablishmentReject::new(1, 1, Default::default());
        let reply = DlNasTransport::n1_sm(1, reject.to_bytes());
        assert!(expect_accept(&reply).is_err());
        assert!(expect_reject(&reply).is_ok());
    }
}
