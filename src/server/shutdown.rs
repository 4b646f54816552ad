// Shutdown module
// Waits for in-flight connections after the listener has been closed

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::logger;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until no connection is active or `grace` has elapsed.
///
/// Returns the number of connections still open when waiting stopped.
pub async fn drain_connections(conn_counter: &AtomicUsize, grace: Duration) -> usize {
    let active = conn_counter.load(Ordering::SeqCst);
    if active == 0 {
        return 0;
    }
    logger::log_shutdown(active);

    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let active = conn_counter.load(Ordering::SeqCst);
        if active == 0 {
            logger::log_info("All connections closed");
            return 0;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Grace period of {}s elapsed with {active} connection(s) still open",
                grace.as_secs()
            ));
            return active;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
