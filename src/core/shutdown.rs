//! Ctrl+C handling.

use super::CancelToken;

/// Install the Ctrl+C handler. Call once at program start.
///
/// The first Ctrl+C cancels `token`, letting an in-progress build unwind
/// through its normal error path. A second one exits immediately.
pub fn setup_shutdown_handler(token: CancelToken) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130);
        }
        token.cancel();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}
