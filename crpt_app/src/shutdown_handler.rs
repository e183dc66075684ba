use crpt_ratelimit::CancellationToken;

/// Sets up a Ctrl+C handler that cancels `token` on shutdown signal
///
/// Submissions still waiting for a permit give up; calls already on the wire finish.
pub fn setup(token: CancellationToken) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        token.cancel();
    })
}
