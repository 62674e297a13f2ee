use crate::app::SharedState;

pub async fn graceful_shutdown(state: &SharedState) {
    tracing::info!("Shutdown sequence started");

    state.shutdown_token().cancel();
    tracing::info!("Shutdown: server stop requested");

    state.container().unregister().await;
    tracing::info!("Shutdown: background worker stopped");

    tracing::info!("Shutdown sequence completed");
}
