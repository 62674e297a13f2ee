use crate::app::SharedState;
use crate::config::{self, AppConfig};

/// Foundation init: environment and configuration (fatal on error).
pub fn init_foundation() -> Result<AppConfig, anyhow::Error> {
    config::load_dotenv();
    let config = AppConfig::load()?;
    tracing::info!(
        port = config.server_port,
        notifications = config.notifications_enabled,
        worker = config.worker_enabled,
        "Settings loaded"
    );
    Ok(config)
}

/// Register the background worker script. A failed registration is logged
/// and leaves dispatch reporting `dropped`.
pub async fn init_worker(state: SharedState) {
    if !state.config().worker_enabled {
        tracing::info!("Background worker disabled; skipping registration");
        return;
    }
    match service_worker::register_default(state.container(), state.worker_host()).await {
        Ok(()) => tracing::info!(
            registration = state.container().state().as_str(),
            "Background worker registered"
        ),
        Err(e) => tracing::error!("SW registration failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use service_worker::RegistrationState;

    use super::*;

    fn state(worker_enabled: bool) -> SharedState {
        SharedState::new(AppConfig {
            worker_enabled,
            open_browser: false,
            ..AppConfig::default()
        })
    }

    #[tokio::test]
    async fn init_worker_registers_the_worker_script() {
        let state = state(true);
        init_worker(state.clone()).await;

        let handle = tokio::time::timeout(Duration::from_secs(1), state.container().ready())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(handle.generation(), 1);
        assert!(state.container().state().is_ready());
    }

    #[tokio::test]
    async fn disabled_worker_is_not_registered() {
        let state = state(false);
        init_worker(state.clone()).await;
        assert_eq!(state.container().state(), RegistrationState::Unregistered);
    }
}
