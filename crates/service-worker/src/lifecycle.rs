//! Worker lifecycle and registration states.

use serde::Serialize;

/// Lifecycle of a single worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Installing,
    Active,
    Controlling,
}

/// State of the page's registration, as published to `ready()` waiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum RegistrationState {
    Unregistered,
    Installing,
    Active,
    Controlling,
    Failed(String),
}

impl RegistrationState {
    /// Active or controlling: messages posted now will be handled.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Active | Self::Controlling)
    }

    /// Ready or failed; `ready()` resolves once this holds.
    pub fn is_settled(&self) -> bool {
        self.is_ready() || matches!(self, Self::Failed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Installing => "installing",
            Self::Active => "active",
            Self::Controlling => "controlling",
            Self::Failed(_) => "failed",
        }
    }
}

impl From<LifecycleState> for RegistrationState {
    fn from(state: LifecycleState) -> Self {
        match state {
            LifecycleState::Installing => Self::Installing,
            LifecycleState::Active => Self::Active,
            LifecycleState::Controlling => Self::Controlling,
        }
    }
}
