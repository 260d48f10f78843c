//! Lifecycle states shared by gateways, extensions and the supervisor

use serde::{Deserialize, Serialize};

/// Lifecycle of a managed service.
///
/// ```text
/// Uninitialized ──initialize()──▶ Running ──destroy()──▶ Destroyed
///       │                                                    ▲
///       └──────────── failed initialize(), destroy() ────────┘
/// ```
///
/// There is no way back from `Destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    #[default]
    Uninitialized,
    Running,
    Destroyed,
}

impl ServiceState {
    /// Whether `next` is a legal transition from this state
    pub fn can_transition_to(self, next: ServiceState) -> bool {
        matches!(
            (self, next),
            (ServiceState::Uninitialized, ServiceState::Running)
                | (ServiceState::Uninitialized, ServiceState::Destroyed)
                | (ServiceState::Running, ServiceState::Destroyed)
        )
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceState::Uninitialized => "uninitialized",
            ServiceState::Running => "running",
            ServiceState::Destroyed => "destroyed",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ServiceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uninitialized" => Ok(ServiceState::Uninitialized),
            "running" => Ok(ServiceState::Running),
            "destroyed" => Ok(ServiceState::Destroyed),
            _ => Err(format!("Unknown service state: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_only() {
        use ServiceState::*;
        assert!(Uninitialized.can_transition_to(Running));
        assert!(Uninitialized.can_transition_to(Destroyed));
        assert!(Running.can_transition_to(Destroyed));
        assert!(!Running.can_transition_to(Uninitialized));
        assert!(!Destroyed.can_transition_to(Running));
        assert!(!Destroyed.can_transition_to(Destroyed));
    }

    #[test]
    fn display_and_parse_agree() {
        for state in [
            ServiceState::Uninitialized,
            ServiceState::Running,
            ServiceState::Destroyed,
        ] {
            assert_eq!(state.to_string().parse::<ServiceState>(), Ok(state));
        }
        assert!("stopped".parse::<ServiceState>().is_err());
    }
}
