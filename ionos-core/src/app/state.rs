//! Application lifecycle state machine

/// Lifecycle state of a registered application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppState {
    /// Registered, not running
    #[default]
    Inactive,
    /// Foreground: receives events, updates and renders
    Active,
    /// Running in the background, keeps its state
    Suspended,
    /// Cleanup callbacks in progress
    Closing,
}

/// Lifecycle transitions requested by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    Launch,
    Suspend,
    Resume,
    Close,
    /// Cleanup finished
    Closed,
}

impl AppState {
    /// Whether the application holds runtime state
    pub fn is_running(&self) -> bool {
        matches!(self, AppState::Active | AppState::Suspended)
    }

    /// Apply a lifecycle transition
    ///
    /// Returns `None` if the transition is not allowed from this state.
    pub fn transition(self, event: Lifecycle) -> Option<Self> {
        use AppState::*;
        use Lifecycle::*;

        match (self, event) {
            (Inactive, Launch) => Some(Active),
            (Active, Suspend) => Some(Suspended),
            (Suspended, Resume) => Some(Active),
            (Active | Suspended, Close) => Some(Closing),
            (Closing, Closed) => Some(Inactive),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let state = AppState::Inactive;
        let state = state.transition(Lifecycle::Launch).unwrap();
        assert_eq!(state, AppState::Active);
        let state = state.transition(Lifecycle::Suspend).unwrap();
        assert_eq!(state, AppState::Suspended);
        let state = state.transition(Lifecycle::Resume).unwrap();
        let state = state.transition(Lifecycle::Close).unwrap();
        assert_eq!(state, AppState::Closing);
        assert_eq!(state.transition(Lifecycle::Closed), Some(AppState::Inactive));
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        assert_eq!(AppState::Inactive.transition(Lifecycle::Close), None);
        assert_eq!(AppState::Inactive.transition(Lifecycle::Resume), None);
        assert_eq!(AppState::Active.transition(Lifecycle::Launch), None);
        assert_eq!(AppState::Suspended.transition(Lifecycle::Suspend), None);
        assert_eq!(AppState::Closing.transition(Lifecycle::Launch), None);
    }

    #[test]
    fn test_close_from_suspended() {
        assert_eq!(
            AppState::Suspended.transition(Lifecycle::Close),
            Some(AppState::Closing)
        );
        assert!(AppState::Suspended.is_running());
        assert!(!AppState::Closing.is_running());
    }
}
