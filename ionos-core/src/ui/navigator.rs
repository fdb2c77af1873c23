//! Screen navigation state machine
//!
//! `navigate_to` and `go_back` record the history change immediately and
//! start a timed transition; `current` only moves to the target screen when
//! [`Navigator::update`] sees the transition complete. Only one transition
//! may be in flight; requests made meanwhile are rejected.

use core::fmt;

use super::easing::Easing;
use super::screen_stack::{ScreenStack, StackEntry};
use super::transition::{TransitionFrame, TransitionKind, TransitionState};
use super::ScreenId;
use crate::config::TRANSITION_DURATION_MS;

/// Rejected navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavError {
    /// History is at its maximum depth
    StackFull,
    /// Nothing to go back to
    AtRoot,
    /// Another transition is still animating
    TransitionInProgress,
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::StackFull => write!(f, "screen stack full"),
            NavError::AtRoot => write!(f, "already at root screen"),
            NavError::TransitionInProgress => write!(f, "transition in progress"),
        }
    }
}

/// Screen history plus transition engine
#[derive(Debug, Clone)]
pub struct Navigator<const N: usize> {
    current: ScreenId,
    history: ScreenStack<N>,
    state: TransitionState,
    duration_ms: u32,
    easing: Easing,
}

impl<const N: usize> Default for Navigator<N> {
    fn default() -> Self {
        Self::new(ScreenId::ROOT)
    }
}

impl<const N: usize> Navigator<N> {
    /// Create a navigator showing `root` with the default timing
    pub const fn new(root: ScreenId) -> Self {
        Self::with_timing(root, TRANSITION_DURATION_MS, Easing::InOutQuad)
    }

    /// Create a navigator with explicit transition timing
    pub const fn with_timing(root: ScreenId, duration_ms: u32, easing: Easing) -> Self {
        Self {
            current: root,
            history: ScreenStack::new(),
            state: TransitionState::Idle,
            duration_ms,
            easing,
        }
    }

    /// Change the timing used by later transitions
    pub fn set_timing(&mut self, duration_ms: u32, easing: Easing) {
        self.duration_ms = duration_ms;
        self.easing = easing;
    }

    /// Screen being shown (the target only after its transition commits)
    pub fn current(&self) -> ScreenId {
        self.current
    }

    /// Screen being shown or animated towards
    pub fn target(&self) -> ScreenId {
        match self.state {
            TransitionState::Animating { to, .. } => to,
            TransitionState::Idle => self.current,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    /// Whether `go_back` has somewhere to go
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Number of screens in the history
    pub fn depth(&self) -> usize {
        self.history.depth()
    }

    /// Navigate forward to `screen`
    pub fn navigate_to(
        &mut self,
        screen: ScreenId,
        kind: TransitionKind,
        now_ms: u32,
    ) -> Result<(), NavError> {
        if self.state.is_animating() {
            debug!("navigate to {} rejected: transition in progress", screen);
            return Err(NavError::TransitionInProgress);
        }

        let entry = StackEntry {
            screen: self.current,
            left_with: kind,
        };
        if self.history.push(entry).is_err() {
            warn!("navigate to {} rejected: stack full", screen);
            return Err(NavError::StackFull);
        }

        self.begin(kind, screen, now_ms);
        Ok(())
    }

    /// Return to the previous screen with the reverse of the transition
    /// that left it
    ///
    /// At the root this changes nothing and reports [`NavError::AtRoot`].
    pub fn go_back(&mut self, now_ms: u32) -> Result<ScreenId, NavError> {
        if self.state.is_animating() {
            return Err(NavError::TransitionInProgress);
        }

        let entry = self.history.pop().ok_or(NavError::AtRoot)?;
        self.begin(entry.left_with.reversed(), entry.screen, now_ms);
        Ok(entry.screen)
    }

    /// Drop the history and show `root` immediately
    pub fn reset(&mut self, root: ScreenId) {
        self.history.clear();
        self.state = TransitionState::Idle;
        self.current = root;
    }

    /// Advance the transition; returns the new screen when it commits
    pub fn update(&mut self, now_ms: u32) -> Option<ScreenId> {
        match self.state {
            TransitionState::Animating { to, .. } if self.state.is_complete(now_ms) => {
                self.current = to;
                self.state = TransitionState::Idle;
                debug!("transition committed: now on {}", to);
                Some(to)
            }
            _ => None,
        }
    }

    /// Eased progress of the in-flight transition; `Idle` reports 1
    pub fn progress(&self, now_ms: u32) -> f32 {
        match self.state {
            TransitionState::Idle => 1.0,
            TransitionState::Animating { easing, .. } => easing.apply(self.state.progress(now_ms)),
        }
    }

    /// Frame geometry for renderers, `None` when idle
    pub fn frame(&self, now_ms: u32) -> Option<TransitionFrame> {
        match self.state {
            TransitionState::Idle => None,
            TransitionState::Animating { kind, from, to, .. } => Some(TransitionFrame::compute(
                kind,
                from,
                to,
                self.progress(now_ms),
            )),
        }
    }

    fn begin(&mut self, kind: TransitionKind, to: ScreenId, now_ms: u32) {
        trace!("transition {} -> {}", self.current, to);
        self.state = TransitionState::Animating {
            kind,
            from: self.current,
            to,
            start_ms: now_ms,
            duration_ms: self.duration_ms,
            easing: self.easing,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: ScreenId = ScreenId::ROOT;
    const SETTINGS: ScreenId = ScreenId::new(1);
    const CLOCK: ScreenId = ScreenId::new(2);
    const ABOUT: ScreenId = ScreenId::new(3);

    fn navigator() -> Navigator<5> {
        Navigator::with_timing(HOME, 300, Easing::Linear)
    }

    #[test]
    fn test_navigation_rejected_while_animating() {
        let mut nav = navigator();

        assert_eq!(nav.navigate_to(SETTINGS, TransitionKind::Fade, 1000), Ok(()));
        assert_eq!(
            nav.navigate_to(CLOCK, TransitionKind::SlideLeft, 1010),
            Err(NavError::TransitionInProgress)
        );
        assert_eq!(nav.depth(), 1);

        assert_eq!(nav.update(1300), Some(SETTINGS));
        assert_eq!(nav.current(), SETTINGS);
        assert_eq!(nav.navigate_to(CLOCK, TransitionKind::SlideLeft, 1300), Ok(()));
    }

    #[test]
    fn test_current_changes_on_commit() {
        let mut nav = navigator();
        nav.navigate_to(SETTINGS, TransitionKind::SlideUp, 0).unwrap();

        assert_eq!(nav.update(150), None);
        assert_eq!(nav.current(), HOME);
        assert_eq!(nav.target(), SETTINGS);
        assert!(nav.is_animating());

        assert_eq!(nav.update(300), Some(SETTINGS));
        assert!(!nav.is_animating());
        assert_eq!(nav.update(400), None);
    }

    #[test]
    fn test_go_back_at_root_is_noop() {
        let mut nav = navigator();
        let before = nav.state();

        assert_eq!(nav.go_back(0), Err(NavError::AtRoot));
        assert_eq!(nav.state(), before);
        assert_eq!(nav.current(), HOME);
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_go_back_reverses_transition() {
        let mut nav = navigator();
        nav.navigate_to(SETTINGS, TransitionKind::SlideLeft, 0).unwrap();
        nav.update(300);

        assert_eq!(nav.go_back(500), Ok(HOME));
        match nav.state() {
            TransitionState::Animating { kind, from, to, .. } => {
                assert_eq!(kind, TransitionKind::SlideRight);
                assert_eq!(from, SETTINGS);
                assert_eq!(to, HOME);
            }
            TransitionState::Idle => panic!("expected a transition"),
        }
        assert_eq!(nav.update(800), Some(HOME));
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_stack_depth_limit() {
        let mut nav: Navigator<2> = Navigator::with_timing(HOME, 0, Easing::Linear);
        nav.navigate_to(SETTINGS, TransitionKind::None, 0).unwrap();
        nav.update(0);
        nav.navigate_to(CLOCK, TransitionKind::None, 0).unwrap();
        nav.update(0);

        assert_eq!(
            nav.navigate_to(ABOUT, TransitionKind::None, 0),
            Err(NavError::StackFull)
        );
        assert_eq!(nav.current(), CLOCK);
        assert!(!nav.is_animating());
    }

    #[test]
    fn test_none_transition_commits_on_next_update() {
        let mut nav = navigator();
        nav.navigate_to(ABOUT, TransitionKind::None, 0).unwrap();
        assert_eq!(nav.progress(0), 1.0);
        assert_eq!(nav.update(0), Some(ABOUT));
    }

    #[test]
    fn test_frame_follows_easing() {
        let mut nav: Navigator<5> = Navigator::with_timing(HOME, 200, Easing::InQuad);
        assert!(nav.frame(0).is_none());

        nav.navigate_to(SETTINGS, TransitionKind::Fade, 0).unwrap();
        let frame = nav.frame(100).unwrap();
        assert_eq!(frame.progress, 0.25);
        assert_eq!(frame.opacity, 64);
        assert_eq!(frame.from, HOME);
        assert_eq!(frame.to, SETTINGS);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut nav = navigator();
        nav.navigate_to(SETTINGS, TransitionKind::Fade, 0).unwrap();

        nav.reset(CLOCK);
        assert_eq!(nav.current(), CLOCK);
        assert_eq!(nav.depth(), 0);
        assert!(!nav.is_animating());
    }
}
