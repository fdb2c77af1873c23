//! Applications and their lifecycle
//!
//! Every foreground program implements [`App`]. The [`AppRegistry`] owns the
//! lifecycle state of each registered application and guarantees that at
//! most one of them is [`AppState::Active`].

use core::fmt;

use heapless::Vec;
use ionos_display::{DisplayBackend, DisplayError};

use crate::config::MAX_APP_REQUESTS;
use crate::event::Event;
use crate::ui::{ScreenId, TransitionKind};

pub mod registry;
pub mod state;

pub use registry::AppRegistry;
pub use state::{AppState, Lifecycle};

/// Stable registry slot of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppId(u8);

impl AppId {
    pub const fn new(slot: u8) -> Self {
        AppId(slot)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Decode a slot carried in an event data word
    pub fn from_data(data: u32) -> Option<Self> {
        u8::try_from(data).ok().map(AppId)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app#{}", self.0)
    }
}

/// Lifecycle and app-switch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleError {
    /// No application registered in that slot
    InvalidApp,
    /// Application is already the active one
    AlreadyActive,
    /// Application is not running
    NotRunning,
    /// Application must be closed first
    StillRunning,
    /// Every slot is taken
    RegistryFull,
    /// The root application cannot be closed
    RootApp,
    /// No root application designated
    NoRootApp,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::InvalidApp => write!(f, "no application in that slot"),
            LifecycleError::AlreadyActive => write!(f, "application already active"),
            LifecycleError::NotRunning => write!(f, "application not running"),
            LifecycleError::StillRunning => write!(f, "application still running"),
            LifecycleError::RegistryFull => write!(f, "application registry full"),
            LifecycleError::RootApp => write!(f, "root application cannot be closed"),
            LifecycleError::NoRootApp => write!(f, "no root application set"),
        }
    }
}

/// Something an application asks the kernel to do
///
/// Requests are applied at the end of the tick, after the frame is
/// committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppRequest {
    Launch(AppId),
    Close(AppId),
    Navigate(ScreenId, TransitionKind),
    /// Default back behaviour: pop the screen stack or return to the root app
    Back,
}

/// Request buffer filled through [`AppContext`]
pub type RequestQueue = Vec<(AppId, AppRequest), MAX_APP_REQUESTS>;

/// Handle passed to application callbacks
pub struct AppContext<'r> {
    app: AppId,
    now_ms: u32,
    screen: ScreenId,
    can_go_back: bool,
    low_battery: bool,
    requests: &'r mut RequestQueue,
}

impl<'r> AppContext<'r> {
    pub fn new(
        app: AppId,
        now_ms: u32,
        screen: ScreenId,
        can_go_back: bool,
        requests: &'r mut RequestQueue,
    ) -> Self {
        Self {
            app,
            now_ms,
            screen,
            can_go_back,
            low_battery: false,
            requests,
        }
    }

    /// Carry the kernel's battery state into the callback
    pub fn with_low_battery(mut self, low: bool) -> Self {
        self.low_battery = low;
        self
    }

    /// Id of the application being called
    pub fn app_id(&self) -> AppId {
        self.app
    }

    /// Tick time in ms
    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    /// Screen currently shown
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Whether the screen stack has history
    pub fn can_go_back(&self) -> bool {
        self.can_go_back
    }

    /// Battery has reported low and not yet recovered
    pub fn is_battery_low(&self) -> bool {
        self.low_battery
    }

    /// Ask for another application to become active
    pub fn launch(&mut self, app: AppId) -> bool {
        self.request(AppRequest::Launch(app))
    }

    pub fn close(&mut self, app: AppId) -> bool {
        self.request(AppRequest::Close(app))
    }

    /// Ask for this application to be closed
    pub fn close_self(&mut self) -> bool {
        self.request(AppRequest::Close(self.app))
    }

    pub fn navigate_to(&mut self, screen: ScreenId, kind: TransitionKind) -> bool {
        self.request(AppRequest::Navigate(screen, kind))
    }

    pub fn go_back(&mut self) -> bool {
        self.request(AppRequest::Back)
    }

    /// Requests made so far this tick
    pub fn pending(&self) -> &[(AppId, AppRequest)] {
        self.requests.as_slice()
    }

    fn request(&mut self, request: AppRequest) -> bool {
        if self.requests.push((self.app, request)).is_err() {
            warn!("{}: request buffer full, dropped {}", self.app, request);
            return false;
        }
        true
    }
}

/// Capability interface of a foreground application
///
/// Callbacks run on the kernel tick and must return promptly; long
/// operations belong in a [`Service`](crate::traits::Service).
pub trait App {
    /// Display name
    fn name(&self) -> &str;

    /// Called when the application becomes active from `Inactive`
    fn on_launch(&mut self);

    /// Called when another application takes the foreground
    fn on_suspend(&mut self) {}

    /// Called when the application returns to the foreground
    fn on_resume(&mut self) {}

    /// Called once while closing; release runtime state here
    fn on_close(&mut self);

    /// Handle an event; unknown types should be ignored
    fn on_event(&mut self, event: &Event, ctx: &mut AppContext<'_>);

    /// Advance application logic, once per tick
    fn update(&mut self, ctx: &mut AppContext<'_>);

    /// Draw `screen` into the display back buffer
    fn render(&mut self, display: &mut dyn DisplayBackend, screen: ScreenId)
        -> Result<(), DisplayError>;

    /// Handle the back button
    ///
    /// Return `true` if consumed; otherwise the kernel pops the screen stack
    /// or returns to the root application.
    fn handle_back_button(&mut self, _ctx: &mut AppContext<'_>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_records_requests_in_order() {
        let mut requests = RequestQueue::new();
        let mut ctx = AppContext::new(AppId::new(2), 100, ScreenId::ROOT, false, &mut requests);

        assert!(ctx.navigate_to(ScreenId::new(1), TransitionKind::Fade));
        assert!(ctx.launch(AppId::new(4)));
        assert!(ctx.close_self());
        assert_eq!(ctx.pending().len(), 3);

        assert_eq!(
            requests.as_slice(),
            &[
                (AppId::new(2), AppRequest::Navigate(ScreenId::new(1), TransitionKind::Fade)),
                (AppId::new(2), AppRequest::Launch(AppId::new(4))),
                (AppId::new(2), AppRequest::Close(AppId::new(2))),
            ]
        );
    }

    #[test]
    fn test_context_request_overflow() {
        let mut requests = RequestQueue::new();
        let mut ctx = AppContext::new(AppId::new(0), 0, ScreenId::ROOT, false, &mut requests);

        for _ in 0..MAX_APP_REQUESTS {
            assert!(ctx.go_back());
        }
        assert!(!ctx.go_back());
    }

    #[test]
    fn test_app_id_from_data() {
        assert_eq!(AppId::from_data(3), Some(AppId::new(3)));
        assert_eq!(AppId::from_data(300), None);
    }
}
