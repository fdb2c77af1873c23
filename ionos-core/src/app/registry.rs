//! Fixed-slot application registry
//!
//! Slots are indexed by [`AppId`]. The registry borrows each application
//! for `'a`; it never owns application memory.

use crate::config::MAX_APPS;
use crate::ui::ScreenId;

use super::state::{AppState, Lifecycle};
use super::{App, AppId, LifecycleError};

struct AppInstance<'a> {
    app: &'a mut dyn App,
    state: AppState,
    /// Screen to restore when the application returns to the foreground
    screen: ScreenId,
}

/// Registered applications and their lifecycle states
pub struct AppRegistry<'a, const N: usize = MAX_APPS> {
    slots: [Option<AppInstance<'a>>; N],
    active: Option<AppId>,
}

impl<'a, const N: usize> Default for AppRegistry<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> AppRegistry<'a, N> {
    /// Every slot index must fit in an [`AppId`]
    const SLOTS_FIT_ID: () = assert!(N <= u8::MAX as usize + 1, "too many app slots");

    pub fn new() -> Self {
        let () = Self::SLOTS_FIT_ID;
        Self {
            slots: core::array::from_fn(|_| None),
            active: None,
        }
    }

    /// Register an application in the first free slot
    pub fn register(&mut self, app: &'a mut dyn App) -> Result<AppId, LifecycleError> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(LifecycleError::RegistryFull)?;
        let id = u8::try_from(index)
            .map(AppId::new)
            .map_err(|_| LifecycleError::RegistryFull)?;

        debug!("registered {} in slot {}", app.name(), index);
        self.slots[index] = Some(AppInstance {
            app,
            state: AppState::Inactive,
            screen: ScreenId::ROOT,
        });
        Ok(id)
    }

    /// Free a slot, handing the application back
    ///
    /// Only `Inactive` applications can be unregistered.
    pub fn unregister(&mut self, id: AppId) -> Result<&'a mut dyn App, LifecycleError> {
        let instance = self.instance(id)?;
        if instance.state != AppState::Inactive {
            return Err(LifecycleError::StillRunning);
        }
        self.slots[id.index()]
            .take()
            .map(|instance| instance.app)
            .ok_or(LifecycleError::InvalidApp)
    }

    /// Bring an application to the foreground
    ///
    /// The previously active application is suspended first. An `Inactive`
    /// target gets `on_launch`, a `Suspended` one `on_resume`.
    pub fn launch(&mut self, id: AppId) -> Result<(), LifecycleError> {
        let state = self.instance(id)?.state;
        let event = match state {
            AppState::Active => return Err(LifecycleError::AlreadyActive),
            AppState::Inactive => Lifecycle::Launch,
            AppState::Suspended => Lifecycle::Resume,
            AppState::Closing => return Err(LifecycleError::NotRunning),
        };

        if let Some(previous) = self.active.take() {
            self.suspend(previous);
        }

        let instance = self.instance_mut(id)?;
        match event {
            Lifecycle::Launch => instance.app.on_launch(),
            _ => instance.app.on_resume(),
        }
        instance.state = AppState::Active;
        self.active = Some(id);

        info!("{} active ({})", id, event);
        Ok(())
    }

    /// Resume a suspended application
    pub fn resume(&mut self, id: AppId) -> Result<(), LifecycleError> {
        match self.instance(id)?.state {
            AppState::Suspended => self.launch(id),
            AppState::Active => Err(LifecycleError::AlreadyActive),
            _ => Err(LifecycleError::NotRunning),
        }
    }

    /// Close a running application, returning its slot to `Inactive`
    ///
    /// Leaves no application active if `id` was the active one.
    pub fn close(&mut self, id: AppId) -> Result<(), LifecycleError> {
        let instance = self.instance_mut(id)?;
        let closing = instance
            .state
            .transition(Lifecycle::Close)
            .ok_or(LifecycleError::NotRunning)?;

        instance.state = closing;
        instance.app.on_close();
        instance.state = AppState::Inactive;
        instance.screen = ScreenId::ROOT;

        if self.active == Some(id) {
            self.active = None;
        }
        info!("{} closed", id);
        Ok(())
    }

    /// Currently active application
    pub fn active(&self) -> Option<AppId> {
        self.active
    }

    /// Mutable access to the active application
    pub fn active_app_mut(&mut self) -> Option<(AppId, &mut (dyn App + 'a))> {
        let id = self.active?;
        let instance = self.slots.get_mut(id.index())?.as_mut()?;
        Some((id, &mut *instance.app))
    }

    /// Lifecycle state of a slot, `None` if empty
    pub fn state(&self, id: AppId) -> Option<AppState> {
        self.instance(id).ok().map(|instance| instance.state)
    }

    pub fn name(&self, id: AppId) -> Option<&str> {
        self.instance(id).ok().map(|instance| instance.app.name())
    }

    pub fn is_registered(&self, id: AppId) -> bool {
        self.instance(id).is_ok()
    }

    /// Remember which screen an application was on
    pub fn set_saved_screen(&mut self, id: AppId, screen: ScreenId) {
        if let Ok(instance) = self.instance_mut(id) {
            instance.screen = screen;
        }
    }

    /// Screen an application should be shown on when it becomes active
    pub fn saved_screen(&self, id: AppId) -> ScreenId {
        self.instance(id)
            .map(|instance| instance.screen)
            .unwrap_or(ScreenId::ROOT)
    }

    /// Registered application ids in slot order
    pub fn ids(&self) -> impl Iterator<Item = AppId> + '_ + use<'_, 'a, N> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| AppId::new(index as u8))
    }

    /// Number of registered applications
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of applications in `state`
    pub fn count_in(&self, state: AppState) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|instance| instance.state == state)
            .count()
    }

    fn suspend(&mut self, id: AppId) {
        if let Ok(instance) = self.instance_mut(id) {
            if let Some(suspended) = instance.state.transition(Lifecycle::Suspend) {
                instance.app.on_suspend();
                instance.state = suspended;
                debug!("{} suspended", id);
            }
        }
    }

    fn instance(&self, id: AppId) -> Result<&AppInstance<'a>, LifecycleError> {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(LifecycleError::InvalidApp)
    }

    fn instance_mut(&mut self, id: AppId) -> Result<&mut AppInstance<'a>, LifecycleError> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(LifecycleError::InvalidApp)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::AppContext;
    use crate::event::Event;
    use core::cell::RefCell;
    use ionos_display::{DisplayBackend, DisplayError};

    pub type CallLog = RefCell<heapless::Vec<(&'static str, &'static str), 64>>;

    /// App that records its lifecycle callbacks
    pub struct MockApp<'l> {
        pub name: &'static str,
        pub log: &'l CallLog,
    }

    impl<'l> MockApp<'l> {
        pub fn new(name: &'static str, log: &'l CallLog) -> Self {
            Self { name, log }
        }

        fn record(&self, call: &'static str) {
            let _ = self.log.borrow_mut().push((self.name, call));
        }
    }

    impl App for MockApp<'_> {
        fn name(&self) -> &str {
            self.name
        }

        fn on_launch(&mut self) {
            self.record("launch");
        }

        fn on_suspend(&mut self) {
            self.record("suspend");
        }

        fn on_resume(&mut self) {
            self.record("resume");
        }

        fn on_close(&mut self) {
            self.record("close");
        }

        fn on_event(&mut self, _event: &Event, _ctx: &mut AppContext<'_>) {}

        fn update(&mut self, _ctx: &mut AppContext<'_>) {}

        fn render(
            &mut self,
            _display: &mut dyn DisplayBackend,
            _screen: ScreenId,
        ) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    #[test]
    fn test_launch_suspends_previous() {
        let log = CallLog::default();
        let mut a = MockApp::new("a", &log);
        let mut b = MockApp::new("b", &log);
        let mut registry: AppRegistry<'_, 4> = AppRegistry::new();
        let a_id = registry.register(&mut a).unwrap();
        let b_id = registry.register(&mut b).unwrap();

        registry.launch(a_id).unwrap();
        registry.launch(b_id).unwrap();

        assert_eq!(registry.active(), Some(b_id));
        assert_eq!(registry.state(a_id), Some(AppState::Suspended));
        assert_eq!(registry.state(b_id), Some(AppState::Active));
        assert_eq!(registry.count_in(AppState::Active), 1);
        assert_eq!(
            log.borrow().as_slice(),
            &[("a", "launch"), ("a", "suspend"), ("b", "launch")]
        );
    }

    #[test]
    fn test_relaunching_suspended_resumes() {
        let log = CallLog::default();
        let mut a = MockApp::new("a", &log);
        let mut b = MockApp::new("b", &log);
        let mut registry: AppRegistry<'_, 4> = AppRegistry::new();
        let a_id = registry.register(&mut a).unwrap();
        let b_id = registry.register(&mut b).unwrap();

        registry.launch(a_id).unwrap();
        registry.launch(b_id).unwrap();
        registry.resume(a_id).unwrap();

        assert_eq!(registry.active(), Some(a_id));
        assert_eq!(registry.state(b_id), Some(AppState::Suspended));
        assert_eq!(log.borrow().last(), Some(&("a", "resume")));
    }

    #[test]
    fn test_invalid_and_active_launch_rejected() {
        let log = CallLog::default();
        let mut a = MockApp::new("a", &log);
        let mut registry: AppRegistry<'_, 4> = AppRegistry::new();
        let a_id = registry.register(&mut a).unwrap();

        assert_eq!(registry.launch(AppId::new(3)), Err(LifecycleError::InvalidApp));
        assert_eq!(registry.launch(AppId::new(99)), Err(LifecycleError::InvalidApp));
        registry.launch(a_id).unwrap();
        assert_eq!(registry.launch(a_id), Err(LifecycleError::AlreadyActive));
        assert_eq!(registry.active(), Some(a_id));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_close_returns_slot_to_inactive() {
        let log = CallLog::default();
        let mut a = MockApp::new("a", &log);
        let mut registry: AppRegistry<'_, 4> = AppRegistry::new();
        let a_id = registry.register(&mut a).unwrap();

        assert_eq!(registry.close(a_id), Err(LifecycleError::NotRunning));
        registry.launch(a_id).unwrap();
        registry.set_saved_screen(a_id, ScreenId::new(2));
        registry.close(a_id).unwrap();

        assert_eq!(registry.active(), None);
        assert_eq!(registry.state(a_id), Some(AppState::Inactive));
        assert_eq!(registry.saved_screen(a_id), ScreenId::ROOT);

        // Next launch starts fresh
        registry.launch(a_id).unwrap();
        assert_eq!(log.borrow().last(), Some(&("a", "launch")));
    }

    #[test]
    fn test_close_suspended_keeps_active() {
        let log = CallLog::default();
        let mut a = MockApp::new("a", &log);
        let mut b = MockApp::new("b", &log);
        let mut registry: AppRegistry<'_, 4> = AppRegistry::new();
        let a_id = registry.register(&mut a).unwrap();
        let b_id = registry.register(&mut b).unwrap();

        registry.launch(a_id).unwrap();
        registry.launch(b_id).unwrap();
        registry.close(a_id).unwrap();

        assert_eq!(registry.active(), Some(b_id));
        assert_eq!(registry.state(a_id), Some(AppState::Inactive));
    }

    #[test]
    fn test_registry_full_and_slot_reuse() {
        let log = CallLog::default();
        let mut a = MockApp::new("a", &log);
        let mut b = MockApp::new("b", &log);
        let mut c = MockApp::new("c", &log);
        let mut d = MockApp::new("d", &log);
        let mut registry: AppRegistry<'_, 2> = AppRegistry::new();

        let a_id = registry.register(&mut a).unwrap();
        registry.register(&mut b).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.register(&mut d).err(),
            Some(LifecycleError::RegistryFull)
        );

        registry.launch(a_id).unwrap();
        assert!(matches!(
            registry.unregister(a_id),
            Err(LifecycleError::StillRunning)
        ));
        registry.close(a_id).unwrap();
        let freed = registry.unregister(a_id).unwrap();
        assert_eq!(freed.name(), "a");

        let c_id = registry.register(&mut c).unwrap();
        assert_eq!(c_id, a_id);
        assert_eq!(registry.name(c_id), Some("c"));
        assert_eq!(registry.ids().count(), 2);
    }

    #[test]
    fn test_largest_registry_uses_every_id() {
        let log = CallLog::default();
        let mut apps: [MockApp<'_>; 256] = core::array::from_fn(|_| MockApp::new("app", &log));
        let mut extra = MockApp::new("extra", &log);
        let mut registry: AppRegistry<'_, 256> = AppRegistry::new();

        let mut last = None;
        for app in apps.iter_mut() {
            last = Some(registry.register(app).unwrap());
        }

        assert_eq!(last, Some(AppId::new(u8::MAX)));
        assert_eq!(
            registry.register(&mut extra).err(),
            Some(LifecycleError::RegistryFull)
        );
    }
}
