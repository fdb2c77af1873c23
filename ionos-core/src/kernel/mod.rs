//! Cooperative kernel tick loop
//!
//! Each [`Kernel::tick`] runs, in order:
//!
//! 1. Button sampling into the event queue
//! 2. One `update` per attached service
//! 3. Queue drain, bounded by `max_events_per_tick`; app-switch and back
//!    events are handled here, everything else goes to the active app
//! 4. Navigator update (commits finished transitions)
//! 5. Active application `update`
//! 6. Active application `render`, committed with one `present`
//! 7. Application requests queued during this tick
//!
//! Nothing here blocks; the caller drives ticks at the configured interval.

use heapless::Vec;

use crate::app::{
    App, AppContext, AppId, AppRegistry, AppRequest, AppState, LifecycleError, RequestQueue,
};
use crate::config::{
    ConfigError, KernelConfig, EVENT_QUEUE_CAPACITY, MAX_APPS, MAX_SERVICES, SCREEN_STACK_DEPTH,
};
use crate::event::{
    ButtonId, Event, EventPriority, EventQueue, EventType, QueueError, BUTTON_COUNT,
};
use crate::input::Debouncer;
use crate::traits::{DisplayBackend, DisplayError, Service, ServiceError, ServiceStatus, Viewport};
use crate::ui::{NavError, Navigator, ScreenId, TransitionKind};

pub mod stats;

pub use stats::KernelStats;

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Events dispatched this tick
    pub dispatched: usize,
    /// Events left queued for the next tick
    pub pending: usize,
    /// Whether a frame was committed to the display
    pub presented: bool,
    /// Screen that became current this tick
    pub committed: Option<ScreenId>,
}

/// The ionOS kernel
pub struct Kernel<'a, D: DisplayBackend, const Q: usize = EVENT_QUEUE_CAPACITY> {
    config: KernelConfig,
    queue: &'a EventQueue<Q>,
    debouncer: Debouncer,
    registry: AppRegistry<'a, MAX_APPS>,
    navigator: Navigator<SCREEN_STACK_DEPTH>,
    display: D,
    services: Vec<&'a mut dyn Service, MAX_SERVICES>,
    requests: RequestQueue,
    root: Option<AppId>,
    running: bool,
    /// Set by `PowerLowBattery`, cleared by `PowerChargingStart`
    low_battery: bool,
    stats: KernelStats,
}

impl<'a, D: DisplayBackend, const Q: usize> Kernel<'a, D, Q> {
    /// Create a stopped kernel
    pub fn new(
        config: KernelConfig,
        queue: &'a EventQueue<Q>,
        display: D,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            queue,
            debouncer: Debouncer::new(config.buttons, config.repeat_mask),
            registry: AppRegistry::new(),
            navigator: Navigator::with_timing(
                ScreenId::ROOT,
                config.transition_duration_ms,
                config.default_easing,
            ),
            display,
            services: Vec::new(),
            requests: RequestQueue::new(),
            root: None,
            running: false,
            low_battery: false,
            stats: KernelStats::default(),
        })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn register_app(&mut self, app: &'a mut dyn App) -> Result<AppId, LifecycleError> {
        self.registry.register(app)
    }

    /// Designate the application control returns to when others close
    pub fn set_root_app(&mut self, id: AppId) -> Result<(), LifecycleError> {
        if !self.registry.is_registered(id) {
            return Err(LifecycleError::InvalidApp);
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root_app(&self) -> Option<AppId> {
        self.root
    }

    /// Attach a background service, polled once per tick
    pub fn attach_service(&mut self, service: &'a mut dyn Service) -> Result<(), ServiceError> {
        self.services
            .push(service)
            .map_err(|_| ServiceError::TooManyServices)
    }

    /// Initialise services and bring up the root application
    pub fn start(&mut self, now_ms: u32) -> Result<(), LifecycleError> {
        if self.running {
            return Ok(());
        }
        let root = self.root.ok_or(LifecycleError::NoRootApp)?;

        for service in self.services.iter_mut() {
            match service.init() {
                Ok(()) => info!("service {} started", service.name()),
                Err(e) => error!("service {} failed to start: {}", service.name(), e),
            }
        }

        if !self.display.is_ready() {
            warn!("display not ready at start");
        }

        if self.registry.active().is_none() {
            self.registry.launch(root)?;
            self.navigator.reset(self.registry.saved_screen(root));
        }

        self.running = true;
        let init = Event::new(EventType::SystemInit)
            .with_priority(EventPriority::High)
            .with_timestamp(now_ms);
        if self.queue.post(init).is_err() {
            warn!("SystemInit not queued");
        }

        info!("kernel started, root {}", root);
        Ok(())
    }

    /// Close every running application and stop services
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }

        if let Some(active) = self.registry.active() {
            if let Err(e) = self.registry.close(active) {
                warn!("shutdown: close {} failed: {}", active, e);
            }
        }
        let ids: Vec<AppId, MAX_APPS> = self.registry.ids().collect();
        for id in ids {
            if self.registry.state(id).is_some_and(|state| state.is_running()) {
                if let Err(e) = self.registry.close(id) {
                    warn!("shutdown: close {} failed: {}", id, e);
                }
            }
        }

        for service in self.services.iter_mut().rev() {
            service.shutdown();
            debug!("service {} stopped", service.name());
        }

        let stale = self.queue.len();
        if stale > 0 {
            debug!("dropping {} queued events", stale);
        }
        self.queue.clear();
        self.requests.clear();
        self.debouncer.reset();
        self.navigator.reset(ScreenId::ROOT);
        self.running = false;
        info!("kernel stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Battery state as last reported through power events
    pub fn is_battery_low(&self) -> bool {
        self.low_battery
    }

    /// Run one kernel tick
    ///
    /// `raw` holds the logical button levels sampled for this tick.
    pub fn tick(&mut self, now_ms: u32, raw: [bool; BUTTON_COUNT]) -> TickReport {
        let mut report = TickReport::default();
        if !self.running {
            return report;
        }
        self.stats.record_tick(now_ms, self.config.tick_interval_ms);

        let lost = self.debouncer.poll_into(raw, now_ms, self.queue);
        if lost > 0 {
            warn!("{} button events lost", lost);
        }

        for service in self.services.iter_mut() {
            service.update(now_ms, self.queue);
        }

        while report.dispatched < self.config.max_events_per_tick {
            let Some(event) = self.queue.dequeue() else {
                break;
            };
            self.dispatch(&event, now_ms);
            report.dispatched += 1;
        }
        report.pending = self.queue.len();
        self.stats.events_dispatched = self
            .stats
            .events_dispatched
            .wrapping_add(report.dispatched as u32);
        if report.pending > 0 {
            self.stats.events_deferred = self.stats.events_deferred.wrapping_add(1);
        }

        report.committed = self.navigator.update(now_ms);

        self.update_active(now_ms);
        report.presented = self.render(now_ms);
        self.apply_requests(now_ms);

        report
    }

    /// Post an event to the kernel queue
    pub fn post(&self, event: Event) -> Result<(), QueueError> {
        self.queue.post(event)
    }

    /// Bring an application to the foreground, suspending the current one
    pub fn launch_app(&mut self, id: AppId) -> Result<(), LifecycleError> {
        if !self.registry.is_registered(id) {
            return Err(LifecycleError::InvalidApp);
        }
        if self.registry.active() == Some(id) {
            return Err(LifecycleError::AlreadyActive);
        }

        if let Some(previous) = self.registry.active() {
            self.registry
                .set_saved_screen(previous, self.navigator.target());
        }
        self.registry.launch(id)?;
        self.navigator.reset(self.registry.saved_screen(id));
        Ok(())
    }

    /// Close an application
    ///
    /// Closing the active application hands the foreground back to the
    /// root application. The root application itself cannot be closed.
    pub fn close_app(&mut self, id: AppId) -> Result<(), LifecycleError> {
        if self.root == Some(id) {
            return Err(LifecycleError::RootApp);
        }

        let was_active = self.registry.active() == Some(id);
        self.registry.close(id)?;

        if was_active {
            self.navigator.reset(ScreenId::ROOT);
            if let Some(root) = self.root {
                self.registry.launch(root)?;
                self.navigator.reset(self.registry.saved_screen(root));
            }
        }
        Ok(())
    }

    pub fn active_app(&self) -> Option<AppId> {
        self.registry.active()
    }

    pub fn app_state(&self, id: AppId) -> Option<AppState> {
        self.registry.state(id)
    }

    pub fn app_name(&self, id: AppId) -> Option<&str> {
        self.registry.name(id)
    }

    pub fn registry(&self) -> &AppRegistry<'a, MAX_APPS> {
        &self.registry
    }

    /// Navigate the active application's screens
    pub fn navigate_to(
        &mut self,
        screen: ScreenId,
        kind: TransitionKind,
        now_ms: u32,
    ) -> Result<(), NavError> {
        self.navigator.navigate_to(screen, kind, now_ms)
    }

    /// Run the global back behaviour, as if the back button was pressed
    pub fn go_back(&mut self, now_ms: u32) {
        self.back(now_ms);
    }

    pub fn current_screen(&self) -> ScreenId {
        self.navigator.current()
    }

    pub fn navigator(&self) -> &Navigator<SCREEN_STACK_DEPTH> {
        &self.navigator
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn queue(&self) -> &'a EventQueue<Q> {
        self.queue
    }

    pub fn stats(&self) -> KernelStats {
        self.stats
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Name and status of each attached service
    pub fn services(&self) -> impl Iterator<Item = (&str, ServiceStatus)> + '_ + use<'_, 'a, D, Q> {
        self.services
            .iter()
            .map(|service| (service.name(), service.status()))
    }

    fn dispatch(&mut self, event: &Event, now_ms: u32) {
        match event.event_type {
            EventType::AppLaunch => match AppId::from_data(event.data1) {
                Some(id) => {
                    if let Err(e) = self.launch_app(id) {
                        warn!("launch {} failed: {}", id, e);
                    }
                }
                None => warn!("launch of invalid slot {}", event.data1),
            },
            EventType::AppClose => match AppId::from_data(event.data1) {
                Some(id) => {
                    if let Err(e) = self.close_app(id) {
                        warn!("close {} failed: {}", id, e);
                    }
                }
                None => warn!("close of invalid slot {}", event.data1),
            },
            EventType::AppBack => self.back(now_ms),
            EventType::ButtonPress if event.button_id() == Some(ButtonId::Back) => {
                self.back(now_ms)
            }
            // Power state outlives the active app; apps see it through their context
            EventType::PowerLowBattery => {
                if !self.low_battery {
                    info!("battery low ({} mV)", event.data1);
                }
                self.low_battery = true;
                self.forward(event, now_ms);
            }
            EventType::PowerChargingStart => {
                self.low_battery = false;
                self.forward(event, now_ms);
            }
            _ => self.forward(event, now_ms),
        }
    }

    /// Hand an event to the active application
    fn forward(&mut self, event: &Event, now_ms: u32) {
        let screen = self.navigator.target();
        let can_go_back = self.navigator.can_go_back();
        let low_battery = self.low_battery;
        if let Some((id, app)) = self.registry.active_app_mut() {
            let mut ctx = AppContext::new(id, now_ms, screen, can_go_back, &mut self.requests)
                .with_low_battery(low_battery);
            app.on_event(event, &mut ctx);
        }
    }

    /// Back button: the active application first, then the default
    fn back(&mut self, now_ms: u32) {
        let screen = self.navigator.target();
        let can_go_back = self.navigator.can_go_back();
        let low_battery = self.low_battery;
        let consumed = match self.registry.active_app_mut() {
            Some((id, app)) => {
                let mut ctx = AppContext::new(id, now_ms, screen, can_go_back, &mut self.requests)
                    .with_low_battery(low_battery);
                app.handle_back_button(&mut ctx)
            }
            None => false,
        };

        if !consumed {
            self.default_back(now_ms);
        }
    }

    /// Pop the screen stack; at the root, close the active application
    /// unless it is the root application
    fn default_back(&mut self, now_ms: u32) {
        match self.navigator.go_back(now_ms) {
            Ok(screen) => debug!("back to {}", screen),
            Err(NavError::AtRoot) => {
                let Some(active) = self.registry.active() else {
                    return;
                };
                if Some(active) != self.root {
                    if let Err(e) = self.close_app(active) {
                        warn!("back: close {} failed: {}", active, e);
                    }
                }
            }
            Err(e) => debug!("back ignored: {}", e),
        }
    }

    fn update_active(&mut self, now_ms: u32) {
        let screen = self.navigator.target();
        let can_go_back = self.navigator.can_go_back();
        let low_battery = self.low_battery;
        if let Some((id, app)) = self.registry.active_app_mut() {
            let mut ctx = AppContext::new(id, now_ms, screen, can_go_back, &mut self.requests)
                .with_low_battery(low_battery);
            app.update(&mut ctx);
        }
    }

    fn render(&mut self, now_ms: u32) -> bool {
        let (screen, viewport) = match self.navigator.frame(now_ms) {
            Some(frame) => (frame.to, frame.viewport()),
            None => (self.navigator.current(), Viewport::IDENTITY),
        };
        let Some((id, app)) = self.registry.active_app_mut() else {
            return false;
        };

        match render_frame(&mut self.display, app, screen, viewport) {
            Ok(()) => {
                self.stats.frames_presented = self.stats.frames_presented.wrapping_add(1);
                true
            }
            Err(e) => {
                self.stats.render_errors = self.stats.render_errors.wrapping_add(1);
                warn!("{} render failed: {}", id, e);
                false
            }
        }
    }

    fn apply_requests(&mut self, now_ms: u32) {
        let requests = core::mem::take(&mut self.requests);

        for (origin, request) in requests {
            let from_active = self.registry.active() == Some(origin);
            let applied = match request {
                AppRequest::Launch(id) => self.launch_app(id).is_ok(),
                AppRequest::Close(id) => self.close_app(id).is_ok(),
                AppRequest::Navigate(screen, kind) if from_active => {
                    self.navigator.navigate_to(screen, kind, now_ms).is_ok()
                }
                AppRequest::Back if from_active => {
                    self.default_back(now_ms);
                    true
                }
                // Navigation from an application that lost the foreground
                _ => false,
            };

            if !applied {
                self.stats.rejected_requests = self.stats.rejected_requests.wrapping_add(1);
                debug!("request {} from {} not applied", request, origin);
            }
        }
    }
}

fn render_frame<D: DisplayBackend>(
    display: &mut D,
    app: &mut dyn App,
    screen: ScreenId,
    viewport: Viewport,
) -> Result<(), DisplayError> {
    display.set_viewport(viewport);
    display.clear()?;
    app.render(display, screen)?;
    display.present()
}
