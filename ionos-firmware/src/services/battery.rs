//! Battery monitor service
//!
//! The battery task samples VSYS into [`BATTERY_MV`]; this service turns
//! those samples into power events on the kernel tick. A `PowerLowBattery`
//! warning fires once per excursion below the low threshold. Climbing back
//! over the recovery threshold only happens on external power, so it is
//! reported as `PowerChargingStart` and re-arms the warning.

use defmt::*;
use ionos_core::event::{Event, EventPriority, EventSink, EventType};
use ionos_core::traits::{Service, ServiceError, ServiceStatus};
use portable_atomic::Ordering;

use crate::channels::BATTERY_MV;

/// Hysteresis between the low and recovery thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowBatteryMonitor {
    low_mv: u32,
    recover_mv: u32,
    low: bool,
}

impl LowBatteryMonitor {
    pub const fn new(low_mv: u32, recover_mv: u32) -> Self {
        Self {
            low_mv,
            recover_mv,
            low: false,
        }
    }

    /// Feed a sample; returns `true` when a new excursion begins
    pub fn observe(&mut self, mv: u32) -> bool {
        if self.low {
            if mv >= self.recover_mv {
                self.low = false;
            }
            false
        } else if mv < self.low_mv {
            self.low = true;
            true
        } else {
            false
        }
    }

    pub fn is_low(&self) -> bool {
        self.low
    }
}

pub struct BatteryService {
    monitor: LowBatteryMonitor,
    check_interval_ms: u32,
    last_check_ms: Option<u32>,
    status: ServiceStatus,
}

impl BatteryService {
    pub const fn new(low_mv: u32, recover_mv: u32, check_interval_ms: u32) -> Self {
        Self {
            monitor: LowBatteryMonitor::new(low_mv, recover_mv),
            check_interval_ms,
            last_check_ms: None,
            status: ServiceStatus::Stopped,
        }
    }

    fn due(&self, now_ms: u32) -> bool {
        match self.last_check_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.check_interval_ms,
        }
    }

    /// Process one sample, posting an event when the excursion state flips
    fn check(&mut self, mv: u32, now_ms: u32, events: &dyn EventSink) {
        let was_low = self.monitor.is_low();
        let event = if self.monitor.observe(mv) {
            warn!("Battery low: {} mV", mv);
            Event::new(EventType::PowerLowBattery).with_priority(EventPriority::High)
        } else if was_low && !self.monitor.is_low() {
            info!("Battery recovered: {} mV", mv);
            Event::new(EventType::PowerChargingStart)
        } else {
            return;
        };

        let event = event.with_timestamp(now_ms).with_data(mv, 0);
        if events.post(event).is_err() {
            warn!("Power event dropped");
        }
    }
}

impl Service for BatteryService {
    fn name(&self) -> &str {
        "battery"
    }

    fn init(&mut self) -> Result<(), ServiceError> {
        self.status = ServiceStatus::Idle;
        info!("Battery service started");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.status = ServiceStatus::Stopped;
    }

    fn update(&mut self, now_ms: u32, events: &dyn EventSink) {
        if self.status == ServiceStatus::Stopped || !self.due(now_ms) {
            return;
        }
        self.last_check_ms = Some(now_ms);

        // No sample yet
        let mv = BATTERY_MV.load(Ordering::Relaxed);
        if mv == 0 {
            return;
        }
        self.check(mv, now_ms, events);
    }

    fn status(&self) -> ServiceStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ionos_core::event::EventQueue;

    #[test]
    fn test_monitor_hysteresis() {
        let mut monitor = LowBatteryMonitor::new(3400, 3550);

        assert!(!monitor.observe(3700));
        assert!(monitor.observe(3390));
        assert!(!monitor.observe(3300));
        // Above low but below recovery: still the same excursion
        assert!(!monitor.observe(3450));
        assert!(!monitor.observe(3390));
        assert!(monitor.is_low());

        assert!(!monitor.observe(3560));
        assert!(!monitor.is_low());
        assert!(monitor.observe(3399));
    }

    #[test]
    fn test_low_sample_posts_one_event() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut service = BatteryService::new(3400, 3550, 1000);
        service.init().unwrap();

        service.check(3350, 500, &queue);
        service.check(3340, 1500, &queue);

        assert_eq!(queue.len(), 1);
        let event = queue.dequeue().unwrap();
        assert_eq!(event.event_type, EventType::PowerLowBattery);
        assert_eq!(event.priority, EventPriority::High);
        assert_eq!(event.data1, 3350);
    }

    #[test]
    fn test_recovery_reports_charging() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut service = BatteryService::new(3400, 3550, 1000);
        service.init().unwrap();

        service.check(3350, 0, &queue);
        service.check(3500, 1000, &queue);
        service.check(3600, 2000, &queue);

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.dequeue().map(|e| e.event_type),
            Some(EventType::PowerLowBattery)
        );
        let recovered = queue.dequeue().unwrap();
        assert_eq!(recovered.event_type, EventType::PowerChargingStart);
        assert_eq!(recovered.data1, 3600);
    }

    #[test]
    fn test_check_interval() {
        let mut service = BatteryService::new(3400, 3550, 1000);
        assert!(service.due(0));
        service.last_check_ms = Some(u32::MAX - 100);
        assert!(!service.due(500));
        assert!(service.due(900));
    }
}
