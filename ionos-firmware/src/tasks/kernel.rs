//! Kernel task
//!
//! Drives the kernel at the configured tick interval. Button sampling,
//! event dispatch, app updates and rendering all happen inside
//! [`Kernel::tick`]; this task only keeps time.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use ionos_core::Kernel;

use crate::buttons::Buttons;
use crate::display::OledBackend;

/// Kernel as instantiated on the device
pub type DeviceKernel = Kernel<'static, OledBackend>;

/// Warn when this many ticks in a row leave events queued
const BACKLOG_WARN_TICKS: u32 = 50;

#[embassy_executor::task]
pub async fn kernel_task(mut kernel: DeviceKernel, buttons: Buttons) {
    info!("Kernel task started");

    let start = Instant::now();
    if let Err(e) = kernel.start(0) {
        error!("Kernel start failed: {}", e);
        return;
    }

    let interval = u64::from(kernel.config().tick_interval_ms);
    let mut ticker = Ticker::every(Duration::from_millis(interval));
    let mut backlog_ticks = 0u32;

    loop {
        ticker.next().await;

        let now_ms = start.elapsed().as_millis() as u32;
        let report = kernel.tick(now_ms, buttons.sample());

        if report.pending > 0 {
            backlog_ticks += 1;
            if backlog_ticks == BACKLOG_WARN_TICKS {
                warn!("Event backlog for {} ticks ({} pending)", backlog_ticks, report.pending);
            }
        } else {
            backlog_ticks = 0;
        }

        if let Some(screen) = report.committed {
            debug!("Screen {} shown", screen.raw());
        }
    }
}
