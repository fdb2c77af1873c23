//! Display task
//!
//! Owns the I2C bus. Waits for frames presented by the kernel and flushes
//! the latest one; frames presented faster than the bus can take them are
//! coalesced by the signal.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_time::{Duration, Timer};
use portable_atomic::Ordering;

use crate::channels::{FRAME, PANEL_READY};
use crate::config::{DISPLAY_COLUMN_OFFSET, DISPLAY_CONTRAST, DISPLAY_I2C_ADDRESS};
use crate::display::Sh1106;

/// Delay between panel initialisation attempts
const INIT_RETRY_MS: u64 = 1000;

#[embassy_executor::task]
pub async fn display_task(i2c: I2c<'static, I2C1, Async>) {
    info!("Display task started");

    let mut panel = Sh1106::new(i2c, DISPLAY_I2C_ADDRESS, DISPLAY_COLUMN_OFFSET);

    while let Err(e) = panel.init(DISPLAY_CONTRAST).await {
        warn!("Display init failed: {}, retrying", e);
        Timer::after(Duration::from_millis(INIT_RETRY_MS)).await;
    }
    PANEL_READY.store(true, Ordering::Release);
    info!("Display ready");

    loop {
        let frame = FRAME.wait().await;
        if let Err(e) = panel.flush(&frame).await {
            warn!("Display flush failed: {}", e);
        }
    }
}
