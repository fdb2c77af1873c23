//! Battery sampling task
//!
//! Reads VSYS through the on-board divider and publishes the result in
//! millivolts for the battery service.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use crate::channels::BATTERY_MV;
use crate::config::{BATTERY_DIVIDER, BATTERY_SAMPLE_MS};

/// ADC reference voltage (mV)
const ADC_REF_MV: u32 = 3300;

/// Full-scale ADC reading (12-bit)
const ADC_MAX: u32 = 4096;

/// Convert a raw ADC reading into the voltage before the divider
pub fn adc_to_mv(raw: u16, divider: u32) -> u32 {
    u32::from(raw) * ADC_REF_MV * divider / ADC_MAX
}

#[embassy_executor::task]
pub async fn battery_task(mut adc: Adc<'static, Async>, mut vsys: Channel<'static>) {
    info!("Battery task started");

    let mut ticker = Ticker::every(Duration::from_millis(BATTERY_SAMPLE_MS));

    loop {
        match adc.read(&mut vsys).await {
            Ok(raw) => {
                let mv = adc_to_mv(raw, BATTERY_DIVIDER);
                trace!("VSYS {} mV", mv);
                BATTERY_MV.store(mv, Ordering::Relaxed);
            }
            Err(e) => warn!("Battery ADC read failed: {}", e),
        }

        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adc_to_mv() {
        assert_eq!(adc_to_mv(0, 3), 0);
        // 1.2 V at the pin, 3.6 V at VSYS
        assert_eq!(adc_to_mv(1489, 3), 3598);
        assert_eq!(adc_to_mv(4095, 1), 3299);
    }
}
