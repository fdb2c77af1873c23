//! ionOS firmware
//!
//! Handheld firmware for RP2040 boards: six buttons on GPIO 2-7, an SH1106
//! 128x64 OLED on I2C1 (GPIO 14/15) and VSYS sensing on GPIO 29.
//!
//! The kernel runs in its own task at the configured tick interval; the
//! display and battery tasks do the slow I/O and talk to it through
//! [`channels`].

#![no_std]
#![no_main]

mod apps;
mod buttons;
mod channels;
mod config;
mod display;
mod services;
mod tasks;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C1;
use ionos_core::{App, Kernel};
use ionos_hal::ButtonBank;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::apps::{About, Launcher};
use crate::buttons::ButtonPin;
use crate::channels::EVENT_QUEUE;
use crate::display::OledBackend;
use crate::services::BatteryService;
use crate::tasks::DeviceKernel;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

/// I2C bus speed for the panel
const I2C_FREQUENCY_HZ: u32 = 400_000;

static LAUNCHER: StaticCell<Launcher> = StaticCell::new();
static ABOUT: StaticCell<About> = StaticCell::new();
static BATTERY: StaticCell<BatteryService> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ionOS starting on {}", config::DEVICE_NAME);

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let buttons = ButtonBank::new(
        [
            ButtonPin::new(Input::new(p.PIN_2, Pull::Up)),
            ButtonPin::new(Input::new(p.PIN_3, Pull::Up)),
            ButtonPin::new(Input::new(p.PIN_4, Pull::Up)),
            ButtonPin::new(Input::new(p.PIN_5, Pull::Up)),
            ButtonPin::new(Input::new(p.PIN_6, Pull::Up)),
            ButtonPin::new(Input::new(p.PIN_7, Pull::Up)),
        ],
        config::button_polarity(),
    );

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_async(p.I2C1, p.PIN_15, p.PIN_14, Irqs, i2c_config);

    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let vsys = Channel::new_pin(p.PIN_29, Pull::None);

    let mut kernel: DeviceKernel =
        match Kernel::new(config::kernel_config(), &EVENT_QUEUE, OledBackend::new()) {
            Ok(kernel) => kernel,
            Err(e) => defmt::panic!("Invalid kernel configuration: {}", e),
        };

    // Apps go in before the launcher so it can list them by id
    let launcher = LAUNCHER.init(Launcher::new());
    let apps: [(&'static mut dyn App, &'static str); 1] = [(ABOUT.init(About::new()), "About")];

    for (app, name) in apps {
        match kernel.register_app(app) {
            Ok(id) => {
                if launcher.add(id, name).is_err() {
                    warn!("Launcher full, {} not listed", name);
                }
            }
            Err(e) => warn!("Failed to register {}: {}", name, e),
        }
    }

    match kernel.register_app(launcher) {
        Ok(id) => unwrap!(kernel.set_root_app(id)),
        Err(e) => defmt::panic!("Failed to register launcher: {}", e),
    }

    let battery = BATTERY.init(BatteryService::new(
        config::BATTERY_LOW_MV,
        config::BATTERY_RECOVER_MV,
        config::BATTERY_SAMPLE_MS as u32,
    ));
    if let Err(e) = kernel.attach_service(battery) {
        warn!("Battery service not attached: {}", e);
    }

    info!("Kernel configured");

    spawner.spawn(tasks::display_task(i2c)).unwrap();
    spawner.spawn(tasks::battery_task(adc, vsys)).unwrap();
    spawner.spawn(tasks::kernel_task(kernel, buttons)).unwrap();

    info!("All tasks spawned, firmware running");
}
