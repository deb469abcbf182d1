//! Fanstat Firmware — Main Entry Point
//!
//! Time-triggered cooperative execution around a hexagonal core:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter    Lcd1602      FlashSector    LogEventSink │
//! │  (Fan+Buttons)      (Display)    (Setpoint)     (EventSink)  │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │        ThermostatService (pure logic)              │      │
//! │  │  FSM · hysteresis · debounce dispatch              │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  Scheduler (Input 50 ms · Control 100 ms ·                   │
//! │             Sensor 500 ms · Display 200 ms)                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs in one context.  The only blocking spots are the
//! 1-Wire bit slots and the 400 ms conversion wait inside the Sensor
//! task, which stall every other task for their duration.
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod scheduler;
pub mod storage;

mod adapters;
mod drivers;
mod pins;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::{anyhow, Result};
use log::info;

use adapters::display::Lcd1602;
use adapters::flash::FlashSector;
use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use adapters::time::TimeAdapter;
use app::ports::{ButtonInputPort, SensorPort, TaskId, TaskRunner};
use app::service::ThermostatService;
use config::SystemConfig;
use drivers::button::ButtonBank;
use drivers::delay::CycleDelay;
use scheduler::Scheduler;
use sensors::ds18b20::Ds18b20;
use storage::SetpointStore;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;

// ── Task dispatcher ───────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about the application) to
// the service and its adapters.  One arm per scheduled task; the
// scheduler guarantees priority order within a pass.

struct TaskDispatcher<S: SensorPort> {
    service: ThermostatService,
    hw: HardwareAdapter,
    buttons: ButtonBank,
    probe: S,
    store: SetpointStore<FlashSector>,
    lcd: Lcd1602,
    sink: LogEventSink,
}

impl<S: SensorPort> TaskRunner for TaskDispatcher<S> {
    fn run_task(&mut self, task: TaskId) {
        match task {
            TaskId::Input => {
                let raw = self.hw.read_raw();
                for button in self.buttons.sample(raw) {
                    self.service
                        .handle_button(button, &mut self.store, &mut self.sink);
                }
            }

            TaskId::Control => {
                self.service.control_tick(&mut self.hw, &mut self.sink);
            }

            TaskId::Sensor => {
                // Blocks for the conversion wait; the scheduler skips
                // whatever cycles this starves.
                let reading = self.probe.read_temperature();
                self.service.update_temperature(reading, &mut self.sink);
            }

            TaskId::Display => {
                self.service.render(&mut self.lcd);
            }
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("fanstat v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();
    config.validate().map_err(|msg| anyhow!("config: {msg}"))?;

    // ── 2. Claim peripherals ──────────────────────────────────
    let peripherals = Peripherals::take()?;

    // SAFETY: each GPIO below is claimed exactly once, from the numbers
    // in `pins`; nothing else in the firmware touches them.
    let fan_pin = unsafe { AnyOutputPin::new(pins::FAN_GPIO) };
    let up_pin = unsafe { AnyIOPin::new(pins::BUTTON_UP_GPIO) };
    let down_pin = unsafe { AnyIOPin::new(pins::BUTTON_DOWN_GPIO) };
    let set_pin = unsafe { AnyIOPin::new(pins::BUTTON_SET_GPIO) };
    let power_pin = unsafe { AnyIOPin::new(pins::BUTTON_POWER_GPIO) };
    let onewire_pin = unsafe { AnyIOPin::new(pins::ONEWIRE_GPIO) };
    let sda_pin = unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) };
    let scl_pin = unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) };

    let hw = HardwareAdapter::new(fan_pin, up_pin, down_pin, set_pin, power_pin)
        .map_err(|e| anyhow!("hardware: {e}"))?;

    // 1-Wire line: open-drain, driven low or released, sampled as input.
    let onewire = PinDriver::input_output_od(onewire_pin)
        .map_err(|e| anyhow!("onewire gpio: {e}"))?;
    let probe = Ds18b20::new(onewire, CycleDelay::new());

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        sda_pin,
        scl_pin,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )
    .map_err(|e| anyhow!("i2c: {e}"))?;
    let lcd = Lcd1602::new(i2c, pins::LCD_I2C_ADDR).map_err(|e| anyhow!("lcd: {e}"))?;

    // ── 3. Restore the setpoint ───────────────────────────────
    let flash = FlashSector::open().map_err(|e| anyhow!("flash: {e}"))?;
    let mut store = SetpointStore::new(flash, &config);
    let report = store.init();

    // ── 4. Construct and start the service ────────────────────
    let mut sink = LogEventSink::new();
    let mut service = ThermostatService::new(config.clone(), report.setpoint, report.valid);
    service.start(&mut sink);

    let mut dispatcher = TaskDispatcher {
        service,
        hw,
        buttons: ButtonBank::new(),
        probe,
        store,
        lcd,
        sink,
    };

    // ── 5. Cooperative loop ───────────────────────────────────
    let clock = TimeAdapter::new();
    let mut sched = Scheduler::new(&config);
    sched.init(clock.uptime_ms());

    info!("entering control loop");
    loop {
        sched.run_once(clock.uptime_ms(), &mut dispatcher);
        // 1 kHz polling beat — far faster than the shortest task period,
        // and yields to the IDLE task so its watchdog stays fed.
        FreeRtos::delay_ms(1);
    }
}
