//! End-to-end flows over the service and its ports: button journeys,
//! persistence across reboot, fan control, sensor faults, display frames.

use crate::mock_hw::{MockDisplay, MockFan, MockSink, MockStore};
use fanstat::adapters::flash::FlashSector;
use fanstat::app::events::AppEvent;
use fanstat::app::service::ThermostatService;
use fanstat::config::SystemConfig;
use fanstat::drivers::button::{Button, ButtonBank, BUTTON_COUNT};
use fanstat::error::SensorError;
use fanstat::fsm::Mode;
use fanstat::storage::SetpointStore;

fn raw(button: Button) -> [bool; BUTTON_COUNT] {
    let mut levels = [false; BUTTON_COUNT];
    levels[button as usize] = true;
    levels
}

/// Service booted the way main() does it, against the given store state.
fn boot(setpoint: i8, restored: bool) -> (ThermostatService, MockStore, MockSink) {
    let mut service = ThermostatService::new(SystemConfig::default(), setpoint, restored);
    let mut sink = MockSink::new();
    service.start(&mut sink);
    (service, MockStore::new(), sink)
}

/// Press a button through the service directly (already debounced).
fn press(
    service: &mut ThermostatService,
    store: &mut MockStore,
    sink: &mut MockSink,
    button: Button,
) {
    service.handle_button(button, store, sink);
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_with_blank_flash_runs_on_default() {
    let config = SystemConfig::default();
    let mut flash = FlashSector::new();
    let mut store = SetpointStore::new(&mut flash, &config);

    let report = store.init();
    assert!(!report.valid);
    assert_eq!(report.setpoint, 28);

    let mut service = ThermostatService::new(config, report.setpoint, report.valid);
    let mut sink = MockSink::new();
    service.start(&mut sink);

    assert_eq!(service.mode(), Mode::Off);
    assert_eq!(service.setpoint(), 28);
    assert!(sink.events.contains(&AppEvent::Started {
        mode: Mode::Off,
        setpoint: 28,
        restored: false,
    }));

    let mut lcd = MockDisplay::new();
    service.render(&mut lcd);
    assert_eq!(lcd.line(0), "T:--.-- C S:28  ");
    assert_eq!(lcd.line(1), "M:OFF F:OFF     ");
}

#[test]
fn setpoint_edits_survive_reboot() {
    let config = SystemConfig::default();
    let mut flash = FlashSector::new();

    // First power cycle: blank media, user dials 28 → 31.
    {
        let mut store = SetpointStore::new(&mut flash, &config);
        let report = store.init();
        let mut service = ThermostatService::new(config.clone(), report.setpoint, report.valid);
        let mut sink = MockSink::new();
        service.start(&mut sink);

        service.handle_button(Button::Power, &mut store, &mut sink);
        service.handle_button(Button::Set, &mut store, &mut sink);
        for _ in 0..3 {
            service.handle_button(Button::Up, &mut store, &mut sink);
        }
        assert_eq!(service.setpoint(), 31);
    }

    // Second power cycle: the record is valid and carries 31.
    let mut store = SetpointStore::new(&mut flash, &config);
    let report = store.init();
    assert!(report.valid);
    assert_eq!(report.setpoint, 31);
}

// ── Input path ────────────────────────────────────────────────

#[test]
fn debounce_feeds_exactly_one_press_into_the_service() {
    let (mut service, mut store, mut sink) = boot(28, true);
    let mut bank = ButtonBank::new();

    // Hold POWER for ten 50 ms samples: confirmed once, held after.
    for _ in 0..10 {
        for button in bank.sample(raw(Button::Power)) {
            press(&mut service, &mut store, &mut sink, button);
        }
    }

    assert_eq!(service.mode(), Mode::Normal);
    let toggles = sink.count(|e| matches!(e, AppEvent::ModeChanged { .. }));
    assert_eq!(toggles, 1, "held button must not re-toggle power");
}

#[test]
fn bounce_never_reaches_the_service() {
    let (mut service, mut store, mut sink) = boot(28, true);
    let mut bank = ButtonBank::new();

    // Two pressed samples then a release — classic contact bounce.
    for levels in [raw(Button::Power), raw(Button::Power), [false; BUTTON_COUNT]] {
        for button in bank.sample(levels) {
            press(&mut service, &mut store, &mut sink, button);
        }
    }

    assert_eq!(service.mode(), Mode::Off);
}

#[test]
fn every_keystroke_persists_once() {
    let (mut service, mut store, mut sink) = boot(28, true);
    press(&mut service, &mut store, &mut sink, Button::Power);
    press(&mut service, &mut store, &mut sink, Button::Set);
    assert_eq!(service.mode(), Mode::Setting);

    for _ in 0..3 {
        press(&mut service, &mut store, &mut sink, Button::Up);
    }
    press(&mut service, &mut store, &mut sink, Button::Down);

    // One erase+program per effective keystroke, in order.
    assert_eq!(store.saves, vec![29, 30, 31, 30]);
    assert_eq!(store.record, Some(30));
}

#[test]
fn clamped_keystrokes_do_not_touch_the_store() {
    let (mut service, mut store, mut sink) = boot(50, true);
    press(&mut service, &mut store, &mut sink, Button::Power);
    press(&mut service, &mut store, &mut sink, Button::Set);

    press(&mut service, &mut store, &mut sink, Button::Up);
    assert_eq!(service.setpoint(), 50);
    assert!(store.saves.is_empty());
}

#[test]
fn power_in_setting_changes_nothing() {
    let (mut service, mut store, mut sink) = boot(28, true);
    press(&mut service, &mut store, &mut sink, Button::Power);
    press(&mut service, &mut store, &mut sink, Button::Set);

    press(&mut service, &mut store, &mut sink, Button::Power);
    assert_eq!(service.mode(), Mode::Setting);
    assert!(store.saves.is_empty());
}

// ── Control path ──────────────────────────────────────────────

#[test]
fn hysteresis_drives_the_relay_with_two_edges() {
    let (mut service, mut store, mut sink) = boot(25, true);
    let mut fan = MockFan::new();
    press(&mut service, &mut store, &mut sink, Button::Power);

    for temp in [24.9, 25.0, 24.5, 24.1, 24.0, 23.5] {
        service.update_temperature(Ok(temp), &mut sink);
        service.control_tick(&mut fan, &mut sink);
    }

    // Off at 24.9 → on at 25.0 → held through the dead band → off at 24.0.
    assert_eq!(fan.history, vec![false, true, true, true, false, false]);
    assert_eq!(fan.edges(), 2);
}

#[test]
fn power_off_forces_the_fan_off() {
    let (mut service, mut store, mut sink) = boot(25, true);
    let mut fan = MockFan::new();
    press(&mut service, &mut store, &mut sink, Button::Power);

    service.update_temperature(Ok(30.0), &mut sink);
    service.control_tick(&mut fan, &mut sink);
    assert!(fan.on);

    press(&mut service, &mut store, &mut sink, Button::Power); // → Off
    service.control_tick(&mut fan, &mut sink);
    assert!(!fan.on);
    // Still hot — Off overrides hysteresis on every tick.
    service.update_temperature(Ok(35.0), &mut sink);
    service.control_tick(&mut fan, &mut sink);
    assert!(!fan.on);
}

// ── Sensor path ───────────────────────────────────────────────

#[test]
fn sensor_fault_holds_the_last_reading() {
    let (mut service, mut store, mut sink) = boot(25, true);
    let mut fan = MockFan::new();
    press(&mut service, &mut store, &mut sink, Button::Power);

    service.update_temperature(Ok(26.0), &mut sink);
    service.control_tick(&mut fan, &mut sink);
    assert!(fan.on);

    // The probe disappears; control keeps acting on 26.0 °C.
    for _ in 0..5 {
        service.update_temperature(Err(SensorError::NoDevice), &mut sink);
        service.control_tick(&mut fan, &mut sink);
    }
    assert!(fan.on);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorFault(_))), 1);

    service.update_temperature(Ok(20.0), &mut sink);
    service.control_tick(&mut fan, &mut sink);
    assert!(!fan.on);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorRecovered)), 1);
}

// ── Display path ──────────────────────────────────────────────

#[test]
fn display_frames_track_the_journey() {
    let (mut service, mut store, mut sink) = boot(28, true);
    let mut fan = MockFan::new();
    let mut lcd = MockDisplay::new();

    press(&mut service, &mut store, &mut sink, Button::Power);
    service.update_temperature(Ok(29.5), &mut sink);
    service.control_tick(&mut fan, &mut sink);
    service.render(&mut lcd);
    assert_eq!(lcd.line(0), "T:29.50 C S:28  ");
    assert_eq!(lcd.line(1), "M:NORMAL F:ON   ");

    press(&mut service, &mut store, &mut sink, Button::Set);
    press(&mut service, &mut store, &mut sink, Button::Down);
    service.render(&mut lcd);
    assert_eq!(lcd.line(0), "T:29.50 C S:27  ");
    assert_eq!(lcd.line(1), "M:SETTING F:ON  ");

    press(&mut service, &mut store, &mut sink, Button::Set);
    press(&mut service, &mut store, &mut sink, Button::Power);
    service.control_tick(&mut fan, &mut sink);
    service.render(&mut lcd);
    assert_eq!(lcd.line(1), "M:OFF F:OFF     ");
}

#[test]
fn save_failure_keeps_panel_and_memory_consistent() {
    let (mut service, mut store, mut sink) = boot(28, true);
    let mut lcd = MockDisplay::new();
    press(&mut service, &mut store, &mut sink, Button::Power);
    press(&mut service, &mut store, &mut sink, Button::Set);

    store.fail_saves = true;
    press(&mut service, &mut store, &mut sink, Button::Up);

    // The user saw the setpoint move; the panel must agree even though
    // the flash write failed.
    assert_eq!(service.setpoint(), 29);
    service.render(&mut lcd);
    assert_eq!(lcd.line(0), "T:--.-- C S:29  ");
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SetpointSaveFailed(_))), 1);
}
