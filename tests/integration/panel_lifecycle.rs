//! Integration tests for the ili9881c prepare / enable / disable / unprepare cycle

use msm8916_periph::lifecycle::TeardownFailure;
use msm8916_periph::panel::INIT_SEQUENCE;
use msm8916_periph::{Error, Ili9881c, LifecycleState, PowerError};

use crate::common::{
    Event, MS, MockError, MockInterface, MockPin, MockSupply, Operation, Timeline, create_panel,
};

#[test]
fn test_missing_resources() {
    let timeline = Timeline::new();
    let supply = MockSupply::new("power", &timeline);
    let reset = MockPin::new("reset", &timeline);

    let result = Ili9881c::new(MockInterface::new(), None::<MockSupply>, Some(reset));
    assert!(matches!(result, Err(Error::ResourceMissing("power"))));

    let result = Ili9881c::new(MockInterface::new(), Some(supply), None::<MockPin>);
    assert!(matches!(result, Err(Error::ResourceMissing("reset"))));
}

#[test]
fn test_attach_holds_panel_in_reset() {
    let (panel, harness, supply, reset) = create_panel();

    assert_eq!(panel.state(), LifecycleState::Attached);
    assert_eq!(reset.level(), Some(true));
    assert!(!supply.is_enabled());
    assert_eq!(harness.interface.transfer_count(), 0);
}

#[test]
fn test_prepare_sequence() {
    let (mut panel, mut harness, supply, _reset) = create_panel();
    harness.timeline.clear();

    panel.prepare(&mut harness.delay).unwrap();

    assert_eq!(
        harness.timeline.power_events(),
        vec![
            Event::SupplyOn("power"),
            Event::Pin("reset", false),
            Event::Delay(20 * MS),
            Event::Pin("reset", true),
            Event::Delay(20 * MS),
            Event::Pin("reset", false),
            Event::Delay(20 * MS),
        ]
    );

    // Every register write happens after the reset pulse completed
    let events = harness.timeline.events();
    let first_write = events
        .iter()
        .position(|event| matches!(event, Event::Write(_)))
        .unwrap();
    assert_eq!(first_write, 7);

    let writes = harness.interface.writes();
    assert_eq!(writes.len(), INIT_SEQUENCE.len());
    assert_eq!(writes.first(), Some(&(0xFF, vec![0x98, 0x81, 0x03])));
    assert_eq!(writes.last(), Some(&(0xFF, vec![0x98, 0x81, 0x00])));
    assert!(
        harness
            .interface
            .operations()
            .iter()
            .all(|op| matches!(op, Operation::Write { .. })),
        "Panel is never read back"
    );

    assert!(supply.is_enabled());
    assert_eq!(panel.state(), LifecycleState::Prepared);
}

#[test]
fn test_prepare_is_idempotent() {
    let (mut panel, mut harness, _supply, _reset) = create_panel();

    panel.prepare(&mut harness.delay).unwrap();
    let transfers = harness.interface.transfer_count();

    panel.prepare(&mut harness.delay).unwrap();
    assert_eq!(harness.interface.transfer_count(), transfers);
}

#[test]
fn test_enable_and_disable_commands() {
    let (mut panel, mut harness, _supply, _reset) = create_panel();
    panel.prepare(&mut harness.delay).unwrap();
    harness.interface.clear_operations();
    harness.timeline.clear();

    panel.enable(&mut harness.delay).unwrap();
    assert_eq!(panel.state(), LifecycleState::Active);
    assert_eq!(
        harness.timeline.events(),
        vec![
            Event::Write(0x11),
            Event::Delay(120 * MS),
            Event::Write(0x29),
            Event::Delay(32 * MS),
        ]
    );

    harness.timeline.clear();
    panel.disable(&mut harness.delay).unwrap();
    assert_eq!(panel.state(), LifecycleState::Prepared);
    assert_eq!(
        harness.timeline.events(),
        vec![
            Event::Write(0x28),
            Event::Delay(50 * MS),
            Event::Write(0x10),
            Event::Delay(120 * MS),
        ]
    );

    assert!(harness.interface.writes().iter().all(|(_, data)| data.is_empty()));
}

#[test]
fn test_enable_requires_prepare() {
    let (mut panel, mut harness, _supply, _reset) = create_panel();

    assert_eq!(
        panel.enable(&mut harness.delay),
        Err(Error::InvalidState(LifecycleState::Attached))
    );
    assert_eq!(harness.interface.transfer_count(), 0);
}

#[test]
fn test_unprepare_powers_down() {
    let (mut panel, mut harness, supply, reset) = create_panel();
    panel.prepare(&mut harness.delay).unwrap();
    panel.enable(&mut harness.delay).unwrap();
    harness.timeline.clear();

    let report = panel.unprepare(&mut harness.delay);
    assert!(report.is_clean());

    assert_eq!(
        harness.timeline.events(),
        vec![
            Event::Write(0x28),
            Event::Delay(50 * MS),
            Event::Write(0x10),
            Event::Delay(120 * MS),
            Event::Pin("reset", true),
            Event::SupplyOff("power"),
        ]
    );
    assert!(!supply.is_enabled());
    assert_eq!(reset.level(), Some(true));
    assert_eq!(panel.state(), LifecycleState::Unprepared);
}

#[test]
fn test_unprepare_continues_after_command_failure() {
    let (mut panel, mut harness, supply, _reset) = create_panel();
    panel.prepare(&mut harness.delay).unwrap();
    panel.enable(&mut harness.delay).unwrap();
    harness.interface.fail_next_write();

    let report = panel.unprepare(&mut harness.delay);

    assert_eq!(report.failures(), &[TeardownFailure::Command("display_off")]);
    assert!(!supply.is_enabled());
    assert_eq!(panel.state(), LifecycleState::Unprepared);
}

#[test]
fn test_unprepare_records_supply_failure() {
    let (mut panel, mut harness, supply, _reset) = create_panel();
    panel.prepare(&mut harness.delay).unwrap();
    supply.fail_disable(true);

    let report = panel.unprepare(&mut harness.delay);

    assert_eq!(
        report.failures(),
        &[TeardownFailure::Power(PowerError::Disable("power"))]
    );
    assert_eq!(panel.state(), LifecycleState::Unprepared);
}

#[test]
fn test_unprepare_when_unpowered_does_nothing() {
    let (mut panel, mut harness, _supply, _reset) = create_panel();
    harness.timeline.clear();

    assert!(panel.unprepare(&mut harness.delay).is_clean());
    assert!(harness.timeline.events().is_empty());
    assert_eq!(panel.state(), LifecycleState::Attached);
}

#[test]
fn test_failed_init_table_rolls_back() {
    let (mut panel, mut harness, supply, reset) = create_panel();
    harness.interface.fail_write_at(10);

    let result = panel.prepare(&mut harness.delay);

    assert_eq!(result, Err(Error::Bus(MockError::Communication)));
    assert_eq!(harness.interface.writes().len(), 10);
    assert!(!supply.is_enabled());
    assert_eq!(reset.level(), Some(true));
    assert_eq!(panel.state(), LifecycleState::Attached);

    // A later attempt starts from scratch and succeeds
    panel.prepare(&mut harness.delay).unwrap();
    assert_eq!(panel.state(), LifecycleState::Prepared);
}

#[test]
fn test_supply_failure_aborts_prepare() {
    let (mut panel, mut harness, supply, _reset) = create_panel();
    supply.fail_enable(true);

    let result = panel.prepare(&mut harness.delay);

    assert_eq!(result, Err(Error::Power(PowerError::Enable("power"))));
    assert_eq!(harness.interface.transfer_count(), 0);
    assert_eq!(panel.state(), LifecycleState::Attached);
}

#[test]
fn test_reset_failure_aborts_prepare() {
    let (mut panel, mut harness, supply, reset) = create_panel();
    reset.fail(true);

    let result = panel.prepare(&mut harness.delay);

    assert_eq!(result, Err(Error::Power(PowerError::ResetLine)));
    assert!(!supply.is_enabled());
    assert_eq!(harness.interface.transfer_count(), 0);
}

#[test]
fn test_detach_returns_resources() {
    let (mut panel, mut harness, _supply, _reset) = create_panel();
    panel.prepare(&mut harness.delay).unwrap();

    let (_interface, supply, reset) = panel.detach(&mut harness.delay);

    assert!(!supply.is_enabled());
    assert_eq!(reset.level(), Some(true));
}

#[test]
fn test_modes_and_link() {
    let (panel, _harness, _supply, _reset) = create_panel();

    let modes = panel.get_modes();
    assert_eq!(modes.len(), 1);
    assert_eq!((modes[0].hdisplay, modes[0].vdisplay), (720, 1280));
    assert!(modes[0].preferred);
    assert_eq!(modes[0].refresh_hz(), 60);

    let link = panel.dsi_config();
    assert_eq!(link.lanes, 4);
    assert!(link.video && link.burst);
}
