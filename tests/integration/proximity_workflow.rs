//! Integration tests for the cm36672p / cm36686 bring-up, runtime and removal

use msm8916_periph::lifecycle::TeardownFailure;
use msm8916_periph::{Cm36672p, Direction, Error, LifecycleState, PowerError, Variant};

use crate::common::{
    Event, MockError, MockInterface, MockSupply, TestSensor, Timeline, create_active_sensor,
    create_sensor,
};

const PS_CONF1: u8 = 0x03;
const PS_CONF3: u8 = 0x04;
const PS_CANC: u8 = 0x05;
const PS_THD_LOW: u8 = 0x06;
const PS_THD_HIGH: u8 = 0x07;
const PS_DATA: u8 = 0x08;
const DEV_ID: u8 = 0x0D;

#[test]
fn test_missing_supply_named() {
    let timeline = Timeline::new();
    let vdd = MockSupply::new("vdd", &timeline);
    let vled = MockSupply::new("vled", &timeline);

    let result: Result<TestSensor, _> = Cm36672p::new(
        MockInterface::new(),
        [Some(vdd), None, Some(vled)],
        Variant::Cm36672p,
        false,
    );

    assert!(matches!(result, Err(Error::ResourceMissing("vddio"))));
}

#[test]
fn test_init_powers_then_programs() {
    let (sensor, mut harness, supplies) = create_sensor(Variant::Cm36672p, false);

    sensor.init(&mut harness.delay).unwrap();

    let events = harness.timeline.events();
    assert_eq!(
        &events[..3],
        &[
            Event::SupplyOn("vdd"),
            Event::SupplyOn("vddio"),
            Event::SupplyOn("vled"),
        ]
    );

    let order: Vec<u8> = harness.interface.writes().iter().map(|(a, _)| *a).collect();
    assert_eq!(order, vec![PS_CONF1, PS_CONF3, PS_THD_HIGH, PS_THD_LOW, PS_CANC]);

    assert_eq!(harness.interface.register_le16(PS_CONF1), 0x0320);
    assert_eq!(harness.interface.register_le16(PS_CONF3), 0x4000);
    assert_eq!(harness.interface.register_le16(PS_THD_HIGH), 0x0011);
    assert_eq!(harness.interface.register_le16(PS_THD_LOW), 0x000d);
    assert_eq!(harness.interface.register_le16(PS_CANC), 0x0000);

    assert!(supplies.iter().all(MockSupply::is_enabled));
    assert_eq!(sensor.state(), LifecycleState::Active);
}

#[test]
fn test_init_cm36686_constants() {
    let (sensor, mut harness, _supplies) = create_sensor(Variant::Cm36686, false);

    sensor.init(&mut harness.delay).unwrap();

    assert_eq!(harness.interface.register_le16(PS_CONF1), 0x03A4);
    assert_eq!(harness.interface.register_le16(PS_CONF3), 0x4210);
    assert_eq!(harness.interface.register_le16(PS_THD_HIGH), 0x0015);
    assert_eq!(harness.interface.register_le16(PS_THD_LOW), 0x000f);
    assert_eq!(harness.interface.register_le16(PS_CANC), 0x0005);
    assert_eq!(sensor.variant(), Variant::Cm36686);
}

#[test]
fn test_init_with_smart_persistence() {
    let (sensor, mut harness, _supplies) = create_sensor(Variant::Cm36672p, true);

    sensor.init(&mut harness.delay).unwrap();

    assert_eq!(harness.interface.register_le16(PS_CONF3), 0x4010);
    assert!(sensor.smart_persistence());
}

#[test]
fn test_init_is_idempotent() {
    let (sensor, mut harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    sensor.init(&mut harness.delay).unwrap();

    assert_eq!(harness.interface.transfer_count(), 0);
    assert!(harness.timeline.events().is_empty());
}

#[test]
fn test_register_failure_unwinds_supplies() {
    let (sensor, mut harness, supplies) = create_sensor(Variant::Cm36672p, false);
    harness.interface.fail_write_at(2);

    let result = sensor.init(&mut harness.delay);

    assert_eq!(result, Err(Error::Bus(MockError::Communication)));
    assert_eq!(
        harness.timeline.power_events()[3..].to_vec(),
        vec![
            Event::SupplyOff("vled"),
            Event::SupplyOff("vddio"),
            Event::SupplyOff("vdd"),
        ]
    );
    assert!(supplies.iter().all(|supply| !supply.is_enabled()));
    assert_eq!(sensor.state(), LifecycleState::Attached);

    sensor.init(&mut harness.delay).unwrap();
    assert_eq!(sensor.state(), LifecycleState::Active);
    assert_eq!(harness.interface.register_le16(PS_THD_HIGH), 0x0011);
}

#[test]
fn test_supply_failure_unwinds_earlier_supplies() {
    let (sensor, mut harness, supplies) = create_sensor(Variant::Cm36672p, false);
    supplies[2].fail_enable(true);

    let result = sensor.init(&mut harness.delay);

    assert_eq!(result, Err(Error::Power(PowerError::Enable("vled"))));
    assert!(supplies.iter().all(|supply| !supply.is_enabled()));
    assert_eq!(harness.interface.transfer_count(), 0);
}

#[test]
fn test_read_raw_is_live() {
    let (sensor, harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    harness.interface.set_register_le16(PS_DATA, 0x0123);
    assert_eq!(sensor.read_raw().unwrap(), 0x0123);

    harness.interface.set_register_le16(PS_DATA, 0x0456);
    assert_eq!(sensor.read_raw().unwrap(), 0x0456);

    assert_eq!(harness.interface.read_count(PS_DATA), 2);
}

#[test]
fn test_read_before_init_rejected() {
    let (sensor, harness, _supplies) = create_sensor(Variant::Cm36672p, false);

    assert_eq!(
        sensor.read_raw(),
        Err(Error::InvalidState(LifecycleState::Attached))
    );
    assert_eq!(harness.interface.transfer_count(), 0);
}

#[test]
fn test_read_device_id() {
    let (sensor, harness, _supplies) = create_active_sensor(Variant::Cm36672p);
    harness.interface.set_register_le16(DEV_ID, 0x0186);

    assert_eq!(sensor.read_device_id().unwrap(), 0x0186);
}

#[test]
fn test_thresholds_served_from_cache() {
    let (sensor, harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    assert_eq!(sensor.read_event_threshold(Direction::Approaching).unwrap(), 0x11);
    assert_eq!(sensor.read_event_threshold(Direction::Receding).unwrap(), 0x0d);
    assert_eq!(harness.interface.transfer_count(), 0);
}

#[test]
fn test_write_threshold() {
    let (sensor, harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    sensor
        .write_event_threshold(Direction::Approaching, 0x0020)
        .unwrap();
    sensor
        .write_event_threshold(Direction::Receding, 0x0008)
        .unwrap();

    assert_eq!(harness.interface.register_le16(PS_THD_HIGH), 0x0020);
    assert_eq!(harness.interface.register_le16(PS_THD_LOW), 0x0008);

    let band = sensor.thresholds().unwrap();
    assert_eq!((band.low(), band.high()), (0x0008, 0x0020));
}

#[test]
fn test_threshold_order_enforced() {
    let (sensor, harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    assert_eq!(
        sensor.write_event_threshold(Direction::Receding, 0x0030),
        Err(Error::InvalidValue)
    );
    assert_eq!(
        sensor.write_event_threshold(Direction::Approaching, 0x000d),
        Err(Error::InvalidValue)
    );
    assert!(harness.interface.writes().is_empty());
}

#[test]
fn test_suspend_and_resume() {
    let (sensor, harness, supplies) = create_active_sensor(Variant::Cm36672p);

    sensor.suspend().unwrap();
    assert_eq!(harness.interface.register_le16(PS_CONF1), 0x0321);
    assert_eq!(sensor.state(), LifecycleState::Suspended);
    assert!(supplies.iter().all(MockSupply::is_enabled));

    // Still readable while the engine is shut down
    harness.interface.set_register_le16(PS_DATA, 0x0002);
    assert_eq!(sensor.read_raw().unwrap(), 0x0002);

    sensor.resume().unwrap();
    assert_eq!(harness.interface.register_le16(PS_CONF1), 0x0320);
    assert_eq!(sensor.state(), LifecycleState::Active);
}

#[test]
fn test_suspend_before_init_rejected() {
    let (sensor, _harness, _supplies) = create_sensor(Variant::Cm36672p, false);

    assert_eq!(
        sensor.suspend(),
        Err(Error::InvalidState(LifecycleState::Attached))
    );
    assert_eq!(
        sensor.resume(),
        Err(Error::InvalidState(LifecycleState::Attached))
    );
}

#[test]
fn test_toggle_smart_persistence() {
    let (sensor, harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    sensor.set_smart_persistence(true).unwrap();
    assert_eq!(harness.interface.register_le16(PS_CONF3), 0x4010);
    assert!(sensor.smart_persistence());

    sensor.set_smart_persistence(false).unwrap();
    assert_eq!(harness.interface.register_le16(PS_CONF3), 0x4000);
    assert!(!sensor.smart_persistence());
}

#[test]
fn test_smart_persistence_write_failure_keeps_setting() {
    let (sensor, harness, _supplies) = create_active_sensor(Variant::Cm36672p);
    harness.interface.fail_next_write();

    assert_eq!(
        sensor.set_smart_persistence(true),
        Err(Error::Bus(MockError::Communication))
    );
    assert!(!sensor.smart_persistence());
}

#[test]
fn test_smart_persistence_deferred_until_init() {
    let (sensor, mut harness, _supplies) = create_sensor(Variant::Cm36672p, false);

    sensor.set_smart_persistence(true).unwrap();
    assert_eq!(harness.interface.transfer_count(), 0);

    sensor.init(&mut harness.delay).unwrap();
    assert_eq!(harness.interface.register_le16(PS_CONF3), 0x4010);
}

#[test]
fn test_remove_disables_in_reverse() {
    let (sensor, mut harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    let (_interface, supplies, report) = sensor.remove(&mut harness.delay);

    assert!(report.is_clean());
    assert_eq!(
        harness.timeline.events(),
        vec![
            Event::SupplyOff("vled"),
            Event::SupplyOff("vddio"),
            Event::SupplyOff("vdd"),
        ]
    );
    assert!(supplies.iter().all(|supply| !supply.is_enabled()));
}

#[test]
fn test_remove_reports_failures_and_completes() {
    let (sensor, mut harness, supplies) = create_active_sensor(Variant::Cm36672p);
    supplies[1].fail_disable(true);

    let (_interface, _supplies, report) = sensor.remove(&mut harness.delay);

    assert_eq!(
        report.failures(),
        &[TeardownFailure::Power(PowerError::Disable("vddio"))]
    );
    assert!(!supplies[0].is_enabled());
    assert!(!supplies[2].is_enabled());
}

#[test]
fn test_remove_unpowered_sensor() {
    let (sensor, mut harness, _supplies) = create_sensor(Variant::Cm36672p, false);

    let (_interface, _supplies, report) = sensor.remove(&mut harness.delay);

    assert!(report.is_clean());
    assert!(harness.timeline.events().is_empty());
}

#[test]
fn test_lifecycle_transitions() {
    let (sensor, mut harness, supplies) = create_sensor(Variant::Cm36672p, false);
    assert_eq!(sensor.state(), LifecycleState::Attached);

    sensor.prepare(&mut harness.delay).unwrap();
    assert_eq!(sensor.state(), LifecycleState::Prepared);
    assert!(supplies.iter().all(MockSupply::is_enabled));

    sensor.enable().unwrap();
    assert_eq!(sensor.state(), LifecycleState::Active);

    sensor.disable().unwrap();
    assert_eq!(sensor.state(), LifecycleState::Prepared);

    sensor.enable().unwrap();
    let report = sensor.unprepare(&mut harness.delay);
    assert!(report.is_clean());
    assert_eq!(sensor.state(), LifecycleState::Unprepared);
    assert!(supplies.iter().all(|supply| !supply.is_enabled()));

    let (_interface, _supplies, report) = sensor.remove(&mut harness.delay);
    assert!(report.is_clean());
}

#[test]
fn test_prepare_stops_at_prepared() {
    let (sensor, mut harness, _supplies) = create_sensor(Variant::Cm36672p, false);

    sensor.prepare(&mut harness.delay).unwrap();
    sensor.prepare(&mut harness.delay).unwrap();

    assert_eq!(harness.interface.writes().len(), 5);
    assert_eq!(sensor.state(), LifecycleState::Prepared);
    assert_eq!(sensor.read_raw().unwrap(), 0);
}

#[test]
fn test_enable_requires_prepare() {
    let (sensor, _harness, _supplies) = create_sensor(Variant::Cm36672p, false);

    assert_eq!(
        sensor.enable(),
        Err(Error::InvalidState(LifecycleState::Attached))
    );
    assert_eq!(
        sensor.disable(),
        Err(Error::InvalidState(LifecycleState::Attached))
    );
}

#[test]
fn test_unprepare_is_idempotent() {
    let (sensor, mut harness, _supplies) = create_active_sensor(Variant::Cm36672p);

    assert!(sensor.unprepare(&mut harness.delay).is_clean());
    harness.timeline.clear();

    assert!(sensor.unprepare(&mut harness.delay).is_clean());
    assert!(harness.timeline.events().is_empty());
    assert_eq!(sensor.state(), LifecycleState::Unprepared);
}

#[test]
fn test_unprepare_reports_failures() {
    let (sensor, mut harness, supplies) = create_active_sensor(Variant::Cm36672p);
    supplies[2].fail_disable(true);

    let report = sensor.unprepare(&mut harness.delay);

    assert_eq!(
        report.failures(),
        &[TeardownFailure::Power(PowerError::Disable("vled"))]
    );
    assert_eq!(sensor.last_report().failures(), report.failures());
    assert_eq!(sensor.state(), LifecycleState::Unprepared);
    assert!(!supplies[0].is_enabled());
}

#[test]
fn test_unprepared_sensor_rejects_access() {
    let (sensor, mut harness, _supplies) = create_active_sensor(Variant::Cm36672p);
    sensor.unprepare(&mut harness.delay);
    harness.interface.clear_operations();

    assert_eq!(
        sensor.read_raw(),
        Err(Error::InvalidState(LifecycleState::Unprepared))
    );
    assert_eq!(
        sensor.read_event_threshold(Direction::Approaching),
        Err(Error::InvalidState(LifecycleState::Unprepared))
    );
    assert_eq!(harness.interface.transfer_count(), 0);
}

#[test]
fn test_prepare_after_unprepare_reprograms() {
    let (sensor, mut harness, _supplies) = create_active_sensor(Variant::Cm36672p);
    sensor
        .write_event_threshold(Direction::Approaching, 0x0020)
        .unwrap();
    sensor.unprepare(&mut harness.delay);
    harness.interface.clear_operations();

    sensor.init(&mut harness.delay).unwrap();

    let order: Vec<u8> = harness.interface.writes().iter().map(|(a, _)| *a).collect();
    assert_eq!(order, vec![PS_CONF1, PS_CONF3, PS_THD_HIGH, PS_THD_LOW, PS_CANC]);
    assert_eq!(sensor.read_event_threshold(Direction::Approaching).unwrap(), 0x11);
    assert_eq!(sensor.state(), LifecycleState::Active);
}
