//! Common test utilities and mock implementations


use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use msm8916_periph::{Cm36672p, Ili9881c, Sm5703, Variant};

pub use mock_interface::{MockError, MockInterface, Operation};
pub use test_utils::{Event, MS, MockClock, MockDelay, MockPin, MockSupply, Timeline, VecSink};

/// Panel under test
pub type TestPanel = Ili9881c<MockInterface, MockSupply, MockPin>;

/// Proximity sensor under test
pub type TestSensor = Cm36672p<NoopRawMutex, MockInterface, MockSupply>;

/// PMIC core under test
pub type TestPmic = Sm5703<MockInterface, MockPin>;

/// DEVICE_ID contents used by [`create_pmic`]: vendor 1, revision 2
pub const PMIC_DEVICE_ID: u8 = 0x21;

/// Handles a test keeps after handing clones to a driver
#[allow(dead_code)]
pub struct Harness {
    /// Bus transport shared with the driver
    pub interface: MockInterface,
    /// Ordered log of everything the mocks saw
    pub timeline: Timeline,
    /// Delay provider logging to `timeline`
    pub delay: MockDelay,
}

impl Harness {
    fn new() -> Self {
        let timeline = Timeline::new();
        Self {
            interface: MockInterface::new().with_timeline(&timeline),
            delay: MockDelay::new(&timeline),
            timeline,
        }
    }
}

/// Create an attached panel with a `power` supply and a `reset` line
#[allow(dead_code)]
pub fn create_panel() -> (TestPanel, Harness, MockSupply, MockPin) {
    let harness = Harness::new();
    let supply = MockSupply::new("power", &harness.timeline);
    let reset = MockPin::new("reset", &harness.timeline);

    let panel = Ili9881c::new(
        harness.interface.clone(),
        Some(supply.clone()),
        Some(reset.clone()),
    )
    .unwrap();

    (panel, harness, supply, reset)
}

/// Create an attached proximity sensor with `vdd`, `vddio` and `vled`
#[allow(dead_code)]
pub fn create_sensor(variant: Variant, smart_pers: bool) -> (TestSensor, Harness, [MockSupply; 3]) {
    let harness = Harness::new();
    let supplies = ["vdd", "vddio", "vled"].map(|name| MockSupply::new(name, &harness.timeline));

    let sensor = Cm36672p::new(
        harness.interface.clone(),
        supplies.clone().map(Some),
        variant,
        smart_pers,
    )
    .unwrap();

    (sensor, harness, supplies)
}

/// Create an initialized proximity sensor
#[allow(dead_code)]
pub fn create_active_sensor(variant: Variant) -> (TestSensor, Harness, [MockSupply; 3]) {
    let (sensor, mut harness, supplies) = create_sensor(variant, false);
    sensor.init(&mut harness.delay).unwrap();
    harness.interface.clear_operations();
    harness.timeline.clear();
    (sensor, harness, supplies)
}

/// Create an attached PMIC answering with [`PMIC_DEVICE_ID`]
#[allow(dead_code)]
pub fn create_pmic() -> (TestPmic, Harness, MockPin) {
    let harness = Harness::new();
    harness.interface.set_register_u8(0x1E, PMIC_DEVICE_ID);
    let reset = MockPin::new("reset", &harness.timeline);

    let pmic = Sm5703::new(harness.interface.clone(), Some(reset.clone())).unwrap();

    (pmic, harness, reset)
}

/// Create an initialized PMIC
#[allow(dead_code)]
pub fn create_active_pmic() -> (TestPmic, Harness, MockPin) {
    let (mut pmic, mut harness, reset) = create_pmic();
    pmic.init(&mut harness.delay).unwrap();
    harness.interface.clear_operations();
    harness.timeline.clear();
    (pmic, harness, reset)
}
