//! Unit tests for the cached register map

use msm8916_periph::Error;
use msm8916_periph::regmap::{CacheType, Endian, Regmap, RegmapConfig, ValueWidth};

use crate::common::{MockError, MockInterface, Operation};

const fn is_data_register(reg: u8) -> bool {
    matches!(reg, 0x08 | 0x0C)
}

const SENSOR_LIKE: RegmapConfig = RegmapConfig::new("test16", ValueWidth::Bits16)
    .with_endian(Endian::Little)
    .with_max_register(0x0D)
    .with_cache_type(CacheType::Flat)
    .with_volatile_reg(is_data_register);

const BYTE_MAP: RegmapConfig = RegmapConfig::new("test8", ValueWidth::Bits8)
    .with_max_register(0xFE)
    .with_cache_type(CacheType::Flat);

fn create_map(config: RegmapConfig) -> (Regmap<MockInterface>, MockInterface) {
    let interface = MockInterface::new();
    (Regmap::new(interface.clone(), config), interface)
}

#[test]
fn test_write_then_read_served_from_cache() {
    let (mut map, interface) = create_map(SENSOR_LIKE);

    map.write(0x03, 0x0320).unwrap();
    interface.clear_operations();

    assert_eq!(map.read(0x03).unwrap(), 0x0320);
    assert_eq!(interface.transfer_count(), 0, "Cached read must not touch the bus");
}

#[test]
fn test_first_read_populates_cache() {
    let (mut map, interface) = create_map(SENSOR_LIKE);
    interface.set_register_le16(0x04, 0x4010);

    assert_eq!(map.read(0x04).unwrap(), 0x4010);
    assert_eq!(map.cached(0x04), Some(0x4010));

    // Hardware changes behind the map's back; the shadow still answers
    interface.set_register_le16(0x04, 0x0000);
    assert_eq!(map.read(0x04).unwrap(), 0x4010);
    assert_eq!(interface.read_count(0x04), 1);
}

#[test]
fn test_volatile_register_always_read() {
    let (mut map, interface) = create_map(SENSOR_LIKE);

    interface.set_register_le16(0x08, 0x0012);
    assert_eq!(map.read(0x08).unwrap(), 0x0012);

    interface.set_register_le16(0x08, 0x0345);
    assert_eq!(map.read(0x08).unwrap(), 0x0345);

    assert_eq!(interface.read_count(0x08), 2);
    assert_eq!(map.cached(0x08), None);
}

#[test]
fn test_volatile_write_not_cached() {
    let (mut map, _interface) = create_map(SENSOR_LIKE);

    map.write(0x0C, 0x0100).unwrap();
    assert_eq!(map.cached(0x0C), None);
}

#[test]
fn test_out_of_range_address_rejected_before_bus() {
    let (mut map, interface) = create_map(SENSOR_LIKE);

    assert_eq!(map.read(0x0E), Err(Error::InvalidAddress(0x0E)));
    assert_eq!(map.write(0x20, 1), Err(Error::InvalidAddress(0x20)));
    assert_eq!(interface.transfer_count(), 0);
}

#[test]
fn test_last_register_is_valid() {
    let (mut map, interface) = create_map(SENSOR_LIKE);
    interface.set_register_le16(0x0D, 0x0186);

    assert_eq!(map.read(0x0D).unwrap(), 0x0186);
}

#[test]
fn test_value_wider_than_register_rejected() {
    let (mut map, interface) = create_map(BYTE_MAP);

    assert_eq!(map.write(0x10, 0x0100), Err(Error::InvalidValue));
    assert_eq!(interface.transfer_count(), 0);
    assert_eq!(map.cached(0x10), None);
}

#[test]
fn test_failed_write_leaves_cache_unchanged() {
    let (mut map, interface) = create_map(SENSOR_LIKE);

    map.write(0x03, 0x0001).unwrap();
    interface.fail_next_write();

    assert_eq!(map.write(0x03, 0x0002), Err(Error::Bus(MockError::Communication)));
    assert_eq!(map.cached(0x03), Some(0x0001));
    assert_eq!(map.read(0x03).unwrap(), 0x0001);
}

#[test]
fn test_failed_read_not_cached() {
    let (mut map, interface) = create_map(SENSOR_LIKE);
    interface.set_register_le16(0x05, 0x0007);
    interface.fail_next_read();

    assert_eq!(map.read(0x05), Err(Error::Bus(MockError::Communication)));
    assert_eq!(map.cached(0x05), None);
    assert_eq!(map.read(0x05).unwrap(), 0x0007);
}

#[test]
fn test_update_bits_skips_unchanged_write() {
    let (mut map, interface) = create_map(SENSOR_LIKE);

    map.write(0x03, 0x0320).unwrap();
    interface.clear_operations();

    map.update_bits(0x03, 0x0001, 0x0000).unwrap();
    assert_eq!(interface.transfer_count(), 0);

    map.set_bits(0x03, 0x0001).unwrap();
    assert_eq!(
        interface.operations(),
        vec![Operation::Write {
            address: 0x03,
            data: vec![0x21, 0x03],
        }]
    );

    map.clear_bits(0x03, 0x0001).unwrap();
    assert_eq!(map.read(0x03).unwrap(), 0x0320);
}

#[test]
fn test_invalidate_forces_bus_read() {
    let (mut map, interface) = create_map(BYTE_MAP);

    map.write(0x0F, 0x14).unwrap();
    interface.set_register_u8(0x0F, 0x04);
    map.invalidate();

    assert_eq!(map.cached(0x0F), None);
    assert_eq!(map.read(0x0F).unwrap(), 0x04);
}

#[test]
fn test_big_endian_wire_order() {
    let (mut map, interface) = create_map(RegmapConfig::new("be16", ValueWidth::Bits16));

    map.write(0x01, 0x1234).unwrap();
    assert_eq!(interface.register(0x01), vec![0x12, 0x34]);
}

#[test]
fn test_little_endian_wire_order() {
    let (mut map, interface) = create_map(SENSOR_LIKE);

    map.write(0x04, 0x4010).unwrap();
    assert_eq!(interface.register(0x04), vec![0x10, 0x40]);
}

#[test]
fn test_no_cache_reads_every_time() {
    let config = RegmapConfig::new("nocache", ValueWidth::Bits8);
    let (mut map, interface) = create_map(config);

    map.write(0x01, 0x55).unwrap();
    map.read(0x01).unwrap();
    map.read(0x01).unwrap();

    assert_eq!(interface.read_count(0x01), 2);
}

#[test]
fn test_write_raw_bypasses_map() {
    let (mut map, interface) = create_map(BYTE_MAP);

    map.write_raw(0xFF, &[0x98, 0x81, 0x03]).unwrap();
    map.write_raw(0x11, &[]).unwrap();

    assert_eq!(
        interface.writes(),
        vec![(0xFF, vec![0x98, 0x81, 0x03]), (0x11, vec![])]
    );
    assert_eq!(map.cached(0x11), None);
}
