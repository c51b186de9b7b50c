//! Configuration Unit Tests.
//!
//! Verifies JSON deserialization with partial overrides and the validation
//! gate for unusable geometries.

use dram_core::common::ConfigError;
use dram_core::config::Config;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn empty_json_yields_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.geometry.channels, 1);
    assert_eq!(config.geometry.banks, 8);
    assert_eq!(config.queues.rq_size, 64);
    assert_eq!(config.timing.t_cas, 12);
    config.validate().unwrap();
}

#[test]
fn partial_section_keeps_sibling_defaults() {
    let json = r#"{ "timing": { "t_cas": 17 } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.timing.t_cas, 17);
    assert_eq!(config.timing.t_rp, 12);
    assert_eq!(config.geometry.rows, 65_536);
}

#[test]
fn full_override_roundtrip() {
    let json = r#"{
        "general": { "clock_scale": 2.0, "idle_memory": true },
        "geometry": { "channels": 4, "ranks": 2, "banks": 16,
                      "rows": 16384, "columns": 256, "block_bytes": 64 },
        "timing": { "t_rp": 14, "t_rcd": 15, "t_cas": 16,
                    "dbus_turnaround": 6, "dbus_return": 2 },
        "queues": { "rq_size": 32, "wq_size": 16 }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.geometry.channels, 4);
    assert_eq!(config.timing.dbus_return, 2);
    assert_eq!(config.queues.wq_size, 16);
    assert!(config.general.idle_memory);
    config.validate().unwrap();
}

#[rstest]
#[case::channels("channels", 3)]
#[case::ranks("ranks", 0)]
#[case::banks("banks", 12)]
#[case::rows("rows", 1000)]
#[case::columns("columns", 96)]
#[case::block("block_bytes", 48)]
fn non_power_of_two_geometry_is_fatal(#[case] field: &'static str, #[case] value: u64) {
    let json = format!(r#"{{ "geometry": {{ "{field}": {value} }} }}"#);
    let config: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::NotPowerOfTwo { field, value })
    );
}

#[test]
fn negative_clock_scale_is_fatal() {
    let json = r#"{ "general": { "clock_scale": -1.0 } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NonPositiveClockScale(_))
    ));
}
