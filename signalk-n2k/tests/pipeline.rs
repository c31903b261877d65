// End-to-end behaviour of the bridge: values in, wire lines out
use chrono::{Duration, TimeZone, Utc};
use signalk_n2k::{Bridge, BridgeConfig, DataValue, Position, Timestamp};

fn at(ms: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() + Duration::milliseconds(ms)
}

fn payload(line: &str) -> Vec<u8> {
    line.split(',')
        .skip(6)
        .map(|h| u8::from_str_radix(h, 16).unwrap())
        .collect()
}

#[test]
fn wind_burst_collapses_to_one_line() {
    let mut bridge = Bridge::new();
    bridge.start(&BridgeConfig::new().with_wind(true), at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    bridge.handle_value("environment.wind.angleApparent", DataValue::Number(0.1), at(100), &mut out);
    bridge.handle_value("environment.wind.speedApparent", DataValue::Number(1.0), at(102), &mut out);
    bridge.handle_value("environment.wind.angleApparent", DataValue::Number(0.5), at(104), &mut out);
    bridge.handle_value("environment.wind.speedApparent", DataValue::Number(5.14), at(106), &mut out);

    assert_eq!(bridge.next_deadline(), Some(at(116)));
    bridge.poll(at(115), &mut out);
    assert!(out.is_empty());

    bridge.poll(at(116), &mut out);
    assert_eq!(
        out,
        vec!["2024-06-01T08:00:00.116Z,2,130306,1,255,8,ff,02,02,88,13,fa,ff,ff".to_string()]
    );
}

#[test]
fn wind_waits_for_both_inputs() {
    let mut bridge = Bridge::new();
    bridge.start(&BridgeConfig::new().with_wind(true), at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    bridge.handle_value("environment.wind.speedApparent", DataValue::Number(4.0), at(0), &mut out);
    bridge.poll(at(50), &mut out);
    assert!(out.is_empty());

    bridge.handle_value("environment.wind.angleApparent", DataValue::Number(-0.2), at(60), &mut out);
    bridge.poll(at(70), &mut out);
    assert_eq!(out.len(), 1);
    // 4.0 m/s = 400 = 0x0190, -0.2 rad = -2000 = 0xf830
    assert_eq!(payload(&out[0]), vec![0xff, 0x90, 0x01, 0x30, 0xf8, 0xfa, 0xff, 0xff]);
}

#[test]
fn position_line_decodes_back() {
    let mut bridge = Bridge::new();
    bridge.start(&BridgeConfig::new().with_gps_location(true), at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    let position = Position {
        latitude: 60.1234567,
        longitude: -5.5,
    };
    bridge.handle_value("navigation.position", DataValue::Position(position), at(0), &mut out);
    bridge.poll(at(10), &mut out);

    assert_eq!(out.len(), 1);
    assert!(out[0].contains(",7,129025,1,255,8,"));
    let bytes = payload(&out[0]);
    assert_eq!(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 601234567);
    assert_eq!(i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -55000000);
}

#[test]
fn heading_goes_through_serializer() {
    let mut bridge = Bridge::new();
    bridge.start(&BridgeConfig::new().with_heading(true), at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    bridge.handle_value("navigation.headingMagnetic", DataValue::Number(90.0), at(0), &mut out);
    bridge.poll(at(10), &mut out);

    assert_eq!(
        out,
        vec!["1970-01-01T00:00:00.000,4,127250,43,255,8,57,5c,3d,ff,7f,ff,7f,fd".to_string()]
    );
}

#[test]
fn battery_reports_only_fresh_fields() {
    let config = BridgeConfig::new().add_battery("house", 1);
    let mut bridge = Bridge::new();
    bridge.start(&config, at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    bridge.handle_value("electrical.batteries.house.current", DataValue::Number(-2.0), at(0), &mut out);
    bridge.poll(at(10), &mut out);
    // -2.0 A = -20 = 0xffec
    assert_eq!(
        out,
        vec!["1970-01-01T00:00:00.000,4,127508,43,255,8,01,ff,ff,ec,ff,ff,ff,12".to_string()]
    );
    out.clear();

    bridge.handle_value("electrical.batteries.house.voltage", DataValue::Number(12.5), at(2000), &mut out);
    bridge.poll(at(2010), &mut out);

    // Current went stale 1000ms after it arrived, temperature never came
    assert_eq!(
        out,
        vec!["1970-01-01T00:00:00.000,4,127508,43,255,8,01,e2,04,ff,7f,ff,ff,12".to_string()]
    );
}

#[test]
fn batteries_are_independent() {
    let config = BridgeConfig::new().add_battery("house", 0).add_battery("starter", 1);
    let mut bridge = Bridge::new();
    bridge.start(&config, at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    bridge.handle_value("electrical.batteries.starter.voltage", DataValue::Number(12.0), at(0), &mut out);
    bridge.poll(at(10), &mut out);

    assert_eq!(out.len(), 1);
    assert_eq!(payload(&out[0])[0], 1);
}

#[test]
fn system_time_ticks_every_second() {
    let mut bridge = Bridge::new();
    bridge.start(&BridgeConfig::new().with_system_time(true), at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    for ms in (0..=3000).step_by(100) {
        bridge.poll(at(ms), &mut out);
    }

    assert_eq!(out.len(), 3);
    assert!(out[0].starts_with("2024-06-01T08:00:01.000Z,3,126992,1,255,8,ff,ff,a3,4d,"));
    assert!(out[2].starts_with("2024-06-01T08:00:03.000Z,"));
}

#[test]
fn nothing_after_stop() {
    let config = BridgeConfig::new()
        .with_wind(true)
        .with_heading(true)
        .with_system_time(true)
        .add_battery("house", 0);
    let mut bridge = Bridge::new();
    bridge.start(&config, at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    bridge.handle_value("navigation.headingMagnetic", DataValue::Number(5.0), at(1), &mut out);
    bridge.stop();

    bridge.handle_value("navigation.headingMagnetic", DataValue::Number(6.0), at(20), &mut out);
    bridge.handle_value("electrical.batteries.house.voltage", DataValue::Number(12.0), at(30), &mut out);
    bridge.poll(at(5000), &mut out);
    bridge.flush(at(5000), &mut out);
    bridge.stop();

    assert!(out.is_empty());
    assert!(!bridge.is_running());
}

#[test]
fn flush_delivers_pending_immediately() {
    let mut bridge = Bridge::new();
    bridge.start(&BridgeConfig::new().with_heading(true), at(0)).unwrap();
    let mut out: Vec<String> = Vec::new();

    bridge.handle_value("navigation.headingMagnetic", DataValue::Number(90.0), at(0), &mut out);
    assert_eq!(bridge.flush(at(1), &mut out), 1);
    assert_eq!(bridge.poll(at(100), &mut out), 0);
    assert_eq!(out.len(), 1);
}
