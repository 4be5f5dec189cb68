//! Integration tests for the JSON command protocol.

use pattern_gui_lib::command::{execute_json, execute_json_batch};
use pattern_gui_lib::harness::TestHarness;

#[test]
fn test_batch_toggle_and_tick() {
    let mut h = TestHarness::new();
    let responses = execute_json_batch(
        &mut h,
        r#"[
            {"command": "toggle"},
            {"command": "tick", "ms": 300},
            {"command": "tick", "ms": 300},
            {"command": "inspect"}
        ]"#,
    )
    .unwrap();

    assert_eq!(responses.len(), 4);
    assert!(responses.iter().all(|r| r.success));

    let halfway = responses[1].data.as_ref().unwrap()["progress"].as_f64().unwrap();
    assert!((halfway - 0.25).abs() < 1e-4);

    let inspect = responses[3].data.as_ref().unwrap();
    assert_eq!(inspect["mode"], "flat");
    assert_eq!(inspect["progress"], 0.0);
    for panel in inspect["panels"].as_array().unwrap() {
        // flat panels carry no rotation
        let rotation: Vec<f64> = panel["rotation"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_eq!(rotation, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(panel["position"][2], 0.0);
    }
}

#[test]
fn test_set_param_rebuilds_panels() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "set_param", "key": "width", "value": 20}"#).unwrap();
    assert!(resp.success);

    let inspect = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    let data = inspect.data.unwrap();
    let front = data["panels"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["key"] == "front")
        .unwrap()
        .clone();
    assert!((front["width"].as_f64().unwrap() - 2.0).abs() < 1e-5);
}

#[test]
fn test_set_param_string_value_coerced() {
    let mut h = TestHarness::new();
    execute_json(&mut h, r#"{"command": "set_param", "key": "width", "value": "12.5"}"#).unwrap();
    let geometry = h.geometry();
    assert_eq!(geometry.panel("front").unwrap().width, 12.5);
}

#[test]
fn test_set_param_non_numeric_value_zeroes_dimension() {
    let mut h = TestHarness::new();
    execute_json(&mut h, r#"{"command": "set_param", "key": "width", "value": "wide"}"#).unwrap();
    assert_eq!(h.geometry().panel("front").unwrap().width, 0.0);
    assert_eq!(h.panel_count(), 5);
}

#[test]
fn test_orbit_command() {
    let mut h = TestHarness::new();
    let yaw = h.preview.camera().yaw;
    let resp = execute_json(&mut h, r#"{"command": "orbit", "dx": 30, "dy": 0}"#).unwrap();
    assert!(resp.success);
    assert!((h.preview.camera().yaw - yaw - 30f32.to_radians()).abs() < 1e-4);
}

#[test]
fn test_export_geometry_parses_back() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "export_geometry"}"#).unwrap();
    let json = resp.data.unwrap()["geometry_json"].as_str().unwrap().to_string();
    let geometry = shared::Geometry::from_json(&json).unwrap();
    assert_eq!(geometry.assembly_key, "zipper_pouch");
    assert_eq!(geometry.panels.len(), 5);
}

#[test]
fn test_batch_invalid_json() {
    let mut h = TestHarness::new();
    assert!(execute_json_batch(&mut h, r#"{"command": "toggle"}"#).is_err());
}
