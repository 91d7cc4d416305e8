// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Schema validation tests for MQTT wire format
//
// These tests construct JSON values directly (independent of Rust structs)
// and validate them against the JSON Schema files in schemas/mqtt/.

use serde_json::json;

fn load_schema(name: &str) -> serde_json::Value {
    let path = format!("{}/schemas/mqtt/{name}", env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read schema {path}: {e}"));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Failed to parse schema {path}: {e}"))
}

fn build_validator(schema_name: &str) -> jsonschema::Validator {
    let schema = load_schema(schema_name);
    jsonschema::options()
        .with_retriever(LocalRetriever)
        .build(&schema)
        .unwrap_or_else(|e| panic!("Failed to compile schema {schema_name}: {e}"))
}

fn validate(schema_name: &str, instance: &serde_json::Value) {
    let validator = build_validator(schema_name);
    let errors: Vec<_> = validator.iter_errors(instance).collect();
    if !errors.is_empty() {
        let msgs: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
        panic!(
            "Schema validation failed for {schema_name}:\n{}\nInstance: {}",
            msgs.join("\n"),
            serde_json::to_string_pretty(instance).unwrap()
        );
    }
}

fn validate_fails(schema_name: &str, instance: &serde_json::Value) {
    let validator = build_validator(schema_name);
    assert!(
        !validator.is_valid(instance),
        "Expected schema validation to fail for {schema_name}, but it passed.\nInstance: {}",
        serde_json::to_string_pretty(instance).unwrap()
    );
}

// Resolves relative $ref schemas from schemas/mqtt/
struct LocalRetriever;

impl jsonschema::Retrieve for LocalRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let filename = uri_str
            .strip_prefix("json-schema:///")
            .or_else(|| uri_str.rsplit_once('/').map(|(_, name)| name))
            .unwrap_or(uri_str);

        let path = format!("{}/schemas/mqtt/{filename}", env!("CARGO_MANIFEST_DIR"));
        if std::path::Path::new(&path).exists() {
            let text = std::fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&text)?);
        }
        Err(format!("Cannot retrieve schema: {uri_str}").into())
    }
}

fn partition(id: u32, state: &str) -> serde_json::Value {
    json!({ "id": id, "key": format!("1234_P_{id}"), "name": "Casa", "state": state, "alarm": false })
}

fn zone(number: u32) -> serde_json::Value {
    json!({
        "id": 10 + number,
        "key": format!("1234_Z_{number}"),
        "name": "Puerta",
        "icon": "mdi:door",
        "open": false,
        "bypass": false,
        "locked": true,
        "alarm": false
    })
}

fn snapshot() -> serde_json::Value {
    json!({
        "now": 1760500000000_u64,
        "op": "SNAPSHOT",
        "state": {
            "parts": [partition(1, "away")],
            "zones": [zone(1), zone(2)],
            "siren": "off",
            "link": "Connected",
            "buttons": [{ "id": 56, "key": "1234_B_8", "name": "Refrescar estado" }]
        }
    })
}

// =========================================================================
// Snapshot
// =========================================================================

#[test]
fn snapshot_valid() {
    validate("snapshot.schema.json", &snapshot());
}

#[test]
fn snapshot_before_first_report() {
    validate(
        "snapshot.schema.json",
        &json!({
            "now": 0,
            "op": "SNAPSHOT",
            "state": { "parts": [], "zones": [], "siren": null, "link": null, "buttons": [] }
        }),
    );
}

#[test]
fn snapshot_wrong_op() {
    let mut value = snapshot();
    value["op"] = json!("WRONG");
    validate_fails("snapshot.schema.json", &value);
}

#[test]
fn snapshot_missing_state() {
    validate_fails(
        "snapshot.schema.json",
        &json!({ "now": 1760500000000_u64, "op": "SNAPSHOT" }),
    );
}

#[test]
fn snapshot_timestamp_string_rejected() {
    let mut value = snapshot();
    value["now"] = json!("2026-10-15T00:00:00Z");
    validate_fails("snapshot.schema.json", &value);
}

#[test]
fn snapshot_lowercase_link_rejected() {
    let mut value = snapshot();
    value["state"]["link"] = json!("connected");
    validate_fails("snapshot.schema.json", &value);
}

// =========================================================================
// Partition and zone state
// =========================================================================

#[test]
fn partition_state_all_arm_states() {
    for state in ["disarmed", "home", "away", "unknown"] {
        validate("partition_state.schema.json", &partition(1, state));
    }
}

#[test]
fn partition_state_wire_arm_names_rejected() {
    // Cloud command names are not arm states
    validate_fails("partition_state.schema.json", &partition(1, "delayed"));
}

#[test]
fn zone_state_without_icon() {
    let mut value = zone(3);
    value.as_object_mut().unwrap().remove("icon");
    validate("zone_state.schema.json", &value);
}

#[test]
fn zone_state_missing_locked() {
    let mut value = zone(3);
    value.as_object_mut().unwrap().remove("locked");
    validate_fails("zone_state.schema.json", &value);
}

#[test]
fn zone_state_extra_field_rejected() {
    let mut value = zone(3);
    value["tamper"] = json!(false);
    validate_fails("zone_state.schema.json", &value);
}

// =========================================================================
// Device events
// =========================================================================

#[test]
fn device_event_zone_change() {
    validate(
        "device_event.schema.json",
        &json!({
            "now": 1760500000000_u64,
            "op": "ZONE_STATUS_CHANGE",
            "device": 13,
            "eventStr": "set=[Open] unset=[]"
        }),
    );
}

#[test]
fn device_event_partition_alarm() {
    validate(
        "device_event.schema.json",
        &json!({ "now": 1760500000000_u64, "op": "PART_ALARM", "device": 1 }),
    );
}

#[test]
fn device_event_siren() {
    for op in ["SIREN_ON", "SIREN_OFF"] {
        validate(
            "device_event.schema.json",
            &json!({ "now": 1760500000000_u64, "op": op, "device": 50 }),
        );
    }
}

#[test]
fn device_event_unknown_op_rejected() {
    validate_fails(
        "device_event.schema.json",
        &json!({ "now": 1760500000000_u64, "op": "ZONE_TAMPER", "device": 13 }),
    );
}

#[test]
fn device_event_snake_case_event_str_rejected() {
    validate_fails(
        "device_event.schema.json",
        &json!({
            "now": 1760500000000_u64,
            "op": "ZONE_STATUS_CHANGE",
            "device": 13,
            "event_str": "set=[Open] unset=[]"
        }),
    );
}

// =========================================================================
// Connectivity
// =========================================================================

#[test]
fn connectivity_valid() {
    validate(
        "connectivity.schema.json",
        &json!({ "now": 1760500000000_u64, "op": "CONNECTIVITY", "state": "Disconnected" }),
    );
}

#[test]
fn connectivity_missing_state() {
    validate_fails(
        "connectivity.schema.json",
        &json!({ "now": 1760500000000_u64, "op": "CONNECTIVITY" }),
    );
}

// =========================================================================
// Commands
// =========================================================================

#[test]
fn command_arm_with_partition() {
    validate(
        "command.schema.json",
        &json!({ "op": "ARM_HOME", "op_id": "abc", "partition": 2 }),
    );
}

#[test]
fn command_partition_out_of_range() {
    validate_fails("command.schema.json", &json!({ "op": "DISARM", "partition": 5 }));
}

#[test]
fn command_press_button_requires_device() {
    validate("command.schema.json", &json!({ "op": "PRESS_BUTTON", "device": 56 }));
    validate_fails("command.schema.json", &json!({ "op": "PRESS_BUTTON" }));
}

#[test]
fn command_unknown_op_rejected() {
    validate_fails("command.schema.json", &json!({ "op": "REBOOT" }));
}

// =========================================================================
// CMD_ACK
// =========================================================================

#[test]
fn cmd_ack_success() {
    validate(
        "cmd_ack.schema.json",
        &json!({
            "now": 1760500000000_u64,
            "op": "CMD_ACK",
            "success": true,
            "src": { "op": "PING" }
        }),
    );
}

#[test]
fn cmd_ack_with_snapshot_data() {
    validate(
        "cmd_ack.schema.json",
        &json!({
            "now": 1760500000000_u64,
            "op": "CMD_ACK",
            "success": true,
            "src": { "op": "SNAPSHOT" },
            "data": snapshot()
        }),
    );
}

#[test]
fn cmd_ack_failure_with_error() {
    validate(
        "cmd_ack.schema.json",
        &json!({
            "now": 1760500000000_u64,
            "op": "CMD_ACK",
            "success": false,
            "src": { "op": "ARM_AWAY", "partition": 1 },
            "error": "zones open: 0x00000004"
        }),
    );
}

#[test]
fn cmd_ack_missing_success() {
    validate_fails(
        "cmd_ack.schema.json",
        &json!({ "now": 1760500000000_u64, "op": "CMD_ACK" }),
    );
}
