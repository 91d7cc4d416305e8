// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Garnet Control wire models
//
// The cloud mixes Spanish and English field names and is loose about
// number-vs-string encoding; these types absorb both so the rest of the
// crate only sees the typed domain records in `devices::system`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::MANUFACTURER;
use crate::devices::{PanelInfo, PartitionConfig, Permissions, SystemInfo, ZoneConfig};

// ── Requests ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of the state, arm, disarm and bell commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub seq: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    pub timeout: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRequest<'a> {
    pub partition: EmergencyPartition<'a>,
    pub emergency_type: u8,
    pub timeout: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyPartition<'a> {
    pub name: &'a str,
    pub number: u32,
    pub enabled: bool,
    pub edited_name: &'a str,
}

// ── Responses ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_data: Option<UserData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserData {
    #[serde(rename = "nombre", default)]
    pub first_name: String,
    #[serde(rename = "apellido", default)]
    pub last_name: String,
}

impl UserData {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Reply of the state and mutating commands: `{message: {status}}`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub message: StatusMessage,
}

#[derive(Debug, Deserialize)]
pub struct StatusMessage {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyResponse {
    #[serde(default)]
    pub message: Option<EmergencyMessage>,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyMessage {
    #[serde(default)]
    pub response: Value,
}

#[derive(Debug, Deserialize)]
pub struct SystemResponse {
    pub message: SystemMessage,
}

#[derive(Debug, Deserialize)]
pub struct SystemMessage {
    #[serde(rename = "sistema")]
    pub system: WireSystem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSystem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub user_permissions: WirePermissions,
    pub programation: WireProgramation,
}

#[derive(Debug, Default, Deserialize)]
pub struct WirePermissions {
    #[serde(rename = "atributos", default)]
    pub attributes: WireAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireAttributes {
    #[serde(rename = "puedeArmar", default)]
    pub can_arm: bool,
    #[serde(rename = "puedeDesarmar", default)]
    pub can_disarm: bool,
    #[serde(rename = "puedeInhibirZonas", default)]
    pub can_bypass: bool,
    #[serde(rename = "puedeInteractuarConSirena", default)]
    pub can_horn: bool,
}

#[derive(Debug, Deserialize)]
pub struct WireProgramation {
    pub data: WireProgramData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProgramData {
    #[serde(default)]
    pub alarm_panel: WireAlarmPanel,
    #[serde(default)]
    pub partitions: Vec<WirePartition>,
    #[serde(default)]
    pub zones: Vec<WireZone>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAlarmPanel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub model: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub version_name: String,
}

#[derive(Debug, Deserialize)]
pub struct WirePartition {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireZone {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_present_zone: bool,
    #[serde(default, deserialize_with = "lenient_index")]
    pub icon: Option<u32>,
}

impl From<WireSystem> for SystemInfo {
    fn from(s: WireSystem) -> Self {
        let attrs = s.user_permissions.attributes;
        let data = s.programation.data;
        SystemInfo {
            panel: PanelInfo {
                id: s.id,
                name: s.name,
                model: data.alarm_panel.model,
                model_name: data.alarm_panel.model_name,
                version: data.alarm_panel.version,
                version_name: data.alarm_panel.version_name,
                manufacturer: MANUFACTURER.to_string(),
            },
            permissions: Permissions {
                arm: attrs.can_arm,
                disarm: attrs.can_disarm,
                bypass: attrs.can_bypass,
                horn: attrs.can_horn,
            },
            partitions: data
                .partitions
                .into_iter()
                .map(|p| PartitionConfig {
                    number: p.number,
                    name: p.name,
                    enabled: p.enabled,
                })
                .collect(),
            zones: data
                .zones
                .into_iter()
                .map(|z| ZoneConfig {
                    number: z.number,
                    name: z.name,
                    enabled: z.enabled,
                    interior: z.is_present_zone,
                    icon: z.icon,
                })
                .collect(),
        }
    }
}

/// Accept `"123"`, `123` or `null` as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Accept `3`, `"3"` or anything unparsable (as `None`).
fn lenient_index<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
