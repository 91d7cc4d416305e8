// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Device model

pub mod button;
pub mod communicator;
pub mod output;
pub mod partition;
pub mod system;
pub mod zone;

use tokio::time::Instant;

use crate::constants::{
    COMMUNICATOR_ID, FIRE_BUTTON_ID, HOWLER_BASE_ID, MEDICAL_BUTTON_ID, PANIC_BUTTON_ID,
    PARTITION_BASE_ID, REFRESH_BUTTON_ID, TIMED_PANIC_BUTTON_ID, ZONE_BASE_ID,
};

pub use button::{ButtonAction, EmergencyType};
pub use communicator::LinkState;
pub use output::{OutputState, WiredOutputs};
pub use partition::PartitionState;
pub use system::{PanelInfo, PartitionConfig, Permissions, SystemInfo, ZoneConfig};
pub use zone::ZoneFlags;

/// Stable device identifier, unique across one panel.
pub type DeviceId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Partition,
    Zone,
    /// Howler/siren
    Output,
    Button,
    TextSensor,
}

/// Native state, tagged by device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Partition(PartitionState),
    Zone(ZoneFlags),
    Output(OutputState),
    Button(ButtonAction),
    Link(LinkState),
}

/// One physical or logical unit exposed to automation.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    /// Identity that survives restarts: `{controller}_{type}_{index}`
    pub unique_key: String,
    pub name: String,
    pub icon: Option<String>,
    pub state: DeviceState,
    pub alarmed: bool,
    /// Last state-affecting event
    pub last_seen: Option<Instant>,
}

impl Device {
    fn new(id: DeviceId, unique_key: String, name: &str, icon: Option<&str>, state: DeviceState) -> Self {
        Self {
            id,
            unique_key,
            name: name.to_string(),
            icon: icon.map(str::to_string),
            state,
            alarmed: false,
            last_seen: None,
        }
    }

    pub fn partition(controller: &str, number: u32, name: &str) -> Self {
        Self::new(
            partition_id(number),
            format!("{controller}_P_{number}"),
            name,
            None,
            DeviceState::Partition(PartitionState::Unknown),
        )
    }

    pub fn zone(controller: &str, number: u32, name: &str, icon: Option<&str>) -> Self {
        Self::new(
            zone_id(number),
            format!("{controller}_Z_{number}"),
            name,
            icon,
            DeviceState::Zone(ZoneFlags::empty()),
        )
    }

    pub fn siren(controller: &str) -> Self {
        Self::new(
            HOWLER_BASE_ID,
            format!("{controller}_S_1"),
            "Sirena",
            Some("mdi:alarm-bell"),
            DeviceState::Output(OutputState::Off),
        )
    }

    pub fn communicator(controller: &str) -> Self {
        Self::new(
            COMMUNICATOR_ID,
            format!("{controller}_X_1"),
            "Comunicador",
            Some("mdi:wifi"),
            DeviceState::Link(LinkState::Unknown),
        )
    }

    /// The fixed push buttons: four emergencies and the status refresh.
    pub fn buttons(controller: &str) -> Vec<Self> {
        let button = |id, index, emergency: Option<EmergencyType>, icon| {
            let (name, action) = match emergency {
                Some(e) => (e.name(), ButtonAction::Emergency(e)),
                None => ("Refrescar estado", ButtonAction::Refresh),
            };
            Self::new(
                id,
                format!("{controller}_B_{index}"),
                name,
                Some(icon),
                DeviceState::Button(action),
            )
        };
        vec![
            button(PANIC_BUTTON_ID, 1, Some(EmergencyType::Panic), "mdi:police-badge-outline"),
            button(FIRE_BUTTON_ID, 2, Some(EmergencyType::Fire), "mdi:fire-alert"),
            button(MEDICAL_BUTTON_ID, 3, Some(EmergencyType::Medical), "mdi:doctor"),
            button(TIMED_PANIC_BUTTON_ID, 4, Some(EmergencyType::TimedPanic), "mdi:alarm"),
            button(REFRESH_BUTTON_ID, 8, None, "mdi:refresh"),
        ]
    }

    pub fn kind(&self) -> DeviceKind {
        match self.state {
            DeviceState::Partition(_) => DeviceKind::Partition,
            DeviceState::Zone(_) => DeviceKind::Zone,
            DeviceState::Output(_) => DeviceKind::Output,
            DeviceState::Button(_) => DeviceKind::Button,
            DeviceState::Link(_) => DeviceKind::TextSensor,
        }
    }

    /// Native state in its collaborator-facing form: a partition or output
    /// name, the packed zone integer, or the link state.
    pub fn native_state(&self) -> String {
        match self.state {
            DeviceState::Partition(p) => p.as_str().to_string(),
            DeviceState::Zone(z) => z.native().to_string(),
            DeviceState::Output(o) => o.as_str().to_string(),
            DeviceState::Button(_) => "Unknown".to_string(),
            DeviceState::Link(l) => l.as_str().to_string(),
        }
    }

    pub fn partition_state(&self) -> Option<PartitionState> {
        match self.state {
            DeviceState::Partition(p) => Some(p),
            _ => None,
        }
    }

    pub fn zone_flags(&self) -> Option<ZoneFlags> {
        match self.state {
            DeviceState::Zone(z) => Some(z),
            _ => None,
        }
    }

    pub fn output_state(&self) -> Option<OutputState> {
        match self.state {
            DeviceState::Output(o) => Some(o),
            _ => None,
        }
    }

    pub fn link_state(&self) -> Option<LinkState> {
        match self.state {
            DeviceState::Link(l) => Some(l),
            _ => None,
        }
    }

    pub fn button_action(&self) -> Option<ButtonAction> {
        match self.state {
            DeviceState::Button(b) => Some(b),
            _ => None,
        }
    }

    /// Replace state and alarm flag, stamping `last_seen` when either changed.
    pub fn update(&mut self, state: DeviceState, alarmed: bool, now: Instant) -> bool {
        let changed = self.state != state || self.alarmed != alarmed;
        if changed {
            self.state = state;
            self.alarmed = alarmed;
            self.last_seen = Some(now);
        }
        changed
    }
}

/// Device id of partition `number` (1-based).
pub fn partition_id(number: u32) -> DeviceId {
    PARTITION_BASE_ID + number
}

/// Device id of zone `number` (1-based).
pub fn zone_id(number: u32) -> DeviceId {
    ZONE_BASE_ID + number
}
