// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Device state store (push merge, pull overwrite, link bookkeeping)

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::constants::{COMMUNICATOR_ID, MAX_PARTITIONS, MAX_ZONES};
use crate::devices::{
    partition_id, zone_id, Device, DeviceId, DeviceKind, DeviceState, LinkState, OutputState,
    PartitionState, SystemInfo, ZoneFlags,
};
use crate::protocol::{SiaAction, SiaMessage};
use crate::status::PanelStatus;

/// Every device of one panel, keyed by device id.
#[derive(Debug, Clone, Default)]
pub struct DeviceStore {
    devices: BTreeMap<DeviceId, Device>,
}

impl DeviceStore {
    /// Build the catalogue from the system-info fetch: enabled partitions and
    /// zones, then the siren, the buttons and the communicator.
    pub fn from_system(controller: &str, info: &SystemInfo) -> Self {
        let mut devices = BTreeMap::new();
        let mut insert = |device: Device| {
            devices.insert(device.id, device);
        };

        for p in info.partitions.iter().filter(|p| p.enabled) {
            if !(1..=MAX_PARTITIONS as u32).contains(&p.number) {
                warn!("Skipping partition {} ({}): out of range", p.number, p.name);
                continue;
            }
            insert(Device::partition(controller, p.number, &p.name));
        }
        for z in info.zones.iter().filter(|z| z.enabled) {
            if !(1..=MAX_ZONES as u32).contains(&z.number) {
                warn!("Skipping zone {} ({}): out of range", z.number, z.name);
                continue;
            }
            insert(Device::zone(controller, z.number, &z.name, z.icon_name()));
        }
        insert(Device::siren(controller));
        for button in Device::buttons(controller) {
            insert(button);
        }
        insert(Device::communicator(controller));

        debug!("Device store built with {} devices", devices.len());
        Self { devices }
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Copy of every device, ordered by id.
    pub fn snapshot(&self) -> Vec<Device> {
        self.devices.values().cloned().collect()
    }

    /// Number and name of the lowest enabled partition.
    pub fn first_partition(&self) -> Option<(u32, String)> {
        self.devices
            .values()
            .find(|d| d.kind() == DeviceKind::Partition)
            .map(|d| (d.id - partition_id(0), d.name.clone()))
    }

    fn zones_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices
            .values_mut()
            .filter(|d| d.kind() == DeviceKind::Zone)
    }

    fn any_zone_bypassed(&self) -> bool {
        self.devices
            .values()
            .filter_map(Device::zone_flags)
            .any(|z| z.is_bypassed())
    }

    /// Stamp the communicator with the arrival of a push report.
    pub fn touch_link(&mut self, now: Instant) {
        if let Some(link) = self.devices.get_mut(&COMMUNICATOR_ID) {
            link.last_seen = Some(now);
        }
    }

    /// Re-evaluate the communicator link; returns the new state on a transition.
    pub fn update_link(&mut self, now: Instant, keepalive: Duration) -> Option<LinkState> {
        let link = self.devices.get_mut(&COMMUNICATOR_ID)?;
        let since = link.last_seen.map(|t| now.saturating_duration_since(t));
        let next = LinkState::evaluate(since, keepalive);
        debug!(
            "Last report {:?} ago, link was {}",
            since,
            link.native_state()
        );
        if link.link_state() == Some(next) {
            return None;
        }
        link.state = DeviceState::Link(next);
        Some(next)
    }

    /// Merge a push report. Returns true when collaborators must be notified.
    ///
    /// Every report refreshes the communicator. State-bearing actions mutate
    /// only the devices they name.
    pub fn apply_message(&mut self, msg: &SiaMessage, now: Instant) -> bool {
        self.touch_link(now);

        match msg.action {
            SiaAction::Bypass => self.update_zone(msg.zone, now, |f, _| *f |= ZoneFlags::BYPASSED),
            SiaAction::Unbypass => self.update_zone(msg.zone, now, |f, _| f.remove(ZoneFlags::BYPASSED)),
            SiaAction::GroupBypass => {
                for zone in self.zones_mut() {
                    update_flags(zone, now, |f| *f |= ZoneFlags::LOCKED);
                }
                true
            }
            SiaAction::GroupUnbypass => {
                for zone in self.zones_mut() {
                    update_flags(zone, now, |f| f.remove(ZoneFlags::LOCKED));
                }
                true
            }
            a if a.is_arm() => {
                let home = self.any_zone_bypassed();
                let state = if home {
                    PartitionState::ArmedHome
                } else {
                    PartitionState::ArmedAway
                };
                if !self.set_partition(msg.partition, state, now) {
                    return false;
                }
                for zone in self.zones_mut() {
                    update_flags(zone, now, |f| {
                        if !f.is_bypassed() {
                            *f |= ZoneFlags::LOCKED;
                        }
                    });
                }
                true
            }
            a if a.is_disarm() => {
                if !self.set_partition(msg.partition, PartitionState::Disarmed, now) {
                    return false;
                }
                for zone in self.zones_mut() {
                    update_flags(zone, now, |f| f.remove(ZoneFlags::LOCKED));
                }
                true
            }
            SiaAction::TriggerZone => self.update_zone(msg.zone, now, |_, alarmed| *alarmed = true),
            SiaAction::RestoreZone => self.update_zone(msg.zone, now, |_, alarmed| *alarmed = false),
            SiaAction::Trigger | SiaAction::Restore => {
                let alarmed = msg.action == SiaAction::Trigger;
                match self.devices.get_mut(&partition_id(msg.partition)) {
                    Some(p) if p.kind() == DeviceKind::Partition => {
                        p.update(p.state, alarmed, now);
                        true
                    }
                    _ => {
                        warn!("{} for unknown partition {}", msg.action, msg.partition);
                        false
                    }
                }
            }
            SiaAction::Keepalive | SiaAction::Ignore => false,
            other => {
                warn!("Report {} for account {} not processed", other, msg.account);
                false
            }
        }
    }

    fn set_partition(&mut self, number: u32, state: PartitionState, now: Instant) -> bool {
        match self.devices.get_mut(&partition_id(number)) {
            Some(p) if p.kind() == DeviceKind::Partition => {
                p.update(DeviceState::Partition(state), p.alarmed, now);
                true
            }
            _ => {
                warn!("Arm report for unknown partition {}", number);
                false
            }
        }
    }

    fn update_zone(
        &mut self,
        number: u32,
        now: Instant,
        f: impl FnOnce(&mut ZoneFlags, &mut bool),
    ) -> bool {
        let Some(zone) = self
            .devices
            .get_mut(&zone_id(number))
            .filter(|d| d.kind() == DeviceKind::Zone)
        else {
            warn!("Zone report for unknown zone {}", number);
            return false;
        };
        let mut flags = zone.zone_flags().unwrap_or_default();
        let mut alarmed = zone.alarmed;
        f(&mut flags, &mut alarmed);
        zone.update(DeviceState::Zone(flags), alarmed, now);
        true
    }

    /// Overwrite partitions, zones and siren from a status snapshot.
    /// Returns true when any device changed.
    pub fn apply_status(&mut self, status: &PanelStatus, now: Instant) -> bool {
        let mut changed = false;
        for device in self.devices.values_mut() {
            let (state, alarmed) = match device.kind() {
                DeviceKind::Partition => {
                    let Some(index) = device.id.checked_sub(partition_id(1)) else {
                        continue;
                    };
                    let index = index as usize;
                    (
                        DeviceState::Partition(status.partition_state(index)),
                        status.partition_alarmed(index),
                    )
                }
                DeviceKind::Zone => {
                    let Some(index) = device.id.checked_sub(zone_id(1)) else {
                        continue;
                    };
                    let index = index as usize;
                    (
                        DeviceState::Zone(status.zone_flags(index)),
                        status.zone_alarmed(index),
                    )
                }
                DeviceKind::Output => (DeviceState::Output(status.siren()), device.alarmed),
                DeviceKind::Button | DeviceKind::TextSensor => continue,
            };
            changed |= device.update(state, alarmed, now);
        }
        changed
    }

    /// Force the siren state; returns true when it changed.
    pub fn set_siren(&mut self, state: OutputState, now: Instant) -> bool {
        self.devices
            .values_mut()
            .find(|d| d.kind() == DeviceKind::Output)
            .is_some_and(|siren| siren.update(DeviceState::Output(state), siren.alarmed, now))
    }
}

fn update_flags(zone: &mut Device, now: Instant, f: impl FnOnce(&mut ZoneFlags)) {
    let mut flags = zone.zone_flags().unwrap_or_default();
    f(&mut flags);
    zone.update(DeviceState::Zone(flags), zone.alarmed, now);
}
