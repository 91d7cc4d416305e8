// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Panel description fetched once at connect time

use crate::constants::zone_icon;

/// Static descriptive record of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelInfo {
    pub id: String,
    pub name: String,
    pub model: String,
    pub model_name: String,
    pub version: String,
    pub version_name: String,
    pub manufacturer: String,
}

/// What the logged-in user may do on this panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    pub arm: bool,
    pub disarm: bool,
    pub bypass: bool,
    pub horn: bool,
}

/// A programmed partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionConfig {
    /// 1-based partition number
    pub number: u32,
    pub name: String,
    pub enabled: bool,
}

/// A programmed zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    /// 1-based zone number
    pub number: u32,
    pub name: String,
    pub enabled: bool,
    /// Interior zone, excluded by a "present" arm
    pub interior: bool,
    /// Icon index from the panel programming
    pub icon: Option<u32>,
}

impl ZoneConfig {
    pub fn icon_name(&self) -> Option<&'static str> {
        self.icon.and_then(zone_icon)
    }
}

/// Everything learned from the system-info call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemInfo {
    pub panel: PanelInfo,
    pub permissions: Permissions,
    pub partitions: Vec<PartitionConfig>,
    pub zones: Vec<ZoneConfig>,
}

impl SystemInfo {
    /// Bit `n - 1` set for every enabled partition `n`.
    pub fn partition_mask(&self) -> u32 {
        mask(self.partitions.iter().filter(|p| p.enabled).map(|p| p.number))
    }

    /// Bit `n - 1` set for every enabled zone `n`.
    pub fn zone_mask(&self) -> u32 {
        mask(self.zones.iter().filter(|z| z.enabled).map(|z| z.number))
    }
}

fn mask(numbers: impl Iterator<Item = u32>) -> u32 {
    numbers
        .filter(|n| (1..=32).contains(n))
        .fold(0, |m, n| m | 1 << (n - 1))
}
