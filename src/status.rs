// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Hex status frame decoder

use crate::constants::{MAX_PARTITIONS, MAX_ZONES};
use crate::devices::{OutputState, PartitionState, WiredOutputs, ZoneFlags};
use crate::error::{GarnetError, Result};

/// Bytes that must be present: problem registers through the bypass bitmap.
const REQUIRED_BYTES: usize = 16;
/// Bytes the decoder reads; trailing ones may be absent and read as 0.
const STATUS_BYTES: usize = 19;

/// Raw arm condition of one partition, before mapping to a domain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionArm {
    NotReady,
    Ready,
    /// Armed without a delay/instant qualifier
    Armed,
    /// Armed with the delayed command ("home")
    Delayed,
    /// Armed with the instant command ("away")
    Instant,
}

/// Decoded status frame.
///
/// Byte `k` of the frame is hex characters `1 + 2k .. 3 + 2k`; the leading
/// character is a frame marker and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelStatus {
    pub problems: [u8; 2],
    /// Bits 7..4 ready, bits 3..0 armed, partition 1 first
    pub partitions: u8,
    pub wired_outputs: WiredOutputs,
    pub zones_open: u32,
    pub zones_alarm: u32,
    pub zones_bypass: u32,
    pub wireless_outputs: u8,
    /// Bits 7..4 instant, bits 3..0 delayed
    pub arm_qualifiers: u8,
    /// Bits 7..4 arm-in-progress (exit delay running)
    pub delays: u8,
}

impl PanelStatus {
    /// Parse a status string returned by the cloud.
    pub fn parse(status: &str) -> Result<Self> {
        let status = status.trim();
        if !status.is_ascii() {
            return Err(GarnetError::InvalidStatus {
                details: "non-ASCII characters".to_string(),
            });
        }
        let min_len = 1 + 2 * REQUIRED_BYTES;
        if status.len() < min_len {
            return Err(GarnetError::InvalidStatus {
                details: format!("{} characters, need at least {}", status.len(), min_len),
            });
        }

        let mut bytes = [0u8; STATUS_BYTES];
        for (k, byte) in bytes.iter_mut().enumerate() {
            let Some(pair) = status.get(1 + 2 * k..3 + 2 * k) else {
                break;
            };
            *byte = u8::from_str_radix(pair, 16).map_err(|_| GarnetError::InvalidStatus {
                details: format!("byte {k} is not hex: {pair:?}"),
            })?;
        }

        let bitmap = |first: usize| {
            u32::from_le_bytes([bytes[first], bytes[first + 1], bytes[first + 2], bytes[first + 3]])
        };

        Ok(Self {
            problems: [bytes[0], bytes[1]],
            partitions: bytes[2],
            wired_outputs: WiredOutputs::from_bits_truncate(bytes[3]),
            zones_open: bitmap(4),
            zones_alarm: bitmap(8),
            zones_bypass: bitmap(12),
            wireless_outputs: bytes[16],
            arm_qualifiers: bytes[17],
            delays: bytes[18],
        })
    }

    /// Raw arm condition of partition `index` (0-based).
    pub fn partition_arm(&self, index: usize) -> PartitionArm {
        if index >= MAX_PARTITIONS {
            return PartitionArm::NotReady;
        }
        let high = 1u8 << (7 - index);
        let low = 1u8 << (3 - index);

        let armed = self.partitions & low != 0 || self.delays & high != 0;
        if armed {
            if self.arm_qualifiers & low != 0 {
                PartitionArm::Delayed
            } else if self.arm_qualifiers & high != 0 {
                PartitionArm::Instant
            } else {
                PartitionArm::Armed
            }
        } else if self.partitions & high != 0 {
            PartitionArm::Ready
        } else {
            PartitionArm::NotReady
        }
    }

    /// Domain state of partition `index` (0-based).
    pub fn partition_state(&self, index: usize) -> PartitionState {
        match self.partition_arm(index) {
            PartitionArm::Delayed => PartitionState::ArmedHome,
            PartitionArm::Instant => PartitionState::ArmedAway,
            PartitionArm::Ready => PartitionState::Disarmed,
            PartitionArm::Armed | PartitionArm::NotReady => PartitionState::Unknown,
        }
    }

    /// An armed partition is in alarm while any zone is.
    pub fn partition_alarmed(&self, index: usize) -> bool {
        self.partition_state(index).is_armed() && self.zones_alarm != 0
    }

    /// Whether any partition is armed home or away.
    pub fn any_armed(&self) -> bool {
        (0..MAX_PARTITIONS).any(|i| self.partition_state(i).is_armed())
    }

    /// Flags of zone `index` (0-based). Every zone is locked while any
    /// partition is armed.
    pub fn zone_flags(&self, index: usize) -> ZoneFlags {
        if index >= MAX_ZONES {
            return ZoneFlags::empty();
        }
        let bit = 1u32 << index;
        let mut flags = ZoneFlags::empty();
        flags.set(ZoneFlags::OPEN, self.zones_open & bit != 0);
        flags.set(ZoneFlags::BYPASSED, self.zones_bypass & bit != 0);
        flags.set(ZoneFlags::LOCKED, self.any_armed());
        flags
    }

    pub fn zone_alarmed(&self, index: usize) -> bool {
        index < MAX_ZONES && self.zones_alarm & (1u32 << index) != 0
    }

    pub fn siren(&self) -> OutputState {
        OutputState::from_bool(self.wired_outputs.contains(WiredOutputs::SIREN))
    }

    /// Open zones restricted to `mask`.
    pub fn open_zones(&self, mask: u32) -> u32 {
        self.zones_open & mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a status string from raw bytes, with the leading marker character.
    fn status_from_bytes(bytes: &[u8; STATUS_BYTES]) -> String {
        let mut s = String::from("1");
        for b in bytes {
            s.push_str(&format!("{b:02X}"));
        }
        s
    }

    #[test]
    fn test_captured_frame_disarmed_with_bypass() {
        let status = PanelStatus::parse("10000F000000000000000000020000000000000").unwrap();
        assert_eq!(status.partitions, 0xF0);
        assert_eq!(status.zones_bypass, 0x20);
        for i in 0..MAX_PARTITIONS {
            assert_eq!(status.partition_state(i), PartitionState::Disarmed);
            assert!(!status.partition_alarmed(i));
        }
        assert_eq!(status.zone_flags(5), ZoneFlags::BYPASSED);
        assert_eq!(status.zone_flags(0), ZoneFlags::empty());
        assert_eq!(status.siren(), OutputState::Off);
        assert!(!status.any_armed());
    }

    #[test]
    fn test_away_armed_partition_locks_zones() {
        let mut bytes = [0u8; STATUS_BYTES];
        bytes[2] = 0b1000_1000; // partition 1 ready and armed
        bytes[3] = 0x01; // siren
        bytes[4] = 0b0000_0100; // zone 3 open
        bytes[9] = 0b0000_0001; // zone 9 alarm
        bytes[17] = 0b1000_0000; // partition 1 instant
        let status = PanelStatus::parse(&status_from_bytes(&bytes)).unwrap();

        assert_eq!(status.partition_arm(0), PartitionArm::Instant);
        assert_eq!(status.partition_state(0), PartitionState::ArmedAway);
        assert!(status.partition_alarmed(0));
        assert_eq!(status.partition_state(1), PartitionState::Unknown);
        assert_eq!(status.zone_flags(2), ZoneFlags::OPEN | ZoneFlags::LOCKED);
        assert_eq!(status.zone_flags(0), ZoneFlags::LOCKED);
        assert!(status.zone_alarmed(8));
        assert!(!status.zone_alarmed(2));
        assert_eq!(status.siren(), OutputState::On);
    }

    #[test]
    fn test_delayed_arm_from_exit_delay() {
        let mut bytes = [0u8; STATUS_BYTES];
        bytes[17] = 0b0000_0100; // partition 2 delayed
        bytes[18] = 0b0100_0000; // partition 2 exit delay running
        let status = PanelStatus::parse(&status_from_bytes(&bytes)).unwrap();
        assert_eq!(status.partition_arm(1), PartitionArm::Delayed);
        assert_eq!(status.partition_state(1), PartitionState::ArmedHome);
        assert_eq!(status.partition_arm(0), PartitionArm::NotReady);
    }

    #[test]
    fn test_decode_is_idempotent() {
        let frame = "0F0F00F000000000000000000000000000000";
        let a = PanelStatus::parse(frame).unwrap();
        let b = PanelStatus::parse(frame).unwrap();
        assert_eq!(a, b);
        for i in 0..MAX_PARTITIONS {
            assert_eq!(a.partition_state(i), b.partition_state(i));
        }
        for i in 0..MAX_ZONES {
            assert_eq!(a.zone_flags(i), b.zone_flags(i));
        }
        assert_eq!(a.delays, 0);
    }

    #[test]
    fn test_open_zones_masked() {
        let mut bytes = [0u8; STATUS_BYTES];
        bytes[2] = 0xF0;
        bytes[7] = 0x80; // zone 32 open
        let status = PanelStatus::parse(&status_from_bytes(&bytes)).unwrap();
        assert_eq!(status.open_zones(0x8000_0000), 0x8000_0000);
        assert_eq!(status.open_zones(0x0000_00FF), 0);
        assert_eq!(status.zone_flags(31), ZoneFlags::OPEN);
    }

    #[test]
    fn test_reject_short_or_non_hex() {
        assert!(matches!(
            PanelStatus::parse("10000F00"),
            Err(GarnetError::InvalidStatus { .. })
        ));
        assert!(matches!(
            PanelStatus::parse("1ZZ00F000000000000000000020000000000000"),
            Err(GarnetError::InvalidStatus { .. })
        ));
    }
}
