// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Partition state

use std::fmt;

/// Arm state of a partition as exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PartitionState {
    Disarmed,
    /// Armed with the delayed ("home") command
    ArmedHome,
    /// Armed with the instant ("away") command
    ArmedAway,
    #[default]
    Unknown,
}

impl PartitionState {
    /// Domain string: "disarmed", "home", "away" or "unknown".
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disarmed => "disarmed",
            Self::ArmedHome => "home",
            Self::ArmedAway => "away",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "disarmed" => Self::Disarmed,
            "home" => Self::ArmedHome,
            "away" => Self::ArmedAway,
            _ => Self::Unknown,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, Self::ArmedHome | Self::ArmedAway)
    }
}

impl fmt::Display for PartitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_state_names() {
        for s in [
            PartitionState::Disarmed,
            PartitionState::ArmedHome,
            PartitionState::ArmedAway,
            PartitionState::Unknown,
        ] {
            assert_eq!(PartitionState::from_name(s.as_str()), s);
        }
        assert_eq!(PartitionState::from_name("Unknown"), PartitionState::Unknown);
        assert!(PartitionState::ArmedHome.is_armed());
        assert!(!PartitionState::Disarmed.is_armed());
    }
}
