// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Siren / output state

use bitflags::bitflags;

bitflags! {
    /// Wired output byte of the status frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WiredOutputs: u8 {
        /// Output 1 drives the siren
        const SIREN = 0b0000_0001;
    }
}

/// State of an on/off output such as the siren.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputState {
    On,
    #[default]
    Off,
}

impl OutputState {
    pub fn from_bool(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// "on" or "off".
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Anything but "on" is off.
    pub fn from_mode(mode: &str) -> Self {
        Self::from_bool(mode.eq_ignore_ascii_case("on"))
    }
}
