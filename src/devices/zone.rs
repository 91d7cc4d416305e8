// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Zone state

use bitflags::bitflags;

bitflags! {
    /// Zone state packed the way collaborators see it:
    /// bit0 = open, bit1 = bypassed, bit2 = armed-lock.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ZoneFlags: u8 {
        /// Sensor input is open
        const OPEN     = 0b001;
        /// Excluded from the armed set
        const BYPASSED = 0b010;
        /// Locked by an armed partition
        const LOCKED   = 0b100;
    }
}

impl ZoneFlags {
    /// Build from the packed native value; unknown bits are dropped.
    pub fn from_native(value: u8) -> Self {
        Self::from_bits_truncate(value)
    }

    /// Packed native value (`open*1 + bypassed*2 + locked*4`).
    pub fn native(&self) -> u8 {
        self.bits()
    }

    pub fn is_open(&self) -> bool {
        self.contains(Self::OPEN)
    }

    pub fn is_bypassed(&self) -> bool {
        self.contains(Self::BYPASSED)
    }

    pub fn is_locked(&self) -> bool {
        self.contains(Self::LOCKED)
    }

    /// Get the flags that changed between old and new state.
    pub fn changed(old: Self, new: Self) -> Self {
        old ^ new
    }

    /// Event names for flags that became set.
    pub fn set_event_names(changed: Self, new: Self) -> Vec<&'static str> {
        let became_set = changed & new;
        let mut events = Vec::new();
        if became_set.contains(Self::OPEN) { events.push("Open"); }
        if became_set.contains(Self::BYPASSED) { events.push("Bypassed"); }
        if became_set.contains(Self::LOCKED) { events.push("Armed"); }
        events
    }

    /// Event names for flags that became unset.
    pub fn unset_event_names(changed: Self, new: Self) -> Vec<&'static str> {
        let became_unset = changed & !new;
        let mut events = Vec::new();
        if became_unset.contains(Self::OPEN) { events.push("Closed"); }
        if became_unset.contains(Self::BYPASSED) { events.push("UnBypassed"); }
        if became_unset.contains(Self::LOCKED) { events.push("Disarmed"); }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_packing() {
        let z = ZoneFlags::OPEN | ZoneFlags::LOCKED;
        assert_eq!(z.native(), 5);
        assert_eq!(ZoneFlags::from_native(3), ZoneFlags::OPEN | ZoneFlags::BYPASSED);
        assert_eq!(ZoneFlags::from_native(0xFF).native(), 7);
    }

    #[test]
    fn test_zone_event_names() {
        let old = ZoneFlags::OPEN;
        let new = ZoneFlags::BYPASSED | ZoneFlags::LOCKED;
        let changed = ZoneFlags::changed(old, new);
        assert_eq!(ZoneFlags::set_event_names(changed, new), vec!["Bypassed", "Armed"]);
        assert_eq!(ZoneFlags::unset_event_names(changed, new), vec!["Closed"]);
    }
}
