// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Push buttons (emergencies and status refresh)

/// Emergency reported through the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmergencyType {
    Medical,
    Fire,
    Panic,
    TimedPanic,
}

impl EmergencyType {
    /// Parse the button name. Unknown names report a timed panic.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Medico" => Self::Medical,
            "Incendio" => Self::Fire,
            "Panico" => Self::Panic,
            _ => Self::TimedPanic,
        }
    }

    /// Numeric `emergencyType` sent to the API.
    pub fn code(&self) -> u8 {
        match self {
            Self::Medical => 1,
            Self::TimedPanic => 2,
            Self::Fire => 3,
            Self::Panic => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Medical => "Medico",
            Self::Fire => "Incendio",
            Self::Panic => "Panico",
            Self::TimedPanic => "Panico demorado",
        }
    }
}

/// What pressing a button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Emergency(EmergencyType),
    /// Pull a fresh status snapshot
    Refresh,
}
