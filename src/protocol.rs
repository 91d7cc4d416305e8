// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Contact-ID event translation

use std::fmt;

use crate::frame::SiaFrame;

/// Qualifier of a new event / opening.
pub const QUALIFIER_NEW: u8 = 1;
/// Qualifier of a restore / closing.
pub const QUALIFIER_RESTORE: u8 = 3;

/// Domain action carried by a push report.
///
/// # Mapping
///
/// | event | qualifier | action |
/// |---|---|---|
/// | 0 (token `NULL`) | any | `Keepalive` |
/// | 627, 628, 602 | any | `Ignore` (remote programming, periodic test) |
/// | 570 | 1 / 3 | `Bypass` / `Unbypass` |
/// | 574 | 1 / 3 | `GroupBypass` / `GroupUnbypass` |
/// | 441 | 1 / 3 | `PresentDisarm` / `PresentArm` |
/// | 407 | 1 / 3 | `Disarm` / `Arm` |
/// | 406 | 1 | `AlarmDisarm` |
/// | 401 | 1 / 3 | `KeyboardDisarm` / `KeyboardArm` |
/// | 130 | 1 / 3 | `TriggerZone` / `RestoreZone` |
/// | 459 | 1 / 3 | `Trigger` / `Restore` |
///
/// Every other pair is `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiaAction {
    /// A single zone was bypassed.
    Bypass,
    /// A single zone bypass was removed.
    Unbypass,
    GroupBypass,
    GroupUnbypass,
    /// Stay arm with interior zones excluded.
    PresentArm,
    PresentDisarm,
    /// Arm by a user code (remote or app).
    Arm,
    Disarm,
    /// Disarm after an alarm.
    AlarmDisarm,
    KeyboardArm,
    KeyboardDisarm,
    /// Burglary alarm on a zone.
    TriggerZone,
    RestoreZone,
    /// Alarm on a partition.
    Trigger,
    Restore,
    /// Valid report with no state meaning.
    Ignore,
    /// Communicator link test.
    Keepalive,
    /// A code/qualifier pair with no mapping yet.
    Unrecognized { event_code: u16, qualifier: u8 },
}

impl SiaAction {
    /// Translate an event code and qualifier.
    pub fn from_event(token: &str, event_code: u16, qualifier: u8) -> Self {
        use SiaAction::*;

        if event_code == 0 && token == crate::constants::TOKEN_NULL {
            return Keepalive;
        }
        match (event_code, qualifier) {
            (627 | 628 | 602, _) => Ignore,
            (570, QUALIFIER_NEW) => Bypass,
            (570, QUALIFIER_RESTORE) => Unbypass,
            (574, QUALIFIER_NEW) => GroupBypass,
            (574, QUALIFIER_RESTORE) => GroupUnbypass,
            (441, QUALIFIER_NEW) => PresentDisarm,
            (441, QUALIFIER_RESTORE) => PresentArm,
            (407, QUALIFIER_NEW) => Disarm,
            (407, QUALIFIER_RESTORE) => Arm,
            (406, QUALIFIER_NEW) => AlarmDisarm,
            (401, QUALIFIER_NEW) => KeyboardDisarm,
            (401, QUALIFIER_RESTORE) => KeyboardArm,
            (130, QUALIFIER_NEW) => TriggerZone,
            (130, QUALIFIER_RESTORE) => RestoreZone,
            (459, QUALIFIER_NEW) => Trigger,
            (459, QUALIFIER_RESTORE) => Restore,
            _ => Unrecognized {
                event_code,
                qualifier,
            },
        }
    }

    /// Whether the CID zone field identifies a user code rather than a zone.
    pub fn reports_user(&self) -> bool {
        matches!(
            self,
            SiaAction::PresentArm
                | SiaAction::PresentDisarm
                | SiaAction::Arm
                | SiaAction::Disarm
                | SiaAction::AlarmDisarm
                | SiaAction::KeyboardArm
                | SiaAction::KeyboardDisarm
        )
    }

    pub fn is_arm(&self) -> bool {
        matches!(
            self,
            SiaAction::PresentArm | SiaAction::Arm | SiaAction::KeyboardArm
        )
    }

    pub fn is_disarm(&self) -> bool {
        matches!(
            self,
            SiaAction::PresentDisarm
                | SiaAction::Disarm
                | SiaAction::KeyboardDisarm
                | SiaAction::AlarmDisarm
        )
    }
}

impl fmt::Display for SiaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiaAction::Unrecognized {
                event_code,
                qualifier,
            } => write!(f, "Unrecognized({qualifier}{event_code:03})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A translated push report, as delivered to an account subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiaMessage {
    pub account: String,
    pub action: SiaAction,
    pub partition: u32,
    pub zone: u32,
    pub user: u32,
}

impl SiaMessage {
    /// Translate a decoded frame. Zone-less actions report 0 for the zone;
    /// arm/disarm reports carry the user code in `user`.
    pub fn from_frame(frame: &SiaFrame) -> Self {
        let action = SiaAction::from_event(&frame.token, frame.event_code, frame.qualifier);
        let (partition, zone, user) = match action {
            SiaAction::Keepalive | SiaAction::Ignore => (0, 0, 0),
            SiaAction::GroupBypass | SiaAction::GroupUnbypass => (frame.partition, 0, 0),
            a if a.reports_user() => (frame.partition, 0, frame.zone),
            _ => (frame.partition, frame.zone, 0),
        };
        Self {
            account: frame.account.clone(),
            action,
            partition,
            zone,
            user,
        }
    }
}

/// Translate a decoded frame into the report delivered to subscribers.
pub fn translate(frame: &SiaFrame) -> SiaMessage {
    SiaMessage::from_frame(frame)
}
