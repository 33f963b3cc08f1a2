use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notification::NotificationEvent;
use crate::session::PopupKind;

/// Which composed source claimed the fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Time,
    Scroll,
    PointerExit,
}

/// Why a popup did not arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    ExcludedPath,
    AlreadyConverted,
    ShownThisSession,
    CooldownActive,
    /// The environment lacks an API one of the configured sources needs.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    User,
    Auto,
    Converted,
    /// A newer toast took the slot.
    Replaced,
    Unmounted,
}

/// Every state change in the system produces an Event.
/// The page reacts to them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PopupSuppressed {
        kind: PopupKind,
        reason: SuppressionReason,
        at: DateTime<Utc>,
    },
    /// Listeners attached after the grace delay.
    PopupArmed {
        kind: PopupKind,
        at: DateTime<Utc>,
    },
    TriggerFired {
        kind: PopupKind,
        source: TriggerSource,
        at: DateTime<Utc>,
    },
    PopupShown {
        kind: PopupKind,
        at: DateTime<Utc>,
    },
    PopupDismissed {
        kind: PopupKind,
        reason: DismissReason,
        at: DateTime<Utc>,
    },
    PopupConverted {
        kind: PopupKind,
        at: DateTime<Utc>,
    },
    /// Teardown, with how many timers and listeners were still live.
    PopupUnmounted {
        kind: PopupKind,
        cleared_timers: usize,
        cleared_listeners: usize,
        at: DateTime<Utc>,
    },
    ToastShown {
        notification: NotificationEvent,
        at: DateTime<Utc>,
    },
    ToastHidden {
        id: u64,
        reason: DismissReason,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::PopupSuppressed { at, .. }
            | Event::PopupArmed { at, .. }
            | Event::TriggerFired { at, .. }
            | Event::PopupShown { at, .. }
            | Event::PopupDismissed { at, .. }
            | Event::PopupConverted { at, .. }
            | Event::PopupUnmounted { at, .. }
            | Event::ToastShown { at, .. }
            | Event::ToastHidden { at, .. } => *at,
        }
    }
}
