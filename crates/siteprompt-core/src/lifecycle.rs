//! Dismissal/lifecycle controller for a single popup.
//!
//! ```text
//! Hidden --show--> Visible --dismiss/auto/convert--> Hidden
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::to_datetime;
use crate::events::{DismissReason, Event};
use crate::session::{PopupKind, SessionContext};
use crate::timers::TimerQueue;
use crate::trigger::TriggerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone)]
pub struct PopupController {
    kind: PopupKind,
    storage_key: String,
    converted_key: String,
    auto_dismiss_ms: Option<u64>,
    visibility: Visibility,
    suppression_written: bool,
    timers: TimerQueue<()>,
    torn_down: bool,
}

impl PopupController {
    pub fn new(kind: PopupKind, config: &TriggerConfig) -> Self {
        Self {
            kind,
            storage_key: config.storage_key.clone(),
            converted_key: config.converted_key.clone(),
            auto_dismiss_ms: config.auto_dismiss_ms,
            visibility: Visibility::Hidden,
            suppression_written: false,
            timers: TimerQueue::new(),
            torn_down: false,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Tell the controller the trigger engine already persisted the record.
    pub fn note_suppression_written(&mut self) {
        self.suppression_written = true;
    }

    /// Hidden -> Visible. No-op if already visible or if another popup of
    /// the same kind holds the slot.
    pub fn show(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Option<Event> {
        if self.torn_down || self.is_visible() {
            return None;
        }
        if !ctx.claim_visible(self.kind) {
            debug!(kind = %self.kind, "another popup of this kind is visible");
            return None;
        }
        self.visibility = Visibility::Visible;
        if let Some(after) = self.auto_dismiss_ms {
            self.timers.schedule(now_ms.saturating_add(after), ());
        }
        Some(Event::PopupShown {
            kind: self.kind,
            at: to_datetime(now_ms),
        })
    }

    /// Visible -> Hidden. Writes the suppression record if nobody has yet.
    pub fn dismiss(
        &mut self,
        ctx: &mut SessionContext,
        reason: DismissReason,
        now_ms: u64,
    ) -> Option<Event> {
        if self.torn_down || !self.is_visible() {
            return None;
        }
        self.hide(ctx);
        if !self.suppression_written {
            self.suppression_written = ctx.durable().record_shown(&self.storage_key, now_ms);
        }
        debug!(kind = %self.kind, ?reason, "popup dismissed");
        Some(Event::PopupDismissed {
            kind: self.kind,
            reason,
            at: to_datetime(now_ms),
        })
    }

    /// Record a conversion. Permanently suppresses every popup sharing the
    /// converted flag; hides this one if it is showing.
    pub fn mark_converted(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Vec<Event> {
        if self.torn_down {
            return Vec::new();
        }
        ctx.durable().set_flag(&self.converted_key);
        let mut events = Vec::new();
        if self.is_visible() {
            self.hide(ctx);
            events.push(Event::PopupDismissed {
                kind: self.kind,
                reason: DismissReason::Converted,
                at: to_datetime(now_ms),
            });
        }
        events.push(Event::PopupConverted {
            kind: self.kind,
            at: to_datetime(now_ms),
        });
        events
    }

    /// Run the auto-dismiss timer if it is due.
    pub fn tick(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Option<Event> {
        if self.timers.pop_due(now_ms).is_none() {
            return None;
        }
        self.dismiss(ctx, DismissReason::Auto, now_ms)
    }

    /// Clear the timer and give up the visible slot. Returns timers cleared
    /// and, if the popup was showing, its dismissal.
    pub fn unmount(&mut self, ctx: &mut SessionContext, now_ms: u64) -> (usize, Option<Event>) {
        if self.torn_down {
            return (0, None);
        }
        let cleared = self.timers.len();
        let dismissed = if self.is_visible() {
            self.hide(ctx);
            Some(Event::PopupDismissed {
                kind: self.kind,
                reason: DismissReason::Unmounted,
                at: to_datetime(now_ms),
            })
        } else {
            self.timers.clear();
            None
        };
        self.torn_down = true;
        (cleared, dismissed)
    }

    fn hide(&mut self, ctx: &mut SessionContext) {
        self.visibility = Visibility::Hidden;
        self.timers.clear();
        ctx.release_visible(self.kind);
    }
}
