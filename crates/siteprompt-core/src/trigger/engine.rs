//! Trigger engine.
//!
//! Decides whether a popup may arm on this page view and, once armed, which
//! composed source gets to fire it. Like the rest of the crate it has no
//! threads: the page forwards scroll and pointer events and calls `tick()`
//! with the current time so pending timers can run.
//!
//! ## State Transitions
//!
//! ```text
//! Unmounted -> Mounted -> Armed -> Fired
//!     \           \         \
//!      `-----------`---------`--> TornDown (unmount, from any state)
//! ```
//!
//! Firing is a single claim: the first source to get there sets `fired`,
//! detaches every listener, cancels every timer and persists the
//! suppression record before the fire event is returned. Anything that
//! arrives afterwards (a second timer due in the same tick, a late scroll
//! event, a call after unmount) is a no-op.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::TriggerConfig;
use super::scroll::ScrollMetrics;
use crate::clock::to_datetime;
use crate::error::ValidationError;
use crate::events::{Event, SuppressionReason, TriggerSource};
use crate::session::{path_is_excluded, PopupKind, SessionContext};
use crate::timers::{TimerId, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineTimer {
    Arm,
    Time,
    PointerConfirm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    pub mounted: bool,
    pub armed: bool,
    pub fired: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Listeners {
    scroll: bool,
    pointer: bool,
}

impl Listeners {
    fn count(&self) -> usize {
        usize::from(self.scroll) + usize::from(self.pointer)
    }
}

#[derive(Debug, Clone)]
pub struct TriggerEngine {
    kind: PopupKind,
    config: TriggerConfig,
    state: TriggerState,
    timers: TimerQueue<EngineTimer>,
    listeners: Listeners,
    pending_confirm: Option<TimerId>,
    record_written: bool,
    mounted_at: u64,
    suppressed: bool,
    torn_down: bool,
}

impl TriggerEngine {
    /// # Errors
    /// Returns an error if `config` fails validation.
    pub fn new(kind: PopupKind, config: TriggerConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            kind,
            config,
            state: TriggerState::default(),
            timers: TimerQueue::new(),
            listeners: Listeners::default(),
            pending_confirm: None,
            record_written: false,
            mounted_at: 0,
            suppressed: false,
            torn_down: false,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> PopupKind {
        self.kind
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.count()
    }

    /// Whether the fire managed to persist its suppression record.
    pub fn record_written(&self) -> bool {
        self.record_written
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    fn is_live(&self) -> bool {
        self.state.mounted && !self.torn_down && !self.suppressed && !self.state.fired
    }

    /// Checks, in order: excluded path, converted flag, session flag, cooldown.
    pub fn evaluate_eligibility(
        &self,
        ctx: &mut SessionContext,
        now_ms: u64,
    ) -> Result<(), SuppressionReason> {
        if path_is_excluded(ctx.path(), &self.config.excluded_path_prefixes) {
            return Err(SuppressionReason::ExcludedPath);
        }
        if ctx.durable().is_flag_set(&self.config.converted_key) {
            return Err(SuppressionReason::AlreadyConverted);
        }
        if ctx.session().is_flag_set(&self.config.session_key()) {
            return Err(SuppressionReason::ShownThisSession);
        }
        if let Some(record) = ctx.durable().last_shown(&self.config.storage_key) {
            let elapsed = now_ms.saturating_sub(record.last_shown_at_epoch_ms);
            if elapsed < self.config.cooldown_ms() {
                return Err(SuppressionReason::CooldownActive);
            }
        }
        Ok(())
    }

    pub fn is_eligible(&self, ctx: &mut SessionContext, now_ms: u64) -> bool {
        self.evaluate_eligibility(ctx, now_ms).is_ok()
    }

    fn supported_by(&self, ctx: &SessionContext) -> bool {
        let caps = ctx.capabilities();
        let needs_timers = self.config.delay_ms.is_some()
            || self.config.arm_delay_ms > 0
            || self.config.exit_intent.is_some();
        let missing_timers = needs_timers && !caps.timers;
        let missing_scroll = self.config.threshold_percent_scroll.is_some() && !caps.scroll_events;
        let missing_pointer = self.config.exit_intent.is_some() && !caps.pointer_events;
        !(missing_timers || missing_scroll || missing_pointer)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run suppression checks and, if they pass, start the sources.
    pub fn mount(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Vec<Event> {
        if self.state.mounted || self.torn_down {
            return Vec::new();
        }
        self.state.mounted = true;
        self.mounted_at = now_ms;

        let verdict = if self.supported_by(ctx) {
            self.evaluate_eligibility(ctx, now_ms)
        } else {
            Err(SuppressionReason::Unsupported)
        };
        if let Err(reason) = verdict {
            debug!(kind = %self.kind, ?reason, "popup suppressed");
            return vec![Event::PopupSuppressed {
                kind: self.kind,
                reason,
                at: to_datetime(now_ms),
            }];
        }

        if self.config.arm_delay_ms == 0 {
            return self.arm(now_ms).into_iter().collect();
        }
        self.timers.schedule(
            now_ms.saturating_add(self.config.arm_delay_ms),
            EngineTimer::Arm,
        );
        Vec::new()
    }

    /// Run every timer due at `now_ms`, in deadline order.
    pub fn tick(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while self.is_live() {
            let Some((_, _, timer)) = self.timers.pop_due(now_ms) else {
                break;
            };
            let event = match timer {
                EngineTimer::Arm => self.arm(now_ms),
                EngineTimer::Time => self.fire(ctx, TriggerSource::Time, now_ms),
                EngineTimer::PointerConfirm => {
                    self.pending_confirm = None;
                    self.fire(ctx, TriggerSource::PointerExit, now_ms)
                }
            };
            events.extend(event);
        }
        events
    }

    pub fn on_scroll(
        &mut self,
        ctx: &mut SessionContext,
        metrics: ScrollMetrics,
        now_ms: u64,
    ) -> Option<Event> {
        if !self.is_live() || !self.listeners.scroll {
            return None;
        }
        let threshold = self.config.threshold_percent_scroll?;
        if metrics.reaches(threshold) {
            return self.fire(ctx, TriggerSource::Scroll, now_ms);
        }
        None
    }

    /// Pointer left the document at `client_y`.
    ///
    /// A leave through the top band starts (or restarts) the confirmation
    /// delay; with no delay configured it fires straight away.
    pub fn on_pointer_leave(
        &mut self,
        ctx: &mut SessionContext,
        client_y: f64,
        now_ms: u64,
    ) -> Option<Event> {
        if !self.is_live() || !self.listeners.pointer {
            return None;
        }
        let exit = self.config.exit_intent?;
        if client_y > exit.threshold_px {
            return None;
        }
        if let Some(pending) = self.pending_confirm.take() {
            self.timers.cancel(pending);
        }
        if exit.confirm_delay_ms == 0 {
            return self.fire(ctx, TriggerSource::PointerExit, now_ms);
        }
        self.pending_confirm = Some(self.timers.schedule(
            now_ms.saturating_add(exit.confirm_delay_ms),
            EngineTimer::PointerConfirm,
        ));
        None
    }

    /// Pointer came back before the confirmation delay ran out.
    pub fn on_pointer_enter(&mut self) {
        if let Some(pending) = self.pending_confirm.take() {
            self.timers.cancel(pending);
        }
    }

    /// Stop every source without firing, e.g. after a conversion made
    /// elsewhere on the page. Returns whether anything was still live.
    pub fn suppress(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.disarm();
        self.suppressed = true;
        debug!(kind = %self.kind, "popup suppressed while mounted");
        true
    }

    /// Tear down regardless of state. Returns (timers, listeners) cleared.
    pub fn unmount(&mut self) -> (usize, usize) {
        let cleared = self.disarm();
        self.torn_down = true;
        self.state.mounted = false;
        cleared
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, now_ms: u64) -> Option<Event> {
        if !self.is_live() || self.state.armed {
            return None;
        }
        self.state.armed = true;
        // Measured from mount; a delay shorter than the grace period comes
        // due in the same tick, after the arm.
        if let Some(delay) = self.config.delay_ms {
            self.timers
                .schedule(self.mounted_at.saturating_add(delay), EngineTimer::Time);
        }
        self.listeners.scroll = self.config.threshold_percent_scroll.is_some();
        self.listeners.pointer = self.config.exit_intent.is_some();
        debug!(kind = %self.kind, listeners = self.listeners.count(), "popup armed");
        Some(Event::PopupArmed {
            kind: self.kind,
            at: to_datetime(now_ms),
        })
    }

    fn disarm(&mut self) -> (usize, usize) {
        let listeners = self.listeners.count();
        self.listeners = Listeners::default();
        self.pending_confirm = None;
        self.state.armed = false;
        (self.timers.clear(), listeners)
    }

    fn fire(
        &mut self,
        ctx: &mut SessionContext,
        source: TriggerSource,
        now_ms: u64,
    ) -> Option<Event> {
        if !self.is_live() {
            return None;
        }
        if ctx.durable().is_flag_set(&self.config.converted_key) {
            self.suppress();
            return Some(Event::PopupSuppressed {
                kind: self.kind,
                reason: SuppressionReason::AlreadyConverted,
                at: to_datetime(now_ms),
            });
        }
        self.state.fired = true;
        self.disarm();

        let session_key = self.config.session_key();
        ctx.session().set_flag(&session_key);
        self.record_written = ctx.durable().record_shown(&self.config.storage_key, now_ms);

        debug!(kind = %self.kind, ?source, "trigger fired");
        Some(Event::TriggerFired {
            kind: self.kind,
            source,
            at: to_datetime(now_ms),
        })
    }
}
