//! Social-proof toast schedule.
//!
//! After `initial_delay_ms`, and then every `interval_ms`, a fresh
//! notification is generated and shown. Each one hides itself
//! `display_ms` after it appeared, independently of the schedule. Only one
//! is ever on screen: a new notification replaces the current one.

use rand::Rng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::to_datetime;
use crate::events::{DismissReason, Event};
use crate::notification::{NotificationEvent, NotificationFeed};
use crate::session::{path_is_excluded, SessionContext};
use crate::timers::{TimerId, TimerQueue};
use crate::trigger::default_excluded_path_prefixes;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,
    #[serde(default = "default_excluded_path_prefixes")]
    pub excluded_path_prefixes: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_initial_delay_ms() -> u64 {
    8_000
}
fn default_interval_ms() -> u64 {
    25_000
}
fn default_display_ms() -> u64 {
    6_000
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: default_initial_delay_ms(),
            interval_ms: default_interval_ms(),
            display_ms: default_display_ms(),
            excluded_path_prefixes: default_excluded_path_prefixes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastTimer {
    Next,
    Hide,
}

#[derive(Debug, Clone)]
pub struct ToastController<R = Pcg64> {
    config: ToastConfig,
    feed: NotificationFeed<R>,
    current: Option<NotificationEvent>,
    /// Pending auto-hide of the current toast and its deadline.
    hide_timer: Option<(TimerId, u64)>,
    timers: TimerQueue<ToastTimer>,
    mounted: bool,
    torn_down: bool,
}

impl<R: Rng> ToastController<R> {
    pub fn new(config: ToastConfig, feed: NotificationFeed<R>) -> Self {
        Self {
            config,
            feed,
            current: None,
            hide_timer: None,
            timers: TimerQueue::new(),
            mounted: false,
            torn_down: false,
        }
    }

    pub fn current(&self) -> Option<&NotificationEvent> {
        self.current.as_ref()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Start the schedule. Returns false when the toast stays off on this page.
    pub fn mount(&mut self, ctx: &SessionContext, now_ms: u64) -> bool {
        if self.mounted || self.torn_down {
            return false;
        }
        self.mounted = true;
        if !self.config.enabled
            || !ctx.capabilities().timers
            || self.config.interval_ms == 0
            || path_is_excluded(ctx.path(), &self.config.excluded_path_prefixes)
        {
            debug!(path = ctx.path(), "social proof toast disabled for this page");
            return false;
        }
        self.timers.schedule(
            now_ms.saturating_add(self.config.initial_delay_ms),
            ToastTimer::Next,
        );
        true
    }

    /// Run due timers in deadline order. After a late tick only the most
    /// recent missed toast is shown; the cadence stays on its grid.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.torn_down {
            return events;
        }
        while let Some((deadline, id, timer)) = self.timers.pop_due(now_ms) {
            match timer {
                ToastTimer::Next => {
                    let interval = self.config.interval_ms.max(1);
                    let missed = now_ms.saturating_sub(deadline) / interval;
                    let shown_at = deadline.saturating_add(missed.saturating_mul(interval));
                    if let Some((_, hide_at)) = self.hide_timer {
                        if hide_at <= shown_at {
                            events.extend(self.hide(DismissReason::Auto, hide_at));
                        }
                    }
                    events.extend(self.hide(DismissReason::Replaced, shown_at));

                    let notification = self.feed.next_event();
                    debug!(id = notification.id, missed, "showing social proof toast");
                    self.current = Some(notification.clone());
                    let hide_at = shown_at.saturating_add(self.config.display_ms);
                    self.hide_timer = Some((self.timers.schedule(hide_at, ToastTimer::Hide), hide_at));
                    self.timers
                        .schedule(shown_at.saturating_add(interval), ToastTimer::Next);
                    events.push(Event::ToastShown {
                        notification,
                        at: to_datetime(shown_at),
                    });
                }
                ToastTimer::Hide => {
                    if self.hide_timer.map(|(timer, _)| timer) == Some(id) {
                        self.hide_timer = None;
                        events.extend(self.hide(DismissReason::Auto, deadline));
                    }
                }
            }
        }
        events
    }

    /// Close button on the toast. The schedule keeps running.
    pub fn dismiss(&mut self, now_ms: u64) -> Option<Event> {
        if self.torn_down {
            return None;
        }
        self.hide(DismissReason::User, now_ms)
    }

    /// Stop everything. Returns the number of timers cleared.
    pub fn unmount(&mut self) -> usize {
        self.torn_down = true;
        self.current = None;
        self.hide_timer = None;
        self.timers.clear()
    }

    fn hide(&mut self, reason: DismissReason, at_ms: u64) -> Option<Event> {
        let current = self.current.take()?;
        if let Some((timer, _)) = self.hide_timer.take() {
            self.timers.cancel(timer);
        }
        Some(Event::ToastHidden {
            id: current.id,
            reason,
            at: to_datetime(at_ms),
        })
    }
}
