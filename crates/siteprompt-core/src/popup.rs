//! One popup on one page: a [`TriggerEngine`] whose fire shows a
//! [`PopupController`].

use crate::clock::to_datetime;
use crate::error::ValidationError;
use crate::events::{DismissReason, Event};
use crate::lifecycle::{PopupController, Visibility};
use crate::session::{PopupKind, SessionContext};
use crate::trigger::{ScrollMetrics, TriggerConfig, TriggerEngine, TriggerState};

#[derive(Debug, Clone)]
pub struct Popup {
    engine: TriggerEngine,
    controller: PopupController,
}

impl Popup {
    /// # Errors
    /// Returns an error if `config` fails validation.
    pub fn new(kind: PopupKind, config: TriggerConfig) -> Result<Self, ValidationError> {
        let controller = PopupController::new(kind, &config);
        let engine = TriggerEngine::new(kind, config)?;
        Ok(Self { engine, controller })
    }

    pub fn kind(&self) -> PopupKind {
        self.engine.kind()
    }

    pub fn engine(&self) -> &TriggerEngine {
        &self.engine
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.engine.state()
    }

    pub fn visibility(&self) -> Visibility {
        self.controller.visibility()
    }

    pub fn active_timers(&self) -> usize {
        self.engine.active_timers() + self.controller.active_timers()
    }

    pub fn active_listeners(&self) -> usize {
        self.engine.active_listeners()
    }

    pub fn is_eligible(&self, ctx: &mut SessionContext, now_ms: u64) -> bool {
        self.engine.is_eligible(ctx, now_ms)
    }

    pub fn mount(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Vec<Event> {
        self.engine.mount(ctx, now_ms)
    }

    pub fn tick(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Vec<Event> {
        let fired = self.engine.tick(ctx, now_ms);
        let mut events = self.display(ctx, fired, now_ms);
        events.extend(self.controller.tick(ctx, now_ms));
        events
    }

    pub fn on_scroll(
        &mut self,
        ctx: &mut SessionContext,
        metrics: ScrollMetrics,
        now_ms: u64,
    ) -> Vec<Event> {
        let fired = self.engine.on_scroll(ctx, metrics, now_ms);
        self.display(ctx, fired, now_ms)
    }

    pub fn on_pointer_leave(
        &mut self,
        ctx: &mut SessionContext,
        client_y: f64,
        now_ms: u64,
    ) -> Vec<Event> {
        let fired = self.engine.on_pointer_leave(ctx, client_y, now_ms);
        self.display(ctx, fired, now_ms)
    }

    pub fn on_pointer_enter(&mut self) {
        self.engine.on_pointer_enter();
    }

    /// Close button.
    pub fn dismiss(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Option<Event> {
        self.controller.dismiss(ctx, DismissReason::User, now_ms)
    }

    /// Successful subscription. Stops the trigger too, so a popup that has
    /// not shown yet never will.
    pub fn mark_converted(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Vec<Event> {
        let events = self.controller.mark_converted(ctx, now_ms);
        self.engine.suppress();
        events
    }

    /// Tear down. A showing popup is reported dismissed first.
    pub fn unmount(&mut self, ctx: &mut SessionContext, now_ms: u64) -> Vec<Event> {
        let (engine_timers, listeners) = self.engine.unmount();
        let (controller_timers, dismissed) = self.controller.unmount(ctx, now_ms);
        let mut events: Vec<Event> = dismissed.into_iter().collect();
        events.push(Event::PopupUnmounted {
            kind: self.kind(),
            cleared_timers: engine_timers + controller_timers,
            cleared_listeners: listeners,
            at: to_datetime(now_ms),
        });
        events
    }

    /// Forward engine events, showing the controller on a fire.
    fn display<I>(&mut self, ctx: &mut SessionContext, engine_events: I, now_ms: u64) -> Vec<Event>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut events = Vec::new();
        for event in engine_events {
            let is_fire = matches!(event, Event::TriggerFired { .. });
            events.push(event);
            if is_fire {
                if self.engine.record_written() {
                    self.controller.note_suppression_written();
                }
                events.extend(self.controller.show(ctx, now_ms));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    fn shown(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::PopupShown { .. }))
            .count()
    }

    #[test]
    fn fire_shows_popup() {
        let mut ctx = SessionContext::in_memory("/pricing");
        let mut popup = Popup::new(PopupKind::Newsletter, TriggerConfig::newsletter()).unwrap();
        popup.mount(&mut ctx, T0);
        let events = popup.on_scroll(&mut ctx, ScrollMetrics::new(800.0, 2000.0, 1000.0), T0 + 3_000);
        assert_eq!(events.len(), 2);
        assert_eq!(shown(&events), 1);
        assert_eq!(popup.visibility(), Visibility::Visible);
        assert!(ctx.is_visible(PopupKind::Newsletter));
    }

    #[test]
    fn unmount_reports_cleared_resources() {
        let mut ctx = SessionContext::in_memory("/");
        let mut popup = Popup::new(PopupKind::Newsletter, TriggerConfig::newsletter()).unwrap();
        popup.mount(&mut ctx, T0);
        let events = popup.unmount(&mut ctx, T0 + 1);
        assert_eq!(
            events,
            vec![Event::PopupUnmounted {
                kind: PopupKind::Newsletter,
                cleared_timers: 1,
                cleared_listeners: 1,
                at: to_datetime(T0 + 1),
            }]
        );
        assert_eq!(popup.active_timers(), 0);
        assert_eq!(popup.active_listeners(), 0);
    }

    #[test]
    fn user_dismiss_after_show() {
        let mut ctx = SessionContext::in_memory("/");
        let mut popup = Popup::new(PopupKind::Newsletter, TriggerConfig::newsletter()).unwrap();
        popup.mount(&mut ctx, T0);
        popup.tick(&mut ctx, T0 + 30_000);
        assert!(popup.dismiss(&mut ctx, T0 + 31_000).is_some());
        assert_eq!(popup.visibility(), Visibility::Hidden);
        // The engine's record stands; dismissal does not move it.
        let record = ctx.durable().last_shown("newsletter_popup_last_shown").unwrap();
        assert_eq!(record.last_shown_at_epoch_ms, T0 + 30_000);
    }

    #[test]
    fn convert_while_hidden_prevents_later_show() {
        let mut ctx = SessionContext::in_memory("/");
        let mut popup = Popup::new(PopupKind::Newsletter, TriggerConfig::newsletter()).unwrap();
        popup.mount(&mut ctx, T0);

        let events = popup.mark_converted(&mut ctx, T0 + 1_000);
        assert!(matches!(events.as_slice(), [Event::PopupConverted { .. }]));
        assert_eq!(popup.active_timers(), 0);
        assert_eq!(popup.active_listeners(), 0);

        let mut later = popup.tick(&mut ctx, T0 + 30_000);
        later.extend(popup.on_scroll(&mut ctx, ScrollMetrics::new(2000.0, 2000.0, 1000.0), T0 + 31_000));
        assert_eq!(shown(&later), 0);
        assert!(later.is_empty());
        assert_eq!(popup.visibility(), Visibility::Hidden);
    }

    #[test]
    fn unmount_while_visible_reports_dismissal() {
        let mut ctx = SessionContext::in_memory("/");
        let mut popup = Popup::new(PopupKind::Newsletter, TriggerConfig::newsletter()).unwrap();
        popup.mount(&mut ctx, T0);
        popup.tick(&mut ctx, T0 + 30_000);

        let events = popup.unmount(&mut ctx, T0 + 40_000);
        assert!(matches!(
            events.as_slice(),
            [
                Event::PopupDismissed {
                    reason: DismissReason::Unmounted,
                    ..
                },
                Event::PopupUnmounted { .. }
            ]
        ));
        assert!(!ctx.is_visible(PopupKind::Newsletter));
    }
}
