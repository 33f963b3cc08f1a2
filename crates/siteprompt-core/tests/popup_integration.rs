//! Integration tests for popup triggering, suppression and teardown.

use siteprompt_core::{
    Event, MemoryStore, Popup, PopupKind, ScrollMetrics, SessionContext, SqliteStore,
    SuppressionReason, TriggerConfig, UnavailableStore, Visibility,
};

const T0: u64 = 1_700_000_000_000;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

fn count(events: &[Event], pred: fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

fn is_shown(e: &Event) -> bool {
    matches!(e, Event::PopupShown { .. })
}

fn newsletter() -> Popup {
    Popup::new(PopupKind::Newsletter, TriggerConfig::newsletter()).unwrap()
}

#[test]
fn newsletter_shows_once_per_cooldown_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("siteprompt.db");

    // Session 1: reader scrolls past half-way.
    {
        let durable = SqliteStore::open_path(&db_path).unwrap();
        let mut ctx = SessionContext::new("/blog/gst-guide", Box::new(MemoryStore::new()), Box::new(durable));
        let mut popup = newsletter();
        popup.mount(&mut ctx, T0);
        let events = popup.on_scroll(&mut ctx, ScrollMetrics::new(1200.0, 3000.0, 900.0), T0 + 4_000);
        assert_eq!(count(&events, is_shown), 1);
        popup.dismiss(&mut ctx, T0 + 6_000);
    }

    // Session 2, three days later: still cooling down.
    {
        let durable = SqliteStore::open_path(&db_path).unwrap();
        let mut ctx = SessionContext::new("/services", Box::new(MemoryStore::new()), Box::new(durable));
        let mut popup = newsletter();
        let events = popup.mount(&mut ctx, T0 + 3 * DAY_MS);
        assert!(matches!(
            events.as_slice(),
            [Event::PopupSuppressed {
                reason: SuppressionReason::CooldownActive,
                ..
            }]
        ));
        assert_eq!(popup.active_timers(), 0);
        assert_eq!(popup.active_listeners(), 0);
    }

    // Session 3, eight days later: eligible again.
    {
        let durable = SqliteStore::open_path(&db_path).unwrap();
        let mut ctx = SessionContext::new("/services", Box::new(MemoryStore::new()), Box::new(durable));
        let mut popup = newsletter();
        let now = T0 + 8 * DAY_MS;
        popup.mount(&mut ctx, now);
        let events = popup.tick(&mut ctx, now + 30_000);
        assert_eq!(count(&events, is_shown), 1);
    }
}

#[test]
fn remount_in_same_session_stays_quiet() {
    let mut ctx = SessionContext::in_memory("/");
    let cfg = TriggerConfig {
        cooldown_days: 0,
        ..TriggerConfig::newsletter()
    };
    let mut first = Popup::new(PopupKind::Newsletter, cfg.clone()).unwrap();
    first.mount(&mut ctx, T0);
    first.tick(&mut ctx, T0 + 30_000);
    first.unmount(&mut ctx, T0 + 31_000);

    let mut second = Popup::new(PopupKind::Newsletter, cfg).unwrap();
    let events = second.mount(&mut ctx, T0 + 40_000);
    assert!(matches!(
        events.as_slice(),
        [Event::PopupSuppressed {
            reason: SuppressionReason::ShownThisSession,
            ..
        }]
    ));
}

#[test]
fn conversion_suppresses_both_popups_forever() {
    let mut ctx = SessionContext::in_memory("/");
    let mut popup = newsletter();
    popup.mount(&mut ctx, T0);
    popup.tick(&mut ctx, T0 + 30_000);
    assert_eq!(popup.visibility(), Visibility::Visible);

    let events = popup.mark_converted(&mut ctx, T0 + 35_000);
    assert!(matches!(events.last(), Some(Event::PopupConverted { .. })));
    assert_eq!(popup.visibility(), Visibility::Hidden);

    // Years later, in a fresh session sharing the same durable store.
    let far_future = T0 + 3_650 * DAY_MS;
    for kind in [PopupKind::Newsletter, PopupKind::ExitIntent] {
        let cfg = match kind {
            PopupKind::Newsletter => TriggerConfig::newsletter(),
            PopupKind::ExitIntent => TriggerConfig::exit_intent(),
        };
        let mut popup = Popup::new(kind, cfg).unwrap();
        assert!(!popup.is_eligible(&mut ctx, far_future));
        let events = popup.mount(&mut ctx, far_future);
        assert!(matches!(
            events.as_slice(),
            [Event::PopupSuppressed {
                reason: SuppressionReason::AlreadyConverted,
                ..
            }]
        ));
    }
}

#[test]
fn unmount_before_any_trigger_leaves_nothing_running() {
    let mut ctx = SessionContext::in_memory("/");
    let mut popup = newsletter();
    popup.mount(&mut ctx, T0);
    assert!(popup.active_timers() > 0);
    assert!(popup.active_listeners() > 0);

    popup.unmount(&mut ctx, T0 + 10_000);
    assert_eq!(popup.active_timers(), 0);
    assert_eq!(popup.active_listeners(), 0);

    let mut later = popup.tick(&mut ctx, T0 + 60_000);
    later.extend(popup.on_scroll(&mut ctx, ScrollMetrics::new(2000.0, 3000.0, 900.0), T0 + 60_000));
    assert!(later.is_empty());
    assert!(ctx.durable().last_shown("newsletter_popup_last_shown").is_none());
}

#[test]
fn scroll_and_timer_in_same_tick_display_once() {
    let mut ctx = SessionContext::in_memory("/");
    let mut popup = newsletter();
    popup.mount(&mut ctx, T0);

    // Timer is due and a scroll event arrives at the same instant.
    let mut events = popup.tick(&mut ctx, T0 + 30_000);
    events.extend(popup.on_scroll(&mut ctx, ScrollMetrics::new(3000.0, 3000.0, 900.0), T0 + 30_000));
    events.extend(popup.tick(&mut ctx, T0 + 30_000));
    assert_eq!(count(&events, is_shown), 1);
    assert_eq!(
        count(&events, |e| matches!(e, Event::TriggerFired { .. })),
        1
    );
}

#[test]
fn broken_storage_fails_open_without_panicking() {
    let mut ctx = SessionContext::new("/", Box::new(UnavailableStore), Box::new(UnavailableStore));
    let mut popup = newsletter();
    popup.mount(&mut ctx, T0);
    let events = popup.tick(&mut ctx, T0 + 30_000);
    assert_eq!(count(&events, is_shown), 1);
    assert!(popup.dismiss(&mut ctx, T0 + 31_000).is_some());
    assert!(popup.mark_converted(&mut ctx, T0 + 32_000).len() == 1);

    // Nothing could be remembered, so a new page view may show it again.
    let mut again = newsletter();
    let events = again.mount(&mut ctx, T0 + 40_000);
    assert!(matches!(events.as_slice(), [Event::PopupArmed { .. }]));
}

#[test]
fn admin_routes_never_arm() {
    let mut ctx = SessionContext::in_memory("/admin/crm/leads");
    let mut popup = Popup::new(PopupKind::ExitIntent, TriggerConfig::exit_intent()).unwrap();
    popup.mount(&mut ctx, T0);
    assert_eq!(popup.active_timers(), 0);
    let events = popup.on_pointer_leave(&mut ctx, 0.0, T0 + 10_000);
    assert!(events.is_empty());
}
