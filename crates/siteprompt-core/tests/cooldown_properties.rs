//! Property tests for the cooldown window and the scroll threshold.

use proptest::prelude::*;
use siteprompt_core::{PopupKind, ScrollMetrics, SessionContext, TriggerConfig, TriggerEngine};

const T0: u64 = 1_700_000_000_000;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

proptest! {
    #[test]
    fn never_eligible_inside_cooldown(cooldown_days in 1u32..365, elapsed_fraction in 0.0f64..1.0) {
        let cfg = TriggerConfig { cooldown_days, ..TriggerConfig::newsletter() };
        let engine = TriggerEngine::new(PopupKind::Newsletter, cfg.clone()).unwrap();
        let mut ctx = SessionContext::in_memory("/");
        ctx.durable().record_shown(&cfg.storage_key, T0);

        let cooldown_ms = u64::from(cooldown_days) * DAY_MS;
        let elapsed = ((cooldown_ms as f64) * elapsed_fraction) as u64;
        prop_assume!(elapsed < cooldown_ms);
        prop_assert!(!engine.is_eligible(&mut ctx, T0 + elapsed));
        prop_assert!(engine.is_eligible(&mut ctx, T0 + cooldown_ms));
    }

    #[test]
    fn scroll_percent_is_monotonic_and_bounded(
        viewport in 200u32..2_000,
        extra in 0u32..20_000,
        a in 0u32..25_000,
        b in 0u32..25_000,
    ) {
        let height = f64::from(viewport + extra);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = ScrollMetrics::new(f64::from(lo), height, f64::from(viewport)).percent();
        let hi = ScrollMetrics::new(f64::from(hi), height, f64::from(viewport)).percent();
        prop_assert!(lo <= hi);
        prop_assert!((0.0..=100.0).contains(&hi));
        if extra == 0 {
            prop_assert_eq!(hi, 0.0);
        }
    }
}
