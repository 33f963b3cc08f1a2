//! Scripted session replay.
//!
//! A script is a list of timed page events (scroll, pointer, clicks). The
//! runner mounts a popup, walks a [`ManualClock`] to each step, runs due
//! timers, applies the step and collects every event. The same script
//! always produces the same log, which makes it useful for regression
//! tests and for checking a config change from the CLI.

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, ManualClock};
use crate::error::ValidationError;
use crate::events::Event;
use crate::popup::Popup;
use crate::session::SessionContext;
use crate::trigger::ScrollMetrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationAction {
    Scroll {
        scroll_top: f64,
        scroll_height: f64,
        viewport_height: f64,
    },
    PointerLeave {
        client_y: f64,
    },
    PointerEnter,
    Dismiss,
    Convert,
    /// Only let time pass.
    Advance,
    Unmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStep {
    /// Offset from mount.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: SimulationAction,
}

/// Simulation scenario definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationScript {
    #[serde(default)]
    pub name: String,
    /// Page path the session runs on.
    #[serde(default = "default_path")]
    pub path: String,
    pub steps: Vec<SimulationStep>,
}

fn default_path() -> String {
    "/".into()
}

impl SimulationScript {
    /// # Errors
    /// Returns an error if the steps are not in time order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut last = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at_ms < last {
                return Err(ValidationError::UnsortedSteps {
                    index,
                    at_ms: step.at_ms,
                });
            }
            last = step.at_ms;
        }
        Ok(())
    }
}

/// Mount `popup` at the clock's current time and replay `script`.
///
/// # Errors
/// Returns an error if the script is not in time order.
pub fn run_script(
    popup: &mut Popup,
    ctx: &mut SessionContext,
    clock: &ManualClock,
    script: &SimulationScript,
) -> Result<Vec<Event>, ValidationError> {
    script.validate()?;

    let start = clock.now_ms();
    let mut events = popup.mount(ctx, start);

    for step in &script.steps {
        let now = start.saturating_add(step.at_ms);
        clock.set(now);
        events.extend(popup.tick(ctx, now));

        match step.action {
            SimulationAction::Scroll {
                scroll_top,
                scroll_height,
                viewport_height,
            } => {
                let metrics = ScrollMetrics::new(scroll_top, scroll_height, viewport_height);
                events.extend(popup.on_scroll(ctx, metrics, now));
            }
            SimulationAction::PointerLeave { client_y } => {
                events.extend(popup.on_pointer_leave(ctx, client_y, now));
            }
            SimulationAction::PointerEnter => popup.on_pointer_enter(),
            SimulationAction::Dismiss => events.extend(popup.dismiss(ctx, now)),
            SimulationAction::Convert => events.extend(popup.mark_converted(ctx, now)),
            SimulationAction::Advance => {}
            SimulationAction::Unmount => events.extend(popup.unmount(ctx, now)),
        }
    }

    Ok(events)
}
