use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Pointer-exit source settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitIntentConfig {
    /// A leave event at `client_y <= threshold_px` counts as exiting upward.
    #[serde(default = "default_threshold_px")]
    pub threshold_px: f64,
    /// Leave must not be followed by re-entry for this long.
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,
}

fn default_threshold_px() -> f64 {
    50.0
}
fn default_confirm_delay_ms() -> u64 {
    100
}

impl Default for ExitIntentConfig {
    fn default() -> Self {
        Self {
            threshold_px: default_threshold_px(),
            confirm_delay_ms: default_confirm_delay_ms(),
        }
    }
}

/// Immutable per popup instance.
///
/// A source whose field is `None` is not composed into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Scroll source threshold, percent of the scrollable range.
    #[serde(default)]
    pub threshold_percent_scroll: Option<f64>,
    /// Time source delay from mount.
    #[serde(default)]
    pub delay_ms: Option<u64>,
    /// Grace period after mount before listeners attach.
    #[serde(default)]
    pub arm_delay_ms: u64,
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: u32,
    pub storage_key: String,
    /// Durable "already converted" flag; shared between popups that convert
    /// to the same thing.
    #[serde(default = "default_converted_key")]
    pub converted_key: String,
    #[serde(default = "default_excluded_path_prefixes")]
    pub excluded_path_prefixes: Vec<String>,
    #[serde(default)]
    pub auto_dismiss_ms: Option<u64>,
    /// Pointer-exit source. Stays the last field: TOML tables follow values.
    #[serde(default)]
    pub exit_intent: Option<ExitIntentConfig>,
}

fn default_cooldown_days() -> u32 {
    7
}
fn default_converted_key() -> String {
    "newsletter_subscribed".into()
}
pub(crate) fn default_excluded_path_prefixes() -> Vec<String> {
    vec!["/admin".into()]
}

impl TriggerConfig {
    /// Shows after 30 s or half-way down the page, once a week.
    pub fn newsletter() -> Self {
        Self {
            threshold_percent_scroll: Some(50.0),
            delay_ms: Some(30_000),
            arm_delay_ms: 0,
            cooldown_days: 7,
            storage_key: "newsletter_popup_last_shown".into(),
            converted_key: default_converted_key(),
            exit_intent: None,
            excluded_path_prefixes: default_excluded_path_prefixes(),
            auto_dismiss_ms: None,
        }
    }

    /// Pointer leaving through the top edge, ignoring the first 5 s of
    /// cursor jitter, once a day.
    pub fn exit_intent() -> Self {
        Self {
            threshold_percent_scroll: None,
            delay_ms: None,
            arm_delay_ms: 5_000,
            cooldown_days: 1,
            storage_key: "exit_intent_last_shown".into(),
            converted_key: default_converted_key(),
            exit_intent: Some(ExitIntentConfig::default()),
            excluded_path_prefixes: default_excluded_path_prefixes(),
            auto_dismiss_ms: None,
        }
    }

    /// Key of the per-session "already shown" flag.
    pub fn session_key(&self) -> String {
        format!("{}:session", self.storage_key)
    }

    pub fn cooldown_ms(&self) -> u64 {
        chrono::Duration::days(i64::from(self.cooldown_days))
            .num_milliseconds()
            .max(0) as u64
    }

    /// # Errors
    /// Rejects configs with no source, an out-of-range scroll threshold, an
    /// invalid pointer threshold, or an empty storage key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.threshold_percent_scroll.is_none()
            && self.delay_ms.is_none()
            && self.exit_intent.is_none()
        {
            return Err(ValidationError::InvalidValue {
                field: "trigger".into(),
                message: "at least one of scroll, delay or exit_intent must be set".into(),
            });
        }
        if let Some(pct) = self.threshold_percent_scroll {
            if !pct.is_finite() || pct <= 0.0 || pct > 100.0 {
                return Err(ValidationError::InvalidValue {
                    field: "threshold_percent_scroll".into(),
                    message: format!("{pct} is outside (0, 100]"),
                });
            }
        }
        if let Some(exit) = self.exit_intent {
            if !exit.threshold_px.is_finite() || exit.threshold_px < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "exit_intent.threshold_px".into(),
                    message: format!("{} must be a non-negative number", exit.threshold_px),
                });
            }
        }
        if self.storage_key.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "storage_key".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
