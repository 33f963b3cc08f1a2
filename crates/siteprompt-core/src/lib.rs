//! # SitePrompt Core Library
//!
//! Decision logic behind the engagement prompts on the firm's marketing
//! site: the newsletter popup, the exit-intent popup and the social-proof
//! toast, plus the related-posts scorer used on blog pages.
//!
//! ## Architecture
//!
//! - **Trigger Engine**: eligibility checks and composed trigger sources
//!   (time, scroll depth, pointer exit) racing for a single fire
//! - **Lifecycle Controller**: Hidden/Visible state of one popup with
//!   auto-dismiss and conversion
//! - **Toast Controller**: recurring synthetic notifications, one at a time
//! - **Storage**: fail-open key/value adapters (session, SQLite-backed durable)
//!   and TOML configuration
//!
//! Nothing here owns a thread or a real timer. The page forwards its events
//! and calls `tick(now)`; pending timers live in a [`TimerQueue`].
//!
//! ## Key Components
//!
//! - [`Popup`]: trigger engine wired to its lifecycle controller
//! - [`SessionContext`]: session-scoped state passed to every call
//! - [`ToastController`]: social-proof schedule
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod notification;
pub mod popup;
pub mod related;
pub mod session;
pub mod simulation;
pub mod storage;
pub mod timers;
pub mod toast;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{DismissReason, Event, SuppressionReason, TriggerSource};
pub use lifecycle::{PopupController, Visibility};
pub use notification::{NotificationEvent, NotificationFeed, NotificationPools};
pub use popup::Popup;
pub use related::{Post, RelevanceWeights, ScoredPost};
pub use session::{Capabilities, PopupKind, SessionContext};
pub use simulation::{run_script, SimulationAction, SimulationScript, SimulationStep};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore, SuppressionRecord, UnavailableStore};
pub use timers::{TimerId, TimerQueue};
pub use toast::{ToastConfig, ToastController};
pub use trigger::{ExitIntentConfig, ScrollMetrics, TriggerConfig, TriggerEngine, TriggerState};
