//! Synthetic social-proof notifications.
//!
//! "Sarah M. from Toronto booked a free consultation, 4 minutes ago."
//! Each field is drawn uniformly from its own pool. The random source is a
//! parameter, so a seeded generator replays the same sequence.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One generated notification. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: u64,
    pub actor_name: String,
    pub actor_region: String,
    pub action_description: String,
    pub relative_time_label: String,
}

impl NotificationEvent {
    pub fn headline(&self) -> String {
        format!(
            "{} from {} {}",
            self.actor_name, self.actor_region, self.action_description
        )
    }
}

/// The four pools a notification is assembled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPools {
    #[serde(default = "default_names")]
    pub names: Vec<String>,
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,
    #[serde(default = "default_time_labels")]
    pub time_labels: Vec<String>,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_names() -> Vec<String> {
    to_strings(&[
        "Sarah M.", "James K.", "Priya S.", "Michael T.", "Emily R.", "David L.", "Aisha N.",
        "Robert C.", "Olivia W.", "Daniel P.",
    ])
}

fn default_regions() -> Vec<String> {
    to_strings(&[
        "Toronto", "Vancouver", "Calgary", "Montreal", "London", "Manchester", "Dubai",
        "Sydney",
    ])
}

fn default_actions() -> Vec<String> {
    to_strings(&[
        "booked a free consultation",
        "downloaded the tax planning guide",
        "requested a bookkeeping quote",
        "subscribed to the newsletter",
        "scheduled a payroll review",
        "started a business registration",
    ])
}

fn default_time_labels() -> Vec<String> {
    to_strings(&[
        "just now",
        "2 minutes ago",
        "5 minutes ago",
        "12 minutes ago",
        "27 minutes ago",
        "1 hour ago",
    ])
}

impl Default for NotificationPools {
    fn default() -> Self {
        Self {
            names: default_names(),
            regions: default_regions(),
            actions: default_actions(),
            time_labels: default_time_labels(),
        }
    }
}

impl NotificationPools {
    /// # Errors
    /// Returns an error naming the first empty pool.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, pool) in [
            ("names", &self.names),
            ("regions", &self.regions),
            ("actions", &self.actions),
            ("time_labels", &self.time_labels),
        ] {
            if pool.is_empty() {
                return Err(ValidationError::EmptyCollection(format!(
                    "notification pool '{name}'"
                )));
            }
        }
        Ok(())
    }
}

fn pick<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> String {
    pool.choose(rng).cloned().unwrap_or_default()
}

/// Compose one notification. Pure given `rng`.
pub fn generate<R: Rng + ?Sized>(
    id: u64,
    pools: &NotificationPools,
    rng: &mut R,
) -> NotificationEvent {
    NotificationEvent {
        id,
        actor_name: pick(&pools.names, rng),
        actor_region: pick(&pools.regions, rng),
        action_description: pick(&pools.actions, rng),
        relative_time_label: pick(&pools.time_labels, rng),
    }
}

/// Owns the random source and the monotonic id counter.
#[derive(Debug, Clone)]
pub struct NotificationFeed<R = Pcg64> {
    pools: NotificationPools,
    rng: R,
    next_id: u64,
}

impl NotificationFeed<Pcg64> {
    /// Reproducible feed.
    pub fn seeded(pools: NotificationPools, seed: u64) -> Result<Self, ValidationError> {
        Self::with_rng(pools, Pcg64::seed_from_u64(seed))
    }

    /// Feed seeded from OS entropy.
    pub fn from_entropy(pools: NotificationPools) -> Result<Self, ValidationError> {
        Self::with_rng(pools, Pcg64::from_entropy())
    }
}

impl<R: Rng> NotificationFeed<R> {
    pub fn with_rng(pools: NotificationPools, rng: R) -> Result<Self, ValidationError> {
        pools.validate()?;
        Ok(Self {
            pools,
            rng,
            next_id: 1,
        })
    }

    pub fn next_event(&mut self) -> NotificationEvent {
        let id = self.next_id;
        self.next_id += 1;
        generate(id, &self.pools, &mut self.rng)
    }
}
