//! Related-posts relevance scoring.
//!
//! A candidate earns `category_match` when it shares the current post's
//! category and `shared_tag` for every distinct tag both posts carry.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceWeights {
    #[serde(default = "default_category_match")]
    pub category_match: u32,
    #[serde(default = "default_shared_tag")]
    pub shared_tag: u32,
}

fn default_category_match() -> u32 {
    3
}
fn default_shared_tag() -> u32 {
    2
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            category_match: default_category_match(),
            shared_tag: default_shared_tag(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    pub post: Post,
    pub score: u32,
}

fn normalized_tags(post: &Post) -> HashSet<String> {
    post.tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn score(current: &Post, candidate: &Post, weights: &RelevanceWeights) -> u32 {
    let mut total = 0u32;
    if let (Some(a), Some(b)) = (&current.category, &candidate.category) {
        if !a.trim().is_empty() && a.trim().eq_ignore_ascii_case(b.trim()) {
            total = weights.category_match;
        }
    }
    let shared = normalized_tags(current)
        .intersection(&normalized_tags(candidate))
        .count();
    let shared = u32::try_from(shared).unwrap_or(u32::MAX);
    // Weights come from user config; saturate instead of overflowing.
    total.saturating_add(shared.saturating_mul(weights.shared_tag))
}

/// Best `limit` matches for `current`, highest score first, then newest,
/// then by slug. The current post and zero-score posts are left out.
pub fn related_posts(
    current: &Post,
    candidates: &[Post],
    weights: &RelevanceWeights,
    limit: usize,
) -> Vec<ScoredPost> {
    let mut scored: Vec<ScoredPost> = candidates
        .iter()
        .filter(|p| p.slug != current.slug)
        .map(|p| ScoredPost {
            score: score(current, p, weights),
            post: p.clone(),
        })
        .filter(|s| s.score > 0)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.post.published_at.cmp(&a.post.published_at))
            .then_with(|| a.post.slug.cmp(&b.post.slug))
    });
    scored.truncate(limit);
    scored
}
