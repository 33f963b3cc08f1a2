use std::path::PathBuf;

use clap::Args;
use siteprompt_core::related::related_posts;
use siteprompt_core::{Config, Post, ValidationError};

use super::{print_json, CliResult};

#[derive(Args)]
pub struct RelatedArgs {
    /// JSON array of posts
    #[arg(long)]
    posts: PathBuf,
    /// Slug of the post being read
    #[arg(long)]
    slug: String,
    /// Maximum number of results
    #[arg(long, default_value = "3")]
    limit: usize,
}

pub fn run(args: RelatedArgs) -> CliResult {
    let config = Config::load()?;
    let raw = std::fs::read_to_string(&args.posts)?;
    let posts: Vec<Post> = serde_json::from_str(&raw)?;
    let current = posts
        .iter()
        .find(|p| p.slug == args.slug)
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "slug".into(),
            message: format!("no post with slug '{}'", args.slug),
        })?;
    let ranked = related_posts(current, &posts, &config.related, args.limit);
    print_json(&ranked)
}
