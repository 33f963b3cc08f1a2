use clap::Args;
use siteprompt_core::{Config, NotificationFeed};

use super::{print_json, CliResult};

#[derive(Args)]
pub struct NotifyArgs {
    /// Seed for a reproducible sequence (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// How many notifications to generate
    #[arg(long, default_value = "5")]
    count: usize,
    /// Print one headline per line instead of JSON
    #[arg(long)]
    text: bool,
}

pub fn run(args: NotifyArgs) -> CliResult {
    let config = Config::load()?;
    let pools = config.notifications.clone();
    let mut feed = match args.seed {
        Some(seed) => NotificationFeed::seeded(pools, seed)?,
        None => NotificationFeed::from_entropy(pools)?,
    };
    let events: Vec<_> = (0..args.count).map(|_| feed.next_event()).collect();

    if args.text {
        for event in &events {
            println!("{}, {}", event.headline(), event.relative_time_label);
        }
        return Ok(());
    }
    print_json(&events)
}
