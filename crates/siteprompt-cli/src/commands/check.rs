use clap::Args;
use serde::Serialize;
use siteprompt_core::{Clock, Config, PopupKind, SuppressionReason, SystemClock, TriggerEngine};

use super::{print_json, session, CliResult};

#[derive(Args)]
pub struct CheckArgs {
    /// Popup kind
    #[arg(long, default_value = "newsletter")]
    kind: PopupKind,
    /// Page path
    #[arg(long, default_value = "/")]
    path: String,
    /// Use throwaway storage instead of the on-disk store
    #[arg(long)]
    memory: bool,
}

#[derive(Serialize)]
struct Verdict {
    kind: PopupKind,
    path: String,
    eligible: bool,
    reason: Option<SuppressionReason>,
}

pub fn run(args: CheckArgs) -> CliResult {
    let config = Config::load()?;
    let mut ctx = session(&config, &args.path, args.memory)?;
    let engine = TriggerEngine::new(args.kind, config.popup(args.kind).clone())?;
    let verdict = engine.evaluate_eligibility(&mut ctx, SystemClock.now_ms());
    print_json(&Verdict {
        kind: args.kind,
        path: args.path,
        eligible: verdict.is_ok(),
        reason: verdict.err(),
    })
}
