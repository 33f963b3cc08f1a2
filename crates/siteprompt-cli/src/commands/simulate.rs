use std::path::PathBuf;

use clap::Args;
use siteprompt_core::{
    run_script, Clock, Config, ManualClock, Popup, PopupKind, SimulationScript, SystemClock,
};

use super::{print_json, session, CliResult};

#[derive(Args)]
pub struct SimulateArgs {
    /// Popup kind
    #[arg(long, default_value = "newsletter")]
    kind: PopupKind,
    /// JSON script of timed steps
    #[arg(long)]
    script: PathBuf,
    /// Override the script's page path
    #[arg(long)]
    path: Option<String>,
    /// Use throwaway storage instead of the on-disk store
    #[arg(long)]
    memory: bool,
}

pub fn run(args: SimulateArgs) -> CliResult {
    let config = Config::load()?;
    let raw = std::fs::read_to_string(&args.script)?;
    let mut script: SimulationScript = serde_json::from_str(&raw)?;
    if let Some(path) = args.path {
        script.path = path;
    }

    let mut ctx = session(&config, &script.path, args.memory)?;
    let mut popup = Popup::new(args.kind, config.popup(args.kind).clone())?;
    let clock = ManualClock::new(SystemClock.now_ms());
    let events = run_script(&mut popup, &mut ctx, &clock, &script)?;
    tracing::debug!(name = %script.name, events = events.len(), "simulation finished");
    print_json(&events)
}
