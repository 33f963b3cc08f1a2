use clap::Subcommand;
use serde::Serialize;
use siteprompt_core::clock::to_datetime;
use siteprompt_core::storage::SuppressionStore;
use siteprompt_core::{Clock, Config, PopupKind, StorageError, SystemClock};

use super::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum SuppressionAction {
    /// Show last-shown times, cooldowns and the converted flag
    Status,
    /// Forget that a popup was shown (all kinds unless --kind)
    Reset {
        #[arg(long)]
        kind: Option<PopupKind>,
    },
    /// Record a conversion, suppressing every popup that shares the flag
    Convert {
        #[arg(long, default_value = "newsletter")]
        kind: PopupKind,
    },
    /// Clear the converted flag
    Unconvert {
        #[arg(long, default_value = "newsletter")]
        kind: PopupKind,
    },
}

#[derive(Serialize)]
struct PopupStatus {
    kind: PopupKind,
    storage_key: String,
    last_shown_at: Option<chrono::DateTime<chrono::Utc>>,
    cooldown_days: u32,
    cooldown_remaining_ms: u64,
    converted: bool,
}

/// The store already logged the cause.
fn rejected(key: &str) -> StorageError {
    StorageError::WriteFailed {
        key: key.to_string(),
        message: "store rejected the write".into(),
    }
}

const KINDS: [PopupKind; 2] = [PopupKind::Newsletter, PopupKind::ExitIntent];

pub fn run(action: SuppressionAction) -> CliResult {
    let config = Config::load()?;
    let mut db = open_store(&config)?;
    let mut store = SuppressionStore::new(&mut db);
    let now = SystemClock.now_ms();

    match action {
        SuppressionAction::Status => {
            let statuses: Vec<PopupStatus> = KINDS
                .iter()
                .map(|&kind| {
                    let popup = config.popup(kind);
                    let last = store.last_shown(&popup.storage_key);
                    let remaining = last
                        .map(|r| {
                            let ends = r.last_shown_at_epoch_ms.saturating_add(popup.cooldown_ms());
                            ends.saturating_sub(now)
                        })
                        .unwrap_or(0);
                    PopupStatus {
                        kind,
                        storage_key: popup.storage_key.clone(),
                        last_shown_at: last.map(|r| to_datetime(r.last_shown_at_epoch_ms)),
                        cooldown_days: popup.cooldown_days,
                        cooldown_remaining_ms: remaining,
                        converted: store.is_flag_set(&popup.converted_key),
                    }
                })
                .collect();
            print_json(&statuses)?;
        }
        SuppressionAction::Reset { kind } => {
            let kinds: Vec<PopupKind> = kind.map(|k| vec![k]).unwrap_or_else(|| KINDS.to_vec());
            for kind in kinds {
                let key = &config.popup(kind).storage_key;
                if !store.clear(key) {
                    return Err(rejected(key).into());
                }
                println!("cleared {kind}");
            }
        }
        SuppressionAction::Convert { kind } => {
            let key = &config.popup(kind).converted_key;
            if !store.set_flag(key) {
                return Err(rejected(key).into());
            }
            println!("converted ({key})");
        }
        SuppressionAction::Unconvert { kind } => {
            let key = &config.popup(kind).converted_key;
            if !store.clear(key) {
                return Err(rejected(key).into());
            }
            println!("cleared {key}");
        }
    }
    Ok(())
}
