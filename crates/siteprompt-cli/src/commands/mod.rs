pub mod check;
pub mod config;
pub mod notify;
pub mod related;
pub mod simulate;
pub mod suppression;

use siteprompt_core::error::Result;
use siteprompt_core::{Config, MemoryStore, SessionContext, SqliteStore};

pub type CliResult = Result<()>;

/// Open the durable store named in the config.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    Ok(SqliteStore::open(&config.storage.database_file)?)
}

/// A fresh browser session on `path`, backed by the on-disk store or, with
/// `memory`, by a throwaway one.
pub fn session(
    config: &Config,
    path: &str,
    memory: bool,
) -> Result<SessionContext> {
    if memory {
        return Ok(SessionContext::in_memory(path));
    }
    let durable = open_store(config)?;
    Ok(SessionContext::new(
        path,
        Box::new(MemoryStore::new()),
        Box::new(durable),
    ))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
