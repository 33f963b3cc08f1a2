//! Session-scoped context shared by every popup on a page.
//!
//! Holds what used to be module-level mutable flags: the current path, what
//! the environment supports, both storage scopes, and which popup kinds are
//! on screen. It is passed explicitly to every engine and controller call.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, MemoryStore, SuppressionStore};

/// The popup variants the site knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupKind {
    Newsletter,
    ExitIntent,
}

impl PopupKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PopupKind::Newsletter => "newsletter",
            PopupKind::ExitIntent => "exit_intent",
        }
    }
}

impl std::fmt::Display for PopupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PopupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newsletter" => Ok(PopupKind::Newsletter),
            "exit_intent" | "exit-intent" => Ok(PopupKind::ExitIntent),
            other => Err(format!("unknown popup kind: {other}")),
        }
    }
}

/// Browser APIs the environment reported as usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub timers: bool,
    pub scroll_events: bool,
    pub pointer_events: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            timers: true,
            scroll_events: true,
            pointer_events: true,
        }
    }
}

impl Capabilities {
    /// A touch device: no pointer-leave events.
    pub fn touch() -> Self {
        Self {
            pointer_events: false,
            ..Self::default()
        }
    }
}

pub struct SessionContext {
    path: String,
    capabilities: Capabilities,
    session: Box<dyn KeyValueStore>,
    durable: Box<dyn KeyValueStore>,
    visible: HashSet<PopupKind>,
}

impl SessionContext {
    pub fn new(
        path: impl Into<String>,
        session: Box<dyn KeyValueStore>,
        durable: Box<dyn KeyValueStore>,
    ) -> Self {
        Self {
            path: path.into(),
            capabilities: Capabilities::default(),
            session,
            durable,
            visible: HashSet::new(),
        }
    }

    /// Both scopes in memory.
    pub fn in_memory(path: impl Into<String>) -> Self {
        Self::new(path, Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Client-side navigation. Popups already mounted are unaffected.
    pub fn navigate(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn session(&mut self) -> SuppressionStore<'_> {
        SuppressionStore::new(self.session.as_mut())
    }

    pub fn durable(&mut self) -> SuppressionStore<'_> {
        SuppressionStore::new(self.durable.as_mut())
    }

    pub fn is_visible(&self, kind: PopupKind) -> bool {
        self.visible.contains(&kind)
    }

    /// Claim the on-screen slot for `kind`. False if it is already taken.
    pub(crate) fn claim_visible(&mut self, kind: PopupKind) -> bool {
        self.visible.insert(kind)
    }

    pub(crate) fn release_visible(&mut self, kind: PopupKind) {
        self.visible.remove(&kind);
    }
}

/// True when `path` falls under any of `prefixes`.
pub fn path_is_excluded(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return false;
        }
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_prefix_matching() {
        let prefixes = vec!["/admin".to_string()];
        assert!(path_is_excluded("/admin", &prefixes));
        assert!(path_is_excluded("/admin/blog", &prefixes));
        assert!(path_is_excluded("/admin?tab=crm", &prefixes));
        assert!(!path_is_excluded("/administration-services", &prefixes));
        assert!(!path_is_excluded("/", &prefixes));
        assert!(!path_is_excluded("/blog/admin", &prefixes));
    }

    #[test]
    fn empty_prefix_excludes_nothing() {
        assert!(!path_is_excluded("/", &["/".to_string()]));
        assert!(!path_is_excluded("/x", &[]));
    }

    #[test]
    fn visible_slot_is_exclusive() {
        let mut ctx = SessionContext::in_memory("/");
        assert!(ctx.claim_visible(PopupKind::Newsletter));
        assert!(!ctx.claim_visible(PopupKind::Newsletter));
        assert!(ctx.claim_visible(PopupKind::ExitIntent));
        ctx.release_visible(PopupKind::Newsletter);
        assert!(!ctx.is_visible(PopupKind::Newsletter));
    }

    #[test]
    fn popup_kind_parses() {
        assert_eq!("exit-intent".parse::<PopupKind>(), Ok(PopupKind::ExitIntent));
        assert_eq!("newsletter".parse::<PopupKind>(), Ok(PopupKind::Newsletter));
        assert!("modal".parse::<PopupKind>().is_err());
    }
}
