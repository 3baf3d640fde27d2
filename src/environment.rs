//! Environment-variable overlay built from `additional_envs`.
//!
//! The process environment is never mutated. Instead the orchestrator builds
//! one [`EnvOverrides`] before any package is processed and passes it to
//! everything that expands variables.
use std::collections::BTreeMap;

use crate::config::EnvEntry;

/// Read-only view of the process environment with configured overrides layered on top.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    vars: BTreeMap<String, String>,
}

impl EnvOverrides {
    /// Build the overlay from config entries against the real process environment.
    #[must_use]
    pub fn from_config(entries: &BTreeMap<String, EnvEntry>) -> Self {
        Self::from_config_with(entries, |name| std::env::var(name).ok())
    }

    /// Build the overlay using `lookup` as the process environment.
    ///
    /// An entry takes effect when its `overwrite` flag is set, or when the
    /// variable is not already present; otherwise the existing value wins.
    #[must_use]
    pub fn from_config_with(
        entries: &BTreeMap<String, EnvEntry>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let vars = entries
            .iter()
            .filter(|(name, entry)| entry.overwrite || lookup(name.as_str()).is_none())
            .map(|(name, entry)| (name.clone(), entry.value.clone()))
            .collect();
        Self { vars }
    }

    /// Build an overlay whose variables always take precedence.
    #[must_use]
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up `name`, preferring the overlay over the process environment.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Home directory of the invoking user, if known.
    #[must_use]
    pub fn home(&self) -> Option<String> {
        if cfg!(windows) {
            self.get("USERPROFILE").or_else(|| self.get("HOME"))
        } else {
            self.get("HOME")
        }
    }

    /// Variables contributed by the overlay, in name order.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
