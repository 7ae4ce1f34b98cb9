// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered command-default configuration (§6 "Configuration").
//!
//! Six-level precedence, lowest first: built-in defaults, user-scope file,
//! project-scope file, local-scope file, `FM_COMMANDS_<COMMAND>_<PARAM>`
//! environment overrides, CLI flags. Every level below "CLI flags" is
//! merged here; flags themselves are applied by each command handler after
//! calling [`CommandDefaults::param`], since only the handler knows which
//! of its own flags the user actually passed.
//!
//! Grounded on the teacher's file-path resolution style in its own
//! config-adjacent loaders (`dirs::home_dir()`/`dirs::config_dir()` with an
//! env-var override, `toml`/`serde` for parsing) generalized from a single
//! config struct to per-command scalar params, since FM's config isn't one
//! fixed schema — it's "default value of flag X for command Y" per spec.md
//! §6, which a typed struct can't express without one field per flag.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// One scope's worth of parsed TOML: `[command.param] = value` as strings
/// (values are later parsed to whatever type the flag expects).
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    commands: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

/// The provenance a resolved value came from, for `fm config` to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Default,
    UserScope,
    ProjectScope,
    LocalScope,
    Environment,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Provenance::Default => "default",
            Provenance::UserScope => "user",
            Provenance::ProjectScope => "project",
            Provenance::LocalScope => "local",
            Provenance::Environment => "environment",
        };
        write!(f, "{s}")
    }
}

/// A resolved `command.param` value plus where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedValue {
    pub value: toml::Value,
    pub provenance: Provenance,
}

/// The merged view of every scope below CLI flags, keyed by
/// `(command, param)`.
#[derive(Debug, Clone, Default)]
pub struct CommandDefaults {
    values: BTreeMap<(String, String), ResolvedValue>,
}

impl CommandDefaults {
    /// Loads and merges every scope in precedence order. Missing files are
    /// skipped silently (absence is the common case); a present-but-invalid
    /// file is an error, since a typo in a config file should not silently
    /// fall back to defaults.
    pub fn load() -> Result<Self> {
        let mut merged = Self::default();
        for path in scope_paths() {
            if let Some(path) = path {
                merged.merge_file(&path, scope_provenance(&path))?;
            }
        }
        merged.merge_env();
        Ok(merged)
    }

    fn merge_file(&mut self, path: &Path, provenance: Provenance) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        for (command, params) in file.commands {
            for (param, value) in params {
                self.values.insert((command.clone(), param), ResolvedValue { value, provenance });
            }
        }
        Ok(())
    }

    /// Applies `FM_COMMANDS_<COMMAND>_<PARAM>=<value>` overrides. An empty
    /// value clears a previously set list-valued param (§6).
    fn merge_env(&mut self) {
        for (key, value) in std::env::vars() {
            let Some(rest) = key.strip_prefix("FM_COMMANDS_") else { continue };
            let Some((command, param)) = rest.split_once('_') else { continue };
            let (command, param) = (command.to_lowercase(), param.to_lowercase());
            if value.is_empty() {
                self.values.remove(&(command, param));
                continue;
            }
            let parsed = toml::Value::try_from(&value).unwrap_or(toml::Value::String(value));
            self.values.insert((command, param), ResolvedValue { value: parsed, provenance: Provenance::Environment });
        }
    }

    /// Looks up a merged default for `command.param`, below whatever a CLI
    /// flag supplies.
    pub fn param(&self, command: &str, param: &str) -> Option<&ResolvedValue> {
        self.values.get(&(command.to_string(), param.to_string()))
    }

    /// All resolved values, for `fm config` to print with provenance.
    pub fn entries(&self) -> impl Iterator<Item = (&(String, String), &ResolvedValue)> {
        self.values.iter()
    }
}

fn scope_provenance(path: &Path) -> Provenance {
    match user_scope_path() {
        Some(p) if p == path => return Provenance::UserScope,
        _ => {}
    }
    match project_scope_path() {
        Some(p) if p == path => return Provenance::ProjectScope,
        _ => {}
    }
    Provenance::LocalScope
}

fn scope_paths() -> Vec<Option<PathBuf>> {
    vec![user_scope_path(), project_scope_path(), local_scope_path()]
}

/// `~/.config/fm/config.toml` (or platform equivalent) — settings shared
/// across every project on this machine.
fn user_scope_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(fm_daemon::env::root_name()).join("config.toml"))
}

/// `<root>/profiles/<profile-id>/settings.toml` per §6's persisted layout —
/// the project-scope file lives inside the FM root directory itself,
/// shared by every invocation against that root.
fn project_scope_path() -> Option<PathBuf> {
    let root_name = fm_daemon::env::root_name();
    let root_dir = fm_daemon::env::host_dir(&root_name);
    Some(root_dir.join("profiles").join("default").join("settings.toml"))
}

/// `./.fm.toml` in the current working directory — the narrowest, highest
/// priority file scope, for a one-off override in a single checkout.
fn local_scope_path() -> Option<PathBuf> {
    std::env::current_dir().ok().map(|d| d.join(".fm.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn env_override_parses_scalar() {
        let mut defaults = CommandDefaults::default();
        std::env::set_var("FM_COMMANDS_CREATE_PROVIDER", "container");
        defaults.merge_env();
        std::env::remove_var("FM_COMMANDS_CREATE_PROVIDER");
        let resolved = defaults.param("create", "provider").unwrap();
        assert_eq!(resolved.value.as_str(), Some("container"));
        assert_eq!(resolved.provenance, Provenance::Environment);
    }

    #[test]
    fn empty_env_override_clears_existing_value() {
        let mut defaults = CommandDefaults::default();
        defaults
            .values
            .insert(("list".into(), "tags".into()), ResolvedValue { value: toml::Value::from("x"), provenance: Provenance::Default });
        std::env::set_var("FM_COMMANDS_LIST_TAGS", "");
        defaults.merge_env();
        std::env::remove_var("FM_COMMANDS_LIST_TAGS");
        assert!(defaults.param("list", "tags").is_none());
    }

    #[test]
    #[serial]
    fn missing_file_is_not_an_error() {
        let mut defaults = CommandDefaults::default();
        defaults.merge_file(Path::new("/nonexistent/fm-config-test.toml"), Provenance::LocalScope).unwrap();
        assert!(defaults.entries().next().is_none());
    }
}
