// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The state store proper (C2): atomic descriptor read/write for hosts and
//! agents, id-or-unique-prefix lookup (grounded on the teacher's
//! `find_by_prefix` convention in `daemon/src/storage/state/mod.rs`), and
//! name-uniqueness enforcement (§3 invariant 2).

use std::fs;
use std::path::PathBuf;

use fm_core::{AgentDescriptor, AgentId, HostDescriptor, HostId};
use thiserror::Error;

use crate::atomic::write_json_atomic;
use crate::layout::Layout;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("ambiguous prefix {0:?} matches multiple entities")]
    AmbiguousPrefix(String),
    #[error("name {0:?} is already in use")]
    NameInUse(String),
    #[error("corrupt descriptor at {path}: {source}")]
    Corrupt { path: PathBuf, #[source] source: serde_json::Error },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        match self {
            StoreError::NotFound(_) => fm_core::ErrorKind::NotFound,
            StoreError::AmbiguousPrefix(_) | StoreError::NameInUse(_) => fm_core::ErrorKind::InvalidRequest,
            StoreError::Corrupt { .. } => fm_core::ErrorKind::Integrity,
            StoreError::Io(_) => fm_core::ErrorKind::Internal,
        }
    }
}

#[derive(Clone)]
pub struct StateStore {
    layout: Layout,
}

impl StateStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    // -- hosts --------------------------------------------------------

    pub fn write_host(&self, host: &HostDescriptor) -> Result<(), StoreError> {
        let path = self.layout.host_data_json(&host.id);
        write_json_atomic(&path, host)?;
        Ok(())
    }

    pub fn read_host(&self, id: &HostId) -> Result<HostDescriptor, StoreError> {
        let path = self.layout.host_data_json(id);
        read_descriptor(&path)
    }

    /// Resolves `id_or_name_or_prefix` against every host's id, full name,
    /// and unique id-prefix, in that priority order.
    pub fn find_host(&self, id_or_name_or_prefix: &str) -> Result<HostDescriptor, StoreError> {
        let all = self.list_hosts()?;
        find_one(&all, id_or_name_or_prefix, |h| h.id.as_str().to_string(), |h| h.name.clone())
    }

    pub fn list_hosts(&self) -> Result<Vec<HostDescriptor>, StoreError> {
        let dir = self.layout.hosts_dir();
        let mut out = Vec::new();
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let data_json = entry.path().join("data.json");
            if data_json.is_file() {
                out.push(read_descriptor(&data_json)?);
            }
        }
        out.sort_by(|a, b| a.created_at_epoch_ms.cmp(&b.created_at_epoch_ms));
        Ok(out)
    }

    /// Returns `true` if any non-destroyed host other than `exclude` already
    /// has this name (§3 invariant 2).
    pub fn host_name_taken(&self, name: &str, exclude: Option<&HostId>) -> Result<bool, StoreError> {
        Ok(self
            .list_hosts()?
            .into_iter()
            .any(|h| !h.destroyed && h.name == name && exclude != Some(&h.id)))
    }

    /// Deletes a host's entire state subtree (used once a host is fully
    /// destroyed and past its tombstone window, or by `gc`).
    pub fn purge_host(&self, id: &HostId) -> Result<(), StoreError> {
        let dir = self.layout.host_dir(id);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // -- agents ---------------------------------------------------------

    pub fn write_agent(&self, agent: &AgentDescriptor) -> Result<(), StoreError> {
        let path = self.layout.agent_data_json(&agent.host_id, &agent.id);
        write_json_atomic(&path, agent)?;
        Ok(())
    }

    pub fn read_agent(&self, host_id: &HostId, id: &AgentId) -> Result<AgentDescriptor, StoreError> {
        let path = self.layout.agent_data_json(host_id, id);
        read_descriptor(&path)
    }

    /// Lists every agent under one host.
    pub fn list_agents_on_host(&self, host_id: &HostId) -> Result<Vec<AgentDescriptor>, StoreError> {
        let dir = self.layout.agents_dir(host_id);
        let mut out = Vec::new();
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let data_json = entry.path().join("data.json");
            if data_json.is_file() {
                out.push(read_descriptor(&data_json)?);
            }
        }
        out.sort_by(|a, b| a.created_at_epoch_ms.cmp(&b.created_at_epoch_ms));
        Ok(out)
    }

    /// Lists every agent across every host (used by the fleet enumerator).
    pub fn list_all_agents(&self) -> Result<Vec<AgentDescriptor>, StoreError> {
        let mut out = Vec::new();
        for host in self.list_hosts()? {
            out.extend(self.list_agents_on_host(&host.id)?);
        }
        Ok(out)
    }

    /// Resolves an agent by id, name, or unique id-prefix across the whole
    /// fleet.
    pub fn find_agent(&self, id_or_name_or_prefix: &str) -> Result<AgentDescriptor, StoreError> {
        let all = self.list_all_agents()?;
        find_one(&all, id_or_name_or_prefix, |a| a.id.as_str().to_string(), |a| a.name.clone())
    }

    pub fn agent_name_taken(&self, name: &str, exclude: Option<&AgentId>) -> Result<bool, StoreError> {
        Ok(self
            .list_all_agents()?
            .into_iter()
            .any(|a| !a.destroyed && a.name == name && exclude != Some(&a.id)))
    }

    pub fn purge_agent(&self, host_id: &HostId, id: &AgentId) -> Result<(), StoreError> {
        let dir = self.layout.agent_dir(host_id, id);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_descriptor<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, StoreError> {
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path.display().to_string())
        } else {
            StoreError::Io(e)
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })
}

fn find_one<T: Clone>(
    all: &[T],
    needle: &str,
    id_of: impl Fn(&T) -> String,
    name_of: impl Fn(&T) -> String,
) -> Result<T, StoreError> {
    if let Some(exact) = all.iter().find(|t| id_of(t) == needle) {
        return Ok(exact.clone());
    }
    if let Some(named) = all.iter().find(|t| name_of(t) == needle) {
        return Ok(named.clone());
    }
    let prefix_matches: Vec<&T> = all.iter().filter(|t| id_of(t).starts_with(needle)).collect();
    match prefix_matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(StoreError::NotFound(needle.to_string())),
        _ => Err(StoreError::AmbiguousPrefix(needle.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_core::HostDescriptorBuilder;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempdir().unwrap();
        let store = StateStore::new(Layout::new(dir.path()));
        (dir, store)
    }

    #[test]
    fn write_then_read_host() {
        let (_dir, store) = store();
        let host = HostDescriptorBuilder::default().name("box").build();
        store.write_host(&host).unwrap();
        let read = store.read_host(&host.id).unwrap();
        assert_eq!(read.name, "box");
    }

    #[test]
    fn find_host_by_name() {
        let (_dir, store) = store();
        let host = HostDescriptorBuilder::default().name("prod-box").build();
        store.write_host(&host).unwrap();
        let found = store.find_host("prod-box").unwrap();
        assert_eq!(found.id, host.id);
    }

    #[test]
    fn find_host_by_unique_id_prefix() {
        let (_dir, store) = store();
        let host = HostDescriptorBuilder::default().name("box").build();
        store.write_host(&host).unwrap();
        let prefix = &host.id.as_str()[..8];
        let found = store.find_host(prefix).unwrap();
        assert_eq!(found.id, host.id);
    }

    #[test]
    fn ambiguous_prefix_is_an_error() {
        use fm_core::HostId;
        let (_dir, store) = store();
        let a = HostDescriptorBuilder::default().name("a").id(HostId::from_string("hst-zzzzzzzzzzzzzzzzz01")).build();
        let b = HostDescriptorBuilder::default().name("b").id(HostId::from_string("hst-zzzzzzzzzzzzzzzzz02")).build();
        store.write_host(&a).unwrap();
        store.write_host(&b).unwrap();
        assert!(matches!(store.find_host("hst-zzz"), Err(StoreError::AmbiguousPrefix(_))));
    }

    #[test]
    fn name_uniqueness_check() {
        let (_dir, store) = store();
        let host = HostDescriptorBuilder::default().name("box").build();
        store.write_host(&host).unwrap();
        assert!(store.host_name_taken("box", None).unwrap());
        assert!(!store.host_name_taken("box", Some(&host.id)).unwrap());
        assert!(!store.host_name_taken("other", None).unwrap());
    }

    #[test]
    fn destroyed_host_name_is_not_taken() {
        let (_dir, store) = store();
        let mut host = HostDescriptorBuilder::default().name("box").build();
        host.destroyed = true;
        store.write_host(&host).unwrap();
        assert!(!store.host_name_taken("box", None).unwrap());
    }

    #[test]
    fn purge_removes_the_whole_subtree() {
        let (_dir, store) = store();
        let host = HostDescriptorBuilder::default().name("box").build();
        store.write_host(&host).unwrap();
        store.purge_host(&host.id).unwrap();
        assert!(matches!(store.read_host(&host.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn corrupt_descriptor_is_reported_distinctly() {
        let (_dir, store) = store();
        let host = HostDescriptorBuilder::default().name("box").build();
        let path = store.layout().host_data_json(&host.id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(store.read_host(&host.id), Err(StoreError::Corrupt { .. })));
    }
}
