// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path layout under the FM root directory (spec §6).

use std::path::{Path, PathBuf};

use fm_core::{AgentId, HostId};

/// Resolves every path FM persists state under, relative to a single root
/// directory (`FM_HOST_DIR`, defaulting to a per-profile data dir).
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile_settings(&self, profile_id: &str) -> PathBuf {
        self.root.join("profiles").join(profile_id).join("settings.toml")
    }

    pub fn hosts_dir(&self) -> PathBuf {
        self.root.join("hosts")
    }

    pub fn host_dir(&self, host_id: &HostId) -> PathBuf {
        self.hosts_dir().join(host_id.as_str())
    }

    pub fn host_data_json(&self, host_id: &HostId) -> PathBuf {
        self.host_dir(host_id).join("data.json")
    }

    pub fn host_lock_file(&self, host_id: &HostId) -> PathBuf {
        self.host_dir(host_id).join("lock")
    }

    pub fn host_logs_dir(&self, host_id: &HostId) -> PathBuf {
        self.host_dir(host_id).join("logs")
    }

    pub fn activity_dir(&self, host_id: &HostId) -> PathBuf {
        self.host_dir(host_id).join("activity")
    }

    pub fn activity_file(&self, host_id: &HostId, source: &str) -> PathBuf {
        self.activity_dir(host_id).join(source)
    }

    pub fn agents_dir(&self, host_id: &HostId) -> PathBuf {
        self.host_dir(host_id).join("agents")
    }

    pub fn agent_dir(&self, host_id: &HostId, agent_id: &AgentId) -> PathBuf {
        self.agents_dir(host_id).join(agent_id.as_str())
    }

    pub fn agent_data_json(&self, host_id: &HostId, agent_id: &AgentId) -> PathBuf {
        self.agent_dir(host_id, agent_id).join("data.json")
    }

    pub fn agent_work_dir(&self, host_id: &HostId, agent_id: &AgentId) -> PathBuf {
        self.agent_dir(host_id, agent_id).join("work_dir")
    }

    pub fn agent_logs_dir(&self, host_id: &HostId, agent_id: &AgentId) -> PathBuf {
        self.agent_dir(host_id, agent_id).join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_nest_under_root() {
        let layout = Layout::new("/tmp/fm-root");
        let host = HostId::from_string("hst-aaaaaaaaaaaaaaaaaaa");
        let agent = AgentId::from_string("agt-bbbbbbbbbbbbbbbbbbb");
        assert_eq!(layout.host_data_json(&host), PathBuf::from("/tmp/fm-root/hosts/hst-aaaaaaaaaaaaaaaaaaa/data.json"));
        assert_eq!(
            layout.agent_data_json(&host, &agent),
            PathBuf::from("/tmp/fm-root/hosts/hst-aaaaaaaaaaaaaaaaaaa/agents/agt-bbbbbbbbbbbbbbbbbbb/data.json")
        );
        assert_eq!(
            layout.activity_file(&host, "user"),
            PathBuf::from("/tmp/fm-root/hosts/hst-aaaaaaaaaaaaaaaaaaa/activity/user")
        );
    }
}
