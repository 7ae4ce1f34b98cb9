// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CloudSandboxProvider`: hosts run as Kubernetes pods, reached over the
//! cluster network. Grounded on the teacher's `KubernetesAdapter`
//! (`daemon/src/adapters/agent/k8s/mod.rs`): `kube`/`k8s-openapi` for pod
//! lifecycle, label-based bookkeeping instead of a local provider-ref cache.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use fm_core::{HostDescriptor, ProviderKind, SnapshotRef, Ssh};
use k8s_openapi::api::core::v1::{Container, ContainerPort, Pod, PodSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use tokio::time::{sleep, timeout};

use super::{
    BuildSpec, CreateHostRequest, ExecRequest, ExecResult, ListHostsFilter, Provider, ProviderError,
    ProviderHostInfo, TransferDirection, TransferRequest,
};

const LABEL_APP: &str = "app";
const LABEL_APP_VALUE: &str = "fm-host";
const LABEL_FLEET: &str = "fm.dev/fleet";
const LABEL_HOST_ID: &str = "fm.dev/host-id";
const DEFAULT_PORT: i32 = 8080;

pub struct CloudSandboxProvider {
    client: Client,
    namespace: String,
}

impl CloudSandboxProvider {
    pub async fn new() -> Result<Self, ProviderError> {
        let client = Client::try_default()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("kube client init failed: {e}")))?;
        Ok(Self { client, namespace: "default".to_string() })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn pod_name(host: &HostDescriptor) -> String {
        format!("fm-{}", host.id)
    }

    fn build_pod(&self, req: &CreateHostRequest, image: &str) -> Pod {
        let mut labels: BTreeMap<String, String> = req.tags.clone();
        labels.insert(LABEL_APP.to_string(), LABEL_APP_VALUE.to_string());

        let mut requests = BTreeMap::new();
        if let Some(cpu) = req.resource.cpu {
            requests.insert("cpu".to_string(), Quantity(cpu.to_string()));
        }
        if let Some(mem) = req.resource.memory_mb {
            requests.insert("memory".to_string(), Quantity(format!("{mem}Mi")));
        }

        Pod {
            metadata: ObjectMeta {
                name: Some(req.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "host".to_string(),
                    image: Some(image.to_string()),
                    ports: Some(vec![ContainerPort { container_port: DEFAULT_PORT, ..Default::default() }]),
                    resources: (!requests.is_empty())
                        .then(|| ResourceRequirements { requests: Some(requests), ..Default::default() }),
                    ..Default::default()
                }],
                restart_policy: Some("Never".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    async fn wait_for_pod_ip(&self, name: &str, hard_timeout: Duration) -> Result<String, ProviderError> {
        let deadline = async {
            loop {
                if let Ok(pod) = self.pods().get(name).await {
                    if let Some(ip) = pod.status.as_ref().and_then(|s| s.pod_ip.clone()) {
                        if !ip.is_empty() {
                            return ip;
                        }
                    }
                }
                sleep(Duration::from_millis(500)).await;
            }
        };
        timeout(hard_timeout, deadline).await.map_err(|_| ProviderError::Timeout(hard_timeout))
    }
}

#[async_trait]
impl Provider for CloudSandboxProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CloudSandbox
    }

    async fn build(&self, spec: &BuildSpec) -> Result<String, ProviderError> {
        // Image builds happen out-of-band (a registry push); the sandbox
        // provider only records the reference it will later schedule.
        if spec.base_image.is_empty() {
            return Err(ProviderError::InvalidSpec("base_image is required".into()));
        }
        Ok(spec.base_image.clone())
    }

    async fn create_host(&self, req: &CreateHostRequest) -> Result<ProviderHostInfo, ProviderError> {
        let image = req.image.clone().ok_or_else(|| ProviderError::InvalidSpec("cloud sandbox requires an image".into()))?;
        let pod = self.build_pod(req, &image);
        self.pods()
            .create(&PostParams::default(), &pod)
            .await
            .map_err(|e| ProviderError::Unavailable(format!("pod create failed: {e}")))?;

        let ip = self.wait_for_pod_ip(&req.name, Duration::from_secs(60)).await?;
        Ok(ProviderHostInfo {
            provider_ref: req.name.clone(),
            tags: req.tags.clone(),
            ssh: Some(Ssh {
                address: ip,
                port: 22,
                user: "agent".to_string(),
                key_path: Default::default(),
                connect_timeout: Duration::from_secs(10),
            }),
            running: true,
        })
    }

    async fn start_host(&self, _host: &HostDescriptor, _snapshot: Option<&str>) -> Result<(), ProviderError> {
        // Pods are created running; "start" after a stop re-creates from
        // the last snapshot image, which `create_host` already covers when
        // driven by the orchestrator's restart path.
        Err(ProviderError::Unsupported("start_host (pods are recreated, not resumed)"))
    }

    async fn stop_host(&self, host: &HostDescriptor, do_snapshot: bool) -> Result<Option<SnapshotRef>, ProviderError> {
        let snapshot = if do_snapshot { Some(self.snapshot(host).await?) } else { None };
        let name = Self::pod_name(host);
        self.pods()
            .delete(&name, &DeleteParams::default())
            .await
            .map_err(|e| ProviderError::Unavailable(format!("pod delete failed: {e}")))?;
        Ok(snapshot)
    }

    async fn destroy_host(&self, host: &HostDescriptor, _purge_snapshots: bool) -> Result<(), ProviderError> {
        let name = Self::pod_name(host);
        match self.pods().delete(&name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(ProviderError::Unavailable(format!("pod delete failed: {e}"))),
        }
    }

    async fn snapshot(&self, _host: &HostDescriptor) -> Result<SnapshotRef, ProviderError> {
        // No image-commit equivalent for a running pod without a registry
        // push pipeline external to this adapter.
        Err(ProviderError::Unsupported("snapshot"))
    }

    async fn exec(&self, host: &HostDescriptor, req: ExecRequest) -> Result<ExecResult, ProviderError> {
        let ssh = host
            .ssh
            .as_ref()
            .ok_or_else(|| ProviderError::Unavailable("pod has no reachable address yet".into()))?;
        super::secure_shell::exec_over_ssh(ssh, req).await
    }

    async fn transfer(&self, host: &HostDescriptor, req: TransferRequest<'_>) -> Result<(), ProviderError> {
        let ssh = host
            .ssh
            .as_ref()
            .ok_or_else(|| ProviderError::Unavailable("pod has no reachable address yet".into()))?;
        super::secure_shell::transfer_over_ssh(ssh, req).await
    }

    async fn list_hosts(&self, filter: &ListHostsFilter) -> Result<Vec<ProviderHostInfo>, ProviderError> {
        let mut lp = ListParams::default().labels(&format!("{LABEL_APP}={LABEL_APP_VALUE}"));
        if let Some(tag) = &filter.fleet_tag {
            lp = lp.labels(&format!("{LABEL_APP}={LABEL_APP_VALUE},{LABEL_FLEET}={tag}"));
        }
        let pods = self
            .pods()
            .list(&lp)
            .await
            .map_err(|e| ProviderError::Unavailable(format!("pod list failed: {e}")))?;

        Ok(pods
            .into_iter()
            .filter_map(|pod| {
                let name = pod.metadata.name.clone()?;
                let tags = pod.metadata.labels.clone().unwrap_or_default().into_iter().collect();
                let running = pod
                    .status
                    .as_ref()
                    .and_then(|s| s.phase.as_deref())
                    .map(|p| p == "Running")
                    .unwrap_or(false);
                let ssh = pod.status.as_ref().and_then(|s| s.pod_ip.clone()).map(|ip| Ssh {
                    address: ip,
                    port: 22,
                    user: "agent".to_string(),
                    key_path: Default::default(),
                    connect_timeout: Duration::from_secs(10),
                });
                let _ = LABEL_HOST_ID;
                Some(ProviderHostInfo { provider_ref: name, tags, ssh, running })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_name_is_prefixed_with_host_id() {
        let host = fm_core::HostDescriptorBuilder::default().name("box").build();
        assert_eq!(CloudSandboxProvider::pod_name(&host), format!("fm-{}", host.id));
    }
}
