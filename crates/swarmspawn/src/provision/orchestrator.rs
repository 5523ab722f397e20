// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning orchestrator: template lookup, cluster creation, and
//! credential polling, strictly in that order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::ACCEPT;
use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::credential::client::OAuthClient;
use crate::error::Error;
use crate::provision::bundle;
use crate::provision::{
    Cluster, CreateClusterRequest, Phase, TemplateList, CREDENTIALS_PENDING_MARKER, TARGET_ENGINE,
};

/// Provisions one named cluster per user and materializes its credentials.
pub struct Provisioner {
    config: Arc<ProviderConfig>,
    client: Arc<OAuthClient>,
}

impl Provisioner {
    pub fn new(config: Arc<ProviderConfig>, client: Arc<OAuthClient>) -> Self {
        Self { config, client }
    }

    /// Drive one provisioning attempt to completion and return the bundle
    /// directory.
    ///
    /// Short-circuits to success without touching the provider when a fully
    /// materialized bundle already exists for this (user, cluster) pair.
    pub async fn provision(
        &self,
        cluster_name: &str,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, Error> {
        let user = self.client.user().await;
        let dest = self.config.bundle_dir(&user, cluster_name);
        if bundle::is_materialized(&dest) {
            tracing::debug!(user = %user, cluster = %cluster_name, path = %dest.display(),
                "credential bundle already present, skipping provisioning");
            return Ok(dest);
        }

        let template_id = self.lookup_swarm_template().await?;
        let cluster = self.create_cluster(cluster_name, template_id).await?;
        let archive = self.poll_credentials(&cluster.id, cluster_name, cancel).await?;

        bundle::extract_bundle(&archive, &dest).map_err(|e| Error::Provisioning {
            phase: Phase::Materializing,
            reason: match e {
                Error::Extraction { reason } => reason,
                other => other.to_string(),
            },
        })?;
        tracing::info!(user = %user, cluster = %cluster_name, path = %dest.display(),
            "credential bundle materialized");
        Ok(dest)
    }

    /// Look up the newest swarm template.
    ///
    /// Fetched fresh on every attempt: the provider retires and supersedes
    /// templates, so a cached id can go stale.
    async fn lookup_swarm_template(&self) -> Result<u64, Error> {
        let user = self.client.user().await;
        tracing::info!(user = %user, "looking up latest swarm template");
        let url = self.config.templates_url();
        let resp = self
            .client
            .execute("template lookup", |http| http.get(&url).header(ACCEPT, "application/json"))
            .await?;
        let templates: TemplateList = resp.json().await.map_err(|e| Error::Provisioning {
            phase: Phase::TemplateLookup,
            reason: format!("malformed template list: {e}"),
        })?;

        let template_id = templates
            .cluster_types
            .iter()
            .filter(|t| t.coe == TARGET_ENGINE)
            .map(|t| t.id)
            .max()
            .unwrap_or(0);
        if template_id == 0 {
            return Err(Error::Provisioning {
                phase: Phase::TemplateLookup,
                reason: format!("no {TARGET_ENGINE} template available"),
            });
        }
        Ok(template_id)
    }

    /// Request cluster creation. Never retried: creation is not known to be
    /// safe to re-issue blindly.
    async fn create_cluster(&self, cluster_name: &str, template_id: u64) -> Result<Cluster, Error> {
        let user = self.client.user().await;
        tracing::info!(user = %user, cluster = %cluster_name, template_id, "creating cluster");
        let url = self.config.clusters_url();
        let body = CreateClusterRequest {
            cluster_type_id: template_id,
            node_count: 1,
            name: cluster_name.to_owned(),
        };
        let resp = self
            .client
            .execute("cluster creation", |http| {
                http.post(&url).header(ACCEPT, "application/json").json(&body)
            })
            .await?;
        let cluster: Cluster = resp.json().await.map_err(|e| Error::Provisioning {
            phase: Phase::Creating,
            reason: format!("malformed cluster response: {e}"),
        })?;
        tracing::info!(user = %user, cluster = %cluster_name, id = %cluster.id, "cluster created");
        Ok(cluster)
    }

    /// Poll for the cluster's credential archive until it is downloadable.
    ///
    /// While the cluster is building, the provider answers 404 with a
    /// well-known body; that is the only retryable condition. Anything else
    /// terminates the attempt with the upstream status and body.
    async fn poll_credentials(
        &self,
        cluster_id: &str,
        cluster_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, Error> {
        let user = self.client.user().await;
        let url = format!("{}/{}/credentials/zip", self.config.clusters_url(), cluster_id);
        let policy = self.config.poll_policy();
        let started = Instant::now();
        let mut attempts: u32 = 0;

        tracing::info!(user = %user, cluster = %cluster_name, id = %cluster_id,
            "downloading cluster credentials");
        loop {
            if cancel.is_cancelled() {
                return Err(cancelled());
            }

            let result = self
                .client
                .execute("credential download", |http| {
                    http.get(&url).header(ACCEPT, "application/zip")
                })
                .await;

            match result {
                Ok(resp) => {
                    let bytes = resp.bytes().await?;
                    tracing::debug!(user = %user, cluster = %cluster_name, id = %cluster_id,
                        "cluster credentials received");
                    return Ok(bytes.to_vec());
                }
                Err(Error::Request { status: 404, ref body, .. })
                    if body.contains(CREDENTIALS_PENDING_MARKER) =>
                {
                    attempts += 1;
                    if let Some(max) = policy.max_attempts {
                        if attempts >= max {
                            return Err(Error::Provisioning {
                                phase: Phase::PollingCredentials,
                                reason: format!("cluster not active after {attempts} attempts"),
                            });
                        }
                    }
                    if let Some(deadline) = policy.deadline {
                        if started.elapsed() >= deadline {
                            return Err(Error::Provisioning {
                                phase: Phase::PollingCredentials,
                                reason: format!(
                                    "cluster not active after {}s",
                                    started.elapsed().as_secs()
                                ),
                            });
                        }
                    }
                    tracing::debug!(user = %user, cluster = %cluster_name, id = %cluster_id,
                        retry_in_secs = policy.interval.as_secs(),
                        "cluster not yet active, retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(cancelled()),
                        _ = tokio::time::sleep(policy.interval) => {}
                    }
                }
                Err(e) => {
                    tracing::error!(user = %user, cluster = %cluster_name, id = %cluster_id,
                        err = %e, "credential download failed");
                    return Err(e);
                }
            }
        }
    }
}

fn cancelled() -> Error {
    Error::Provisioning {
        phase: Phase::PollingCredentials,
        reason: "provisioning cancelled".to_owned(),
    }
}
