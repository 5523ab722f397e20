// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::provision::PollPolicy;

/// Configuration for one identity/compute provider.
///
/// Loaded by the host however it likes (this crate does no file or
/// environment parsing); all endpoints derive from `oauth_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider, no trailing slash.
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,

    /// OAuth client id issued by the provider.
    pub client_id: String,

    /// OAuth client secret issued by the provider.
    pub client_secret: String,

    /// Redirect URI registered for the authorization-code flow.
    pub redirect_uri: String,

    /// Root directory under which per-user credential bundles are written.
    pub credentials_root: PathBuf,

    /// Timeout applied to every outbound HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seconds to sleep between credential download attempts while the
    /// cluster is still building.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum credential download attempts. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_max_attempts: Option<u32>,

    /// Overall deadline for the polling loop, in seconds. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_deadline_secs: Option<u64>,
}

fn default_oauth_url() -> String {
    "https://oauth.getcarina.com".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    30
}

impl ProviderConfig {
    /// Authorization endpoint, for hosts building the login redirect.
    pub fn authorize_url(&self) -> String {
        format!("{}/oauth/authorize", self.oauth_url)
    }

    /// Token endpoint for the authorization-code and refresh-token grants.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.oauth_url)
    }

    /// Identity endpoint for the authenticated user's profile.
    pub fn profile_url(&self) -> String {
        format!("{}/users/current", self.oauth_url)
    }

    /// Cluster collection endpoint (creation and credential downloads).
    pub fn clusters_url(&self) -> String {
        format!("{}/proxy/clusters", self.oauth_url)
    }

    /// Compute template listing endpoint.
    pub fn templates_url(&self) -> String {
        format!("{}/proxy/cluster_types", self.oauth_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.poll_max_attempts,
            deadline: self.poll_deadline_secs.map(Duration::from_secs),
        }
    }

    /// Directory that holds the credential bundle for one (user, cluster) pair.
    pub fn bundle_dir(&self, user: &str, cluster_name: &str) -> PathBuf {
        self.credentials_root.join(user).join(cluster_name)
    }
}
