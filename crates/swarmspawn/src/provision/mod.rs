// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster provisioning against the provider's compute API.

pub mod bundle;
pub mod orchestrator;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The container orchestration engine this crate provisions.
pub const TARGET_ENGINE: &str = "swarm";

/// Marker phrase in a 404 body meaning the cluster is still building.
/// This is the only retryable download failure.
pub(crate) const CREDENTIALS_PENDING_MARKER: &str = "Cluster credentials do not exist";

/// A compute template offered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterTemplate {
    pub id: u64,
    /// Container orchestration engine ("swarm", "kubernetes", ...).
    pub coe: String,
}

/// Response of the template listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateList {
    pub cluster_types: Vec<ClusterTemplate>,
}

/// Body of a cluster creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateClusterRequest {
    pub cluster_type_id: u64,
    pub node_count: u32,
    pub name: String,
}

/// A cluster as reported by the creation endpoint. Only the id is needed
/// afterwards; nothing here is persisted locally.
#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Retry policy for the credential polling loop.
///
/// The default keeps the provider's historical behavior: poll every 30
/// seconds with no bound. Hosts that want a ceiling set `max_attempts`
/// or `deadline` (or cancel the token passed to provisioning).
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Give up after this many retryable 404s. Unbounded when `None`.
    pub max_attempts: Option<u32>,
    /// Give up once the loop has run this long. Unbounded when `None`.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(30), max_attempts: None, deadline: None }
    }
}

/// Phase of a provisioning attempt, carried in errors and log records.
/// There is no "ready" phase: a finished attempt returns the bundle
/// directory instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TemplateLookup,
    Creating,
    PollingCredentials,
    Materializing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TemplateLookup => "template lookup",
            Self::Creating => "cluster creation",
            Self::PollingCredentials => "credential polling",
            Self::Materializing => "bundle extraction",
        };
        f.write_str(s)
    }
}
