// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-facing session: identity resolution and cluster provisioning for
//! one user.
//!
//! The host composes these capabilities by dependency injection;
//! [`Session::new`] wires the OAuth client and the provisioner up front, so
//! there is no lazy, null-checked initialization anywhere.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::credential::client::OAuthClient;
use crate::credential::SavedCredentials;
use crate::error::Error;
use crate::provision::orchestrator::Provisioner;

/// Identity resolution and credential custody for one user session.
#[async_trait]
pub trait CredentialProvider {
    /// Exchange an authorization code and resolve the user's identity.
    ///
    /// Fails with [`Error::Authentication`] when no code is present.
    /// Returns the provider-side username; mapping it to a system account
    /// and allow-listing are the host's policy, not handled here.
    async fn authenticate(&self, authorization_code: Option<&str>) -> Result<String, Error>;

    /// Restore identity and credentials persisted by a previous session.
    async fn restore(&self, user: &str, saved: SavedCredentials);

    /// Export current credentials for host persistence. `None` when the
    /// session never authenticated.
    async fn export(&self) -> Option<SavedCredentials>;
}

/// Remote compute provisioning for one user session.
#[async_trait]
pub trait ClusterProvisioner {
    /// Provision the named cluster and materialize its credential bundle,
    /// returning the bundle directory.
    ///
    /// Idempotent per (user, cluster): an already materialized bundle
    /// short-circuits to success. Cancel the token to abort a polling loop
    /// that is waiting on the provider.
    async fn provision(
        &self,
        cluster_name: &str,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, Error>;
}

/// One user's session with the provider.
///
/// Sessions are fully independent: each owns its OAuth client and
/// provisioner, and nothing is shared across users.
pub struct Session {
    client: Arc<OAuthClient>,
    provisioner: Provisioner,
}

impl Session {
    pub fn new(config: Arc<ProviderConfig>) -> Self {
        let client = Arc::new(OAuthClient::new(Arc::clone(&config)));
        let provisioner = Provisioner::new(config, Arc::clone(&client));
        Self { client, provisioner }
    }

    /// The OAuth client backing this session.
    pub fn client(&self) -> &Arc<OAuthClient> {
        &self.client
    }
}

#[async_trait]
impl CredentialProvider for Session {
    async fn authenticate(&self, authorization_code: Option<&str>) -> Result<String, Error> {
        let code = authorization_code.ok_or_else(|| Error::Authentication {
            reason: "oauth callback made without an authorization code".to_owned(),
        })?;

        self.client.exchange_authorization_code(code).await?;
        let profile = self.client.get_user_profile().await?;
        self.client.set_user(&profile.username).await;
        tracing::info!(user = %profile.username, "authenticated");
        Ok(profile.username)
    }

    async fn restore(&self, user: &str, saved: SavedCredentials) {
        tracing::debug!(user = %user, "restoring oauth credentials");
        self.client.set_user(user).await;
        self.client.load_credentials(saved).await;
    }

    async fn export(&self) -> Option<SavedCredentials> {
        self.client.export_credentials().await
    }
}

#[async_trait]
impl ClusterProvisioner for Session {
    async fn provision(
        &self,
        cluster_name: &str,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, Error> {
        self.provisioner.provision(cluster_name, cancel).await
    }
}
