// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth client: token grants plus authorized request execution with a
//! single transparent refresh-and-retry on rejection.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use tokio::sync::{Mutex, RwLock};

use crate::config::ProviderConfig;
use crate::credential::oauth::{Profile, TokenResponse};
use crate::credential::{epoch_secs, OAuthCredentials, SavedCredentials};
use crate::error::Error;

/// Product-identifying User-Agent sent on every request.
pub const USER_AGENT: &str = concat!("swarmspawn/", env!("CARGO_PKG_VERSION"));

/// Placeholder user label until identity is resolved.
const UNKNOWN_USER: &str = "UNKNOWN";

/// Talks to the provider via OAuth2 on behalf of one user session.
pub struct OAuthClient {
    config: Arc<ProviderConfig>,
    http: reqwest::Client,
    credentials: RwLock<Option<OAuthCredentials>>,
    /// Serializes refreshes so concurrent callers that both observe an
    /// expired token don't issue duplicate grants.
    refresh_gate: Mutex<()>,
    /// User label for log context.
    user: RwLock<String>,
}

impl OAuthClient {
    pub fn new(config: Arc<ProviderConfig>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            config,
            http,
            credentials: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            user: RwLock::new(UNKNOWN_USER.to_owned()),
        }
    }

    /// The user this client acts for, once identity has been resolved.
    pub async fn user(&self) -> String {
        self.user.read().await.clone()
    }

    pub async fn set_user(&self, user: &str) {
        *self.user.write().await = user.to_owned();
    }

    /// Replace the stored credentials wholesale.
    pub async fn load_credentials(&self, saved: SavedCredentials) {
        *self.credentials.write().await = Some(saved.into());
    }

    /// Export the stored credentials, if any.
    pub async fn export_credentials(&self) -> Option<SavedCredentials> {
        self.credentials.read().await.as_ref().map(SavedCredentials::from)
    }

    /// Exchange an authorization code for access and refresh tokens.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<(), Error> {
        tracing::debug!("requesting oauth tokens");
        self.execute_token_request(&[("code", code), ("grant_type", "authorization_code")]).await
    }

    /// Exchange the stored refresh token for a new set of tokens.
    pub async fn refresh_tokens(&self) -> Result<(), Error> {
        let _gate = self.refresh_gate.lock().await;
        self.do_refresh().await
    }

    async fn do_refresh(&self) -> Result<(), Error> {
        let refresh_token = {
            let creds = self.credentials.read().await;
            match creds.as_ref() {
                Some(c) => c.refresh_token.clone(),
                None => {
                    return Err(Error::Authentication {
                        reason: "no refresh token available".to_owned(),
                    })
                }
            }
        };
        let user = self.user().await;
        tracing::info!(user = %user, "refreshing oauth tokens");
        self.execute_token_request(&[
            ("refresh_token", &refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    /// POST a token grant and replace the credential store on success.
    async fn execute_token_request(&self, grant: &[(&str, &str)]) -> Result<(), Error> {
        let mut form: Vec<(&str, &str)> = grant.to_vec();
        form.push(("client_id", self.config.client_id.as_str()));
        form.push(("client_secret", self.config.client_secret.as_str()));
        form.push(("redirect_uri", self.config.redirect_uri.as_str()));

        // Expiry is computed from the moment the grant is issued, not when
        // the response arrives.
        let issued_at = epoch_secs();
        let resp = self
            .http
            .post(self.config.token_url())
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let user = self.user().await;
            tracing::warn!(user = %user, status = %status, body = %body, "token grant rejected");
            return Err(Error::Authentication {
                reason: format!("token grant failed ({status}): {body}"),
            });
        }

        let token: TokenResponse = resp.json().await.map_err(|e| Error::Authentication {
            reason: format!("malformed token response: {e}"),
        })?;
        *self.credentials.write().await = Some(OAuthCredentials {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: issued_at.saturating_add(token.expires_in),
        });
        Ok(())
    }

    /// Fetch the authenticated user's profile from the identity endpoint.
    pub async fn get_user_profile(&self) -> Result<Profile, Error> {
        tracing::debug!("retrieving the user profile");
        let url = self.config.profile_url();
        let resp = self
            .execute("profile lookup", |http| http.get(&url).header(ACCEPT, "application/json"))
            .await?;
        resp.json().await.map_err(|e| Error::Authentication {
            reason: format!("malformed profile response: {e}"),
        })
    }

    /// Execute an authorized request against the provider API.
    ///
    /// `build` constructs the request from the shared HTTP client; it is
    /// invoked a second time if the request has to be retried with fresh
    /// tokens. A rejected token (401) triggers exactly one refresh-and-retry
    /// cycle; every other non-2xx status propagates immediately as
    /// [`Error::Request`]. Retrying 5xx or timeouts is the caller's policy.
    pub async fn execute<F>(&self, operation: &str, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        self.refresh_if_expired().await?;

        let resp = self.authorized_send(operation, &build).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return self.into_result(operation, resp).await;
        }

        let user = self.user().await;
        tracing::info!(user = %user, operation, "access token rejected, retrying with fresh tokens");
        self.refresh_tokens().await?;
        let resp = self.authorized_send(operation, &build).await?;
        self.into_result(operation, resp).await
    }

    /// Refresh proactively when the store reports the token expired.
    ///
    /// The gate is taken before re-checking so that concurrent requests
    /// which all observed an expired token funnel into a single refresh.
    async fn refresh_if_expired(&self) -> Result<(), Error> {
        let expired = {
            let creds = self.credentials.read().await;
            match creds.as_ref() {
                Some(c) => c.is_expired(epoch_secs()),
                None => {
                    return Err(Error::Authentication { reason: "not authenticated".to_owned() })
                }
            }
        };
        if !expired {
            return Ok(());
        }

        let _gate = self.refresh_gate.lock().await;
        let stale_expiry = {
            let creds = self.credentials.read().await;
            match creds.as_ref() {
                Some(c) if c.is_expired(epoch_secs()) => Some(c.expires_at),
                Some(_) => None,
                None => Some(0),
            }
        };
        let Some(expires_at) = stale_expiry else {
            // Another caller refreshed while we waited on the gate.
            return Ok(());
        };
        let user = self.user().await;
        tracing::info!(user = %user, expires_at, "access token expired");
        self.do_refresh().await
    }

    async fn authorized_send<F>(
        &self,
        operation: &str,
        build: &F,
    ) -> Result<reqwest::Response, Error>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let token = {
            let creds = self.credentials.read().await;
            match creds.as_ref() {
                Some(c) => c.access_token.clone(),
                None => {
                    return Err(Error::Authentication { reason: "not authenticated".to_owned() })
                }
            }
        };
        tracing::debug!(operation, "sending authorized request");
        // Lowercase "bearer" for wire compatibility with the provider.
        let resp =
            build(&self.http).header(AUTHORIZATION, format!("bearer {token}")).send().await?;
        Ok(resp)
    }

    async fn into_result(
        &self,
        operation: &str,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let user = self.user().await;
        tracing::warn!(user = %user, operation, status = %status, body = %body, "request failed");
        Err(Error::Request { operation: operation.to_owned(), status: status.as_u16(), body })
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
