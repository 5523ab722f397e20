// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth credential state for one user session.
//!
//! One [`client::OAuthClient`] owns one credential set at a time; the set is
//! always replaced wholesale, never field by field.

pub mod client;
pub mod oauth;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Seconds past nominal expiry during which an access token is still used.
///
/// The provider honors tokens briefly past their reported lifetime, so
/// expiry is only declared once `now >= expires_at + EXPIRY_GRACE_SECS`.
/// Note the polarity: this is a grace period, not a safety margin. A token
/// rides 60 seconds *beyond* `expires_at` before a proactive refresh.
pub const EXPIRY_GRACE_SECS: u64 = 60;

/// A set of OAuth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as epoch seconds: grant issue time plus the server-reported
    /// lifetime. Issue time is captured before the request goes out, so a
    /// slow exchange can only under-estimate the remaining lifetime.
    pub expires_at: u64,
}

impl OAuthCredentials {
    /// Whether the access token is expired at `now` (epoch seconds).
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at.saturating_add(EXPIRY_GRACE_SECS)
    }
}

/// Credential state exported for host persistence and restored on session
/// start. The persistence medium is the host's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCredentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as epoch seconds.
    pub expires_at: u64,
}

impl From<&OAuthCredentials> for SavedCredentials {
    fn from(creds: &OAuthCredentials) -> Self {
        Self {
            access_token: creds.access_token.clone(),
            refresh_token: creds.refresh_token.clone(),
            expires_at: creds.expires_at,
        }
    }
}

impl From<SavedCredentials> for OAuthCredentials {
    fn from(saved: SavedCredentials) -> Self {
        Self {
            access_token: saved.access_token,
            refresh_token: saved.refresh_token,
            expires_at: saved.expires_at,
        }
    }
}

/// Current time as epoch seconds.
pub(crate) fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
