// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the provider's OAuth and identity endpoints.

use serde::{Deserialize, Serialize};

/// Standard OAuth2 token response.
///
/// The provider always issues a refresh token alongside the access token,
/// for both the authorization-code and refresh-token grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// User profile returned by the identity endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub username: String,
}
