// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Swarmspawn: delegated OAuth2 identity and per-user compute provisioning
//! for multi-tenant notebook hubs.
//!
//! The host platform hands a [`Session`] an OAuth authorization code and
//! gets back an authenticated identity; it can then ask the session to
//! provision a named swarm cluster, which is polled until its credentials
//! become downloadable and materialized as a local trust bundle.
//!
//! Container lifecycle, TLS client construction against the provisioned
//! endpoint, and login-URL plumbing all stay with the host. The crate uses
//! `reqwest` built without a default crypto provider; embedding hosts must
//! install one process-wide, e.g.
//! `rustls::crypto::ring::default_provider().install_default()`.

pub mod config;
pub mod credential;
pub mod error;
pub mod provision;
pub mod session;

pub use config::ProviderConfig;
pub use credential::{OAuthCredentials, SavedCredentials, EXPIRY_GRACE_SECS};
pub use error::Error;
pub use provision::{Phase, PollPolicy};
pub use session::{ClusterProvisioner, CredentialProvider, Session};
