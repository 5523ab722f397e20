// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::provision::Phase;

/// Errors surfaced to the host platform.
#[derive(Debug, Error)]
pub enum Error {
    /// A token grant failed, or no usable authorization material is present.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    /// The provider answered with a non-2xx status outside any retry rule.
    ///
    /// Carries the upstream status and body for operator diagnosis.
    #[error("{operation} returned {status}: {body}")]
    Request { operation: String, status: u16, body: String },

    /// A provisioning attempt failed; `phase` names the step that broke.
    #[error("provisioning failed during {phase}: {reason}")]
    Provisioning { phase: Phase, reason: String },

    /// The credential archive could not be unpacked to disk.
    #[error("credential bundle extraction failed: {reason}")]
    Extraction { reason: String },

    /// Connection-level failure: DNS, TLS, request timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
