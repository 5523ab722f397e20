// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn creds(expires_at: u64) -> OAuthCredentials {
    OAuthCredentials {
        access_token: "AT1".to_owned(),
        refresh_token: "RT1".to_owned(),
        expires_at,
    }
}

#[test]
fn token_is_live_through_the_grace_period() {
    let c = creds(4600);
    // Grace period: the token stays usable for 60s past nominal expiry.
    assert!(!c.is_expired(4600));
    assert!(!c.is_expired(4659));
    assert!(c.is_expired(4660));
    assert!(c.is_expired(4661));
}

#[test]
fn expiry_arithmetic_from_issue_time() {
    // A grant issued at t=1000 with expires_in=3600 expires at 4600.
    let issued_at = 1000u64;
    let expires_in = 3600u64;
    let c = creds(issued_at + expires_in);
    assert_eq!(c.expires_at, 4600);
    assert!(!c.is_expired(4659));
    assert!(c.is_expired(4661));
}

#[test]
fn huge_expiry_saturates_instead_of_wrapping() {
    // A garbage expires_in can push expires_at to the top of the range;
    // the grace addition must not wrap the token into "always expired".
    let c = creds(u64::MAX - 10);
    assert!(!c.is_expired(4600));
    assert!(!c.is_expired(u64::MAX - 1));
    assert!(c.is_expired(u64::MAX));
}

#[test]
fn saved_credentials_round_trip() -> anyhow::Result<()> {
    let saved = SavedCredentials {
        access_token: "AT1".to_owned(),
        refresh_token: "RT1".to_owned(),
        expires_at: 4600,
    };
    let json = serde_json::to_string(&saved)?;
    let back: SavedCredentials = serde_json::from_str(&json)?;
    assert_eq!(back, saved);

    // Conversions replace the whole value in both directions.
    let live: OAuthCredentials = back.into();
    assert_eq!(live, creds(4600));
    assert_eq!(SavedCredentials::from(&live), saved);
    Ok(())
}
