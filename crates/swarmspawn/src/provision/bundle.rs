// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential bundle materialization: unpack the provider's zip archive
//! into a per-user directory, atomically.

use std::io::Cursor;
use std::path::Path;

use crate::error::Error;

/// Sentinel file written into a bundle directory after complete extraction.
///
/// Its presence is the re-entrancy signal for provisioning; bare directory
/// presence could be a partial bundle left by a crashed run.
pub const READY_MARKER: &str = ".swarmspawn-ready";

/// Whether a fully materialized bundle exists at `dest`.
pub fn is_materialized(dest: &Path) -> bool {
    dest.join(READY_MARKER).is_file()
}

/// Unpack a credential archive into `dest`, creating parents as needed.
///
/// Extraction goes to a staging directory next to `dest` and is renamed
/// into place only after the ready marker is written, so `dest` never
/// exists in a half-written state. The staging name carries PID + counter
/// so concurrent extractions cannot race on the same path.
pub fn extract_bundle(archive: &[u8], dest: &Path) -> Result<(), Error> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Extraction {
            reason: format!("failed to create {}: {e}", parent.display()),
        })?;
    }

    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let staging_name = format!(
        "{}.partial.{}.{}",
        dest.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let staging = dest.with_file_name(staging_name);

    if let Err(e) = unpack(archive, &staging) {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(e);
    }

    // A directory without the marker is stale state from an older run or a
    // crashed extraction; replace it.
    if dest.exists() && !is_materialized(dest) {
        tracing::warn!(path = %dest.display(), "removing stale credential bundle");
        let _ = std::fs::remove_dir_all(dest);
    }

    if let Err(e) = std::fs::rename(&staging, dest) {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(Error::Extraction {
            reason: format!("failed to move bundle into {}: {e}", dest.display()),
        });
    }
    Ok(())
}

fn unpack(archive: &[u8], staging: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(staging).map_err(|e| Error::Extraction {
        reason: format!("failed to create {}: {e}", staging.display()),
    })?;

    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).map_err(|e| Error::Extraction {
        reason: format!("malformed credential archive: {e}"),
    })?;
    zip.extract(staging).map_err(|e| Error::Extraction {
        reason: format!("failed to unpack credential archive: {e}"),
    })?;

    std::fs::write(staging.join(READY_MARKER), b"").map_err(|e| Error::Extraction {
        reason: format!("failed to write ready marker: {e}"),
    })
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;
