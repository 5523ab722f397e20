// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use super::*;

fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        for (name, contents) in entries {
            writer.start_file(*name, zip::write::SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    buf
}

fn trust_bundle() -> Vec<u8> {
    archive(&[
        ("cert.pem", "---cert---"),
        ("key.pem", "---key---"),
        ("ca.pem", "---ca---"),
        ("docker.env", "DOCKER_HOST=tcp://172.99.73.10:2376\n"),
    ])
}

#[test]
fn extracts_all_entries_and_writes_ready_marker() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let dest = tmp.path().join("alice").join("jupyterhub");

    extract_bundle(&trust_bundle(), &dest)?;

    assert!(is_materialized(&dest));
    for name in ["cert.pem", "key.pem", "ca.pem", "docker.env"] {
        assert!(dest.join(name).is_file(), "missing {name}");
    }
    let env = std::fs::read_to_string(dest.join("docker.env"))?;
    assert!(env.contains("DOCKER_HOST=tcp://172.99.73.10:2376"));
    Ok(())
}

#[test]
fn malformed_archive_fails_and_leaves_no_destination() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let dest = tmp.path().join("alice").join("jupyterhub");

    let err = extract_bundle(b"this is not a zip", &dest).unwrap_err();
    assert!(matches!(err, crate::error::Error::Extraction { .. }), "got {err:?}");
    assert!(!dest.exists());

    // Staging directories are cleaned up on failure.
    let leftovers: Vec<_> = std::fs::read_dir(tmp.path().join("alice"))?.collect();
    assert!(leftovers.is_empty(), "staging left behind: {leftovers:?}");
    Ok(())
}

#[test]
fn stale_partial_bundle_is_replaced() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let dest = tmp.path().join("alice").join("jupyterhub");

    // A directory without the ready marker is a half-written leftover.
    std::fs::create_dir_all(&dest)?;
    std::fs::write(dest.join("cert.pem"), "truncated")?;
    assert!(!is_materialized(&dest));

    extract_bundle(&trust_bundle(), &dest)?;

    assert!(is_materialized(&dest));
    assert_eq!(std::fs::read_to_string(dest.join("cert.pem"))?, "---cert---");
    Ok(())
}

#[test]
fn marker_requires_a_file() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let dest = tmp.path().join("bundle");
    assert!(!is_materialized(&dest));
    std::fs::create_dir_all(&dest)?;
    assert!(!is_materialized(&dest));
    std::fs::write(dest.join(READY_MARKER), b"")?;
    assert!(is_materialized(&dest));
    Ok(())
}
