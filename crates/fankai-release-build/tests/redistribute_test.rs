//! Integration tests for artifact redistribution
//!
//! Exercises the platform classification, the copy-not-move merge, the
//! Linux image mirroring, idempotency, and the warn-and-skip handling of
//! unrecognized artifact directories.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fankai_release_build::ArtifactRedistributor;
use fankai_release_core::Platform;
use tempfile::TempDir;
use walkdir::WalkDir;

fn create_dirs() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let deploy = temp.path().join("deploy");
    let staging = temp.path().join("staging");
    fs::create_dir_all(&deploy).unwrap();
    fs::create_dir_all(&staging).unwrap();
    (temp, deploy, staging)
}

fn stage_artifact(staging: &Path, dir_name: &str, files: &[(&str, &[u8])]) {
    let dir = staging.join(dir_name);
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

/// Snapshot of a directory tree: relative path -> file contents
fn tree_snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut snapshot = BTreeMap::new();
    for entry in WalkDir::new(root) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            snapshot.insert(relative, fs::read(entry.path()).unwrap());
        }
    }
    snapshot
}

#[test]
fn artifacts_route_to_their_canonical_directories() {
    let (_temp, deploy, staging) = create_dirs();

    stage_artifact(&staging, "Fankai-ubicloud", &[("Fankai", b"linux-x64")]);
    stage_artifact(
        &staging,
        "Fankai-ubicloud-standard-2-arm",
        &[("Fankai", b"linux-arm64")],
    );
    stage_artifact(&staging, "Fankai-windows-latest", &[("Fankai.exe", b"windows")]);

    let redistributor = ArtifactRedistributor::new(deploy.clone(), "Fankai");
    let report = redistributor.redistribute(&staging).unwrap();

    assert_eq!(report.merged.len(), 3);
    assert!(report.skipped.is_empty());

    assert_eq!(fs::read(deploy.join("setup_linux/Fankai")).unwrap(), b"linux-x64");
    assert_eq!(
        fs::read(deploy.join("setup_linux_arm/Fankai")).unwrap(),
        b"linux-arm64"
    );
    assert_eq!(fs::read(deploy.join("setup/Fankai.exe")).unwrap(), b"windows");

    // The two Linux variants' primary executables are mirrored for the
    // image pipeline; Windows is not.
    assert_eq!(fs::read(deploy.join("docker/x86/Fankai")).unwrap(), b"linux-x64");
    assert_eq!(fs::read(deploy.join("docker/arm/Fankai")).unwrap(), b"linux-arm64");
    let mirror_dirs = fs::read_dir(deploy.join("docker")).unwrap().count();
    assert_eq!(mirror_dirs, 2);

    // Consumed staging directories are removed.
    assert!(!staging.join("Fankai-ubicloud").exists());
    assert!(!staging.join("Fankai-windows-latest").exists());
}

#[test]
fn linux_arm_never_matches_the_generic_linux_rule() {
    let (_temp, deploy, staging) = create_dirs();

    stage_artifact(
        &staging,
        "Fankai-Sync-ubicloud-standard-2-arm",
        &[("Fankai-Sync", b"arm build")],
    );

    let redistributor = ArtifactRedistributor::new(deploy.clone(), "Fankai");
    let report = redistributor.redistribute(&staging).unwrap();

    assert_eq!(report.merged, vec![(
        "Fankai-Sync-ubicloud-standard-2-arm".to_string(),
        Platform::LinuxArm64,
    )]);
    assert!(deploy.join("setup_linux_arm/Fankai-Sync").is_file());
    assert!(!deploy.join("setup_linux").exists());
}

#[test]
fn unknown_directories_are_skipped_not_fatal() {
    let (_temp, deploy, staging) = create_dirs();

    stage_artifact(&staging, "Fankai-freebsd", &[("Fankai", b"who knows")]);
    stage_artifact(&staging, "Fankai-macos-13", &[("Fankai", b"intel mac")]);

    let redistributor = ArtifactRedistributor::new(deploy.clone(), "Fankai");
    let report = redistributor.redistribute(&staging).unwrap();

    assert_eq!(report.skipped, vec!["Fankai-freebsd".to_string()]);
    assert_eq!(report.merged.len(), 1);
    assert!(deploy.join("setup_macos/Fankai").is_file());

    // Skipped directories stay in place for inspection.
    assert!(staging.join("Fankai-freebsd/Fankai").is_file());
}

#[test]
fn redistribution_is_idempotent() {
    let (_temp, deploy, staging) = create_dirs();

    let stage_all = |staging: &Path| {
        stage_artifact(staging, "Fankai-ubicloud", &[("Fankai", b"bin"), ("data.json", b"{}")]);
        stage_artifact(staging, "Fankai-macos-latest", &[("Fankai", b"arm mac")]);
        stage_artifact(staging, "Fankai-windows-latest", &[("Fankai.exe", b"win")]);
    };

    let redistributor = ArtifactRedistributor::new(deploy.clone(), "Fankai");

    stage_all(&staging);
    redistributor.redistribute(&staging).unwrap();
    let first = tree_snapshot(&deploy);

    // Re-stage identical inputs and run again: the deploy tree must be
    // byte-identical after the second run.
    stage_all(&staging);
    redistributor.redistribute(&staging).unwrap();
    let second = tree_snapshot(&deploy);

    assert_eq!(first, second);
}

#[test]
fn merge_overwrites_prior_contents() {
    let (_temp, deploy, staging) = create_dirs();
    fs::create_dir_all(deploy.join("setup_linux")).unwrap();
    fs::write(deploy.join("setup_linux/Fankai"), b"old release").unwrap();

    stage_artifact(&staging, "Fankai-ubicloud", &[("Fankai", b"new release")]);

    let redistributor = ArtifactRedistributor::new(deploy.clone(), "Fankai");
    redistributor.redistribute(&staging).unwrap();

    assert_eq!(fs::read(deploy.join("setup_linux/Fankai")).unwrap(), b"new release");
}

#[test]
fn mirror_is_omitted_when_primary_executable_is_absent() {
    let (_temp, deploy, staging) = create_dirs();

    // A secondary tool's artifact: no primary executable inside.
    stage_artifact(&staging, "Fankai-Sync-ubicloud", &[("Fankai-Sync", b"sync bin")]);

    let redistributor = ArtifactRedistributor::new(deploy.clone(), "Fankai");
    let report = redistributor.redistribute(&staging).unwrap();

    assert_eq!(report.merged.len(), 1);
    assert!(report.mirrored.is_empty());
    assert!(deploy.join("setup_linux/Fankai-Sync").is_file());
    assert!(!deploy.join("docker/x86").exists());
}
