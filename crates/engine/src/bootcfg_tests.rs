// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn write_section_then_contains_in_pending_file() {
    let dir = tempdir().unwrap();
    let pending = PendingIni::new(ResourceKind::Disk, dir.path());
    pending
        .write_section("usb-VENDOR_MODEL_SERIAL", &[("luks".to_string(), "true".to_string())])
        .unwrap();

    let path = ResourceKind::Disk.pending_path(dir.path());
    let loaded = Ini::load_from_file(&path).unwrap();
    let section = loaded.section(Some("usb-VENDOR_MODEL_SERIAL")).unwrap();
    assert_eq!(section.get("luks"), Some("true"));

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[test]
fn write_removal_creates_bang_prefixed_section() {
    let dir = tempdir().unwrap();
    let pending = PendingIni::new(ResourceKind::Mount, dir.path());
    pending.write_removal("mnt_data").unwrap();

    let path = ResourceKind::Mount.pending_path(dir.path());
    let loaded = Ini::load_from_file(&path).unwrap();
    assert!(loaded.section(Some("!mnt_data")).is_some());
}

#[test]
fn write_section_overwrites_previous_contents() {
    let dir = tempdir().unwrap();
    let pending = PendingIni::new(ResourceKind::Disk, dir.path());
    pending.write_section("usb-X", &[("a".to_string(), "1".to_string())]).unwrap();
    pending.write_section("usb-X", &[("b".to_string(), "2".to_string())]).unwrap();

    let path = ResourceKind::Disk.pending_path(dir.path());
    let loaded = Ini::load_from_file(&path).unwrap();
    let section = loaded.section(Some("usb-X")).unwrap();
    assert_eq!(section.get("a"), None);
    assert_eq!(section.get("b"), Some("2"));
}

#[test]
fn active_ini_missing_file_behaves_as_empty() {
    let dir = tempdir().unwrap();
    let active = ActiveIni::load(ResourceKind::Disk, dir.path()).unwrap();
    assert!(!active.contains("usb-X"));
    assert!(active.lookup("usb-X").is_none());
}

#[test]
fn active_ini_lookup_exposes_status_message_and_request_id() {
    let dir = tempdir().unwrap();
    let path = ResourceKind::Disk.active_path(dir.path());
    let mut ini = Ini::new();
    ini.with_section(Some("usb-X"))
        .set("status", "error")
        .set("message", "format failed")
        .set("request_id", "job-abc");
    ini.write_to_file(&path).unwrap();

    let active = ActiveIni::load(ResourceKind::Disk, dir.path()).unwrap();
    let section = active.lookup("usb-X").unwrap();
    assert_eq!(section.status(), Some("error"));
    assert_eq!(section.message(), Some("format failed"));
    assert_eq!(section.request_id(), Some("job-abc"));
}

#[test]
fn active_ini_entries_iterates_every_section() {
    let dir = tempdir().unwrap();
    let path = ResourceKind::Mount.active_path(dir.path());
    let mut ini = Ini::new();
    ini.with_section(Some("mnt_a")).set("status", "ok");
    ini.with_section(Some("mnt_b")).set("status", "ok");
    ini.write_to_file(&path).unwrap();

    let active = ActiveIni::load(ResourceKind::Mount, dir.path()).unwrap();
    let names: Vec<&str> = active.entries().map(|(name, _)| name).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"mnt_a"));
    assert!(names.contains(&"mnt_b"));
}
