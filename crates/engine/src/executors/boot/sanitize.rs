// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource-id sanitization rules for the boot-scoped protocol's INI
//! section names, and the path-suffix validation applied at enqueue time.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("the root mount ('/') cannot be created or deleted")]
    RootMountDisallowed,
    #[error("path suffix must not be empty")]
    EmptyPathSuffix,
    #[error("path suffix must not start with '/'")]
    LeadingSlash,
    #[error("path suffix must not be '.' or contain a '..' segment")]
    DotSegment,
    #[error("path suffix contains disallowed character '{0}'")]
    InvalidChar(char),
}

/// Disk ids are used verbatim as the section name — they are already a
/// stable device identifier (e.g. `usb-VENDOR_MODEL_SERIAL`).
pub fn sanitize_disk_id(id: &str) -> String {
    id.to_string()
}

/// Drops the mount path's leading `/`, replaces remaining `/` with `_`, and
/// prepends `mnt_`. The bare root mount is rejected outright.
pub fn sanitize_mount_id(mount_path: &str) -> Result<String, SanitizeError> {
    if mount_path == "/" {
        return Err(SanitizeError::RootMountDisallowed);
    }
    let trimmed = mount_path.strip_prefix('/').unwrap_or(mount_path);
    Ok(format!("mnt_{}", trimmed.replace('/', "_")))
}

/// Rejects empty suffixes, a leading `/`, exactly `.`/`..`, any `..`
/// path segment, and any character outside `[A-Za-z0-9_\-/]`.
pub fn validate_path_suffix(suffix: &str) -> Result<(), SanitizeError> {
    if suffix.is_empty() {
        return Err(SanitizeError::EmptyPathSuffix);
    }
    if suffix.starts_with('/') {
        return Err(SanitizeError::LeadingSlash);
    }
    if suffix == "." || suffix == ".." || suffix.split('/').any(|seg| seg == "..") {
        return Err(SanitizeError::DotSegment);
    }
    for c in suffix.chars() {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '/') {
            return Err(SanitizeError::InvalidChar(c));
        }
    }
    Ok(())
}

/// `path_<mount-id>_<path-suffix>`, with every character outside
/// `[A-Za-z0-9_]` replaced by `_`.
pub fn sanitize_path_id(mount_id: &str, path_suffix: &str) -> String {
    let raw = format!("path_{mount_id}_{path_suffix}");
    raw.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_id_is_unchanged() {
        assert_eq!(sanitize_disk_id("usb-VENDOR_MODEL_SERIAL"), "usb-VENDOR_MODEL_SERIAL");
    }

    #[test]
    fn mount_id_strips_leading_slash_and_replaces_remaining() {
        assert_eq!(sanitize_mount_id("/data/archive").unwrap(), "mnt_data_archive");
    }

    #[test]
    fn mount_id_rejects_bare_root() {
        assert_eq!(sanitize_mount_id("/").unwrap_err(), SanitizeError::RootMountDisallowed);
    }

    #[test]
    fn path_suffix_rejects_empty_leading_slash_and_dot_segments() {
        assert_eq!(validate_path_suffix("").unwrap_err(), SanitizeError::EmptyPathSuffix);
        assert_eq!(validate_path_suffix("/etc").unwrap_err(), SanitizeError::LeadingSlash);
        assert_eq!(validate_path_suffix("..").unwrap_err(), SanitizeError::DotSegment);
        assert_eq!(validate_path_suffix("a/../b").unwrap_err(), SanitizeError::DotSegment);
    }

    #[test]
    fn path_suffix_rejects_disallowed_characters() {
        assert_eq!(validate_path_suffix("logs/app!.log").unwrap_err(), SanitizeError::InvalidChar('!'));
    }

    #[test]
    fn path_suffix_accepts_nested_segments() {
        assert!(validate_path_suffix("logs/app-1_2/today").is_ok());
    }

    #[test]
    fn path_id_replaces_slashes_and_dots() {
        assert_eq!(sanitize_path_id("mnt_data", "logs/app.log"), "path_mnt_data_logs_app_log");
    }

    proptest::proptest! {
        #[test]
        fn path_id_is_always_a_valid_ini_section_name(
            mount_id in "[a-z_]{1,12}",
            suffix in "[A-Za-z0-9_/.-]{1,24}",
        ) {
            let id = sanitize_path_id(&mount_id, &suffix);
            proptest::prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            proptest::prop_assert!(id.starts_with("path_"));
        }
    }
}
