//! Plugin directory scanning.
//!
//! Artifacts inside a top-level directory belong to the unit named after
//! that directory. Loose artifacts in the root form one unit each, keyed by
//! the file stem with any trailing `-<version>` removed, so
//! `http-transport-1.2.0.jar` and `http-transport-1.3.0.so` share the
//! `http-transport` unit.

use super::domain::{PluginError, PluginResult};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::debug;

/// File extensions recognized as plugin artifacts.
pub const ACCEPTED_EXTENSIONS: [&str; 7] = ["so", "dylib", "dll", "jar", "zip", "wasm", "class"];

/// A group of artifacts deployed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginUnit {
    key: String,
    artifacts: Vec<Utf8PathBuf>,
    lib_dir: Option<Utf8PathBuf>,
    fingerprint: String,
}

impl PluginUnit {
    /// Creates a unit compiled into the host rather than scanned from disk.
    #[must_use]
    pub fn builtin(key: impl Into<String>) -> Self {
        let unit_key = key.into();
        let fingerprint = fingerprint(&unit_key, &[]);
        Self {
            key: unit_key,
            artifacts: Vec::new(),
            lib_dir: None,
            fingerprint,
        }
    }

    /// Returns the grouping key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the artifact paths, sorted.
    #[must_use]
    pub fn artifacts(&self) -> &[Utf8PathBuf] {
        &self.artifacts
    }

    /// Returns the shared library directory paired with the unit.
    #[must_use]
    pub fn lib_dir(&self) -> Option<&Utf8Path> {
        self.lib_dir.as_deref()
    }

    /// Returns the SHA-256 fingerprint of the unit's artifact names and sizes.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Scanner turning a plugin directory into [`PluginUnit`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginCatalog;

impl PluginCatalog {
    /// Scans `root` and groups its artifacts into units sorted by key.
    ///
    /// When `lib_dir` lies directly inside `root` it is not treated as a
    /// unit of its own.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Scan`] when a directory or entry cannot be read.
    pub fn scan(root: &Utf8Path, lib_dir: Option<&Utf8Path>) -> PluginResult<Vec<PluginUnit>> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| PluginError::scan(root, err))?;
        let mut groups: BTreeMap<String, Vec<(Utf8PathBuf, u64)>> = BTreeMap::new();
        let excluded = lib_dir.and_then(|lib| lib.strip_prefix(root).ok());
        collect(&dir, root, Utf8Path::new(""), None, excluded, &mut groups)?;

        let units: Vec<PluginUnit> = groups
            .into_iter()
            .map(|(key, mut entries)| {
                entries.sort();
                let fingerprint = fingerprint(&key, &entries);
                PluginUnit {
                    key,
                    artifacts: entries.into_iter().map(|(path, _)| path).collect(),
                    lib_dir: lib_dir.map(Utf8Path::to_path_buf),
                    fingerprint,
                }
            })
            .collect();
        debug!(root = %root, units = units.len(), "scanned plugin directory");
        Ok(units)
    }
}

fn collect(
    dir: &Dir,
    root: &Utf8Path,
    relative: &Utf8Path,
    top: Option<&str>,
    excluded: Option<&Utf8Path>,
    groups: &mut BTreeMap<String, Vec<(Utf8PathBuf, u64)>>,
) -> PluginResult<()> {
    let location = root.join(relative);
    let entries = dir
        .entries()
        .map_err(|err| PluginError::scan(location.clone(), err))?;

    for item in entries {
        let entry = item.map_err(|err| PluginError::scan(location.clone(), err))?;
        let name = entry
            .file_name()
            .map_err(|err| PluginError::scan(location.clone(), err))?;
        let path = relative.join(&name);
        let file_type = entry
            .file_type()
            .map_err(|err| PluginError::scan(root.join(&path), err))?;

        if file_type.is_dir() {
            if excluded == Some(path.as_path()) {
                continue;
            }
            let child = entry
                .open_dir()
                .map_err(|err| PluginError::scan(root.join(&path), err))?;
            collect(&child, root, &path, Some(top.unwrap_or(&name)), excluded, groups)?;
            continue;
        }

        if !is_artifact(&path) {
            continue;
        }
        let size = entry
            .metadata()
            .map_err(|err| PluginError::scan(root.join(&path), err))?
            .len();
        let key = match top {
            Some(directory) => directory.to_owned(),
            None => unit_key_for_file(&path),
        };
        groups.entry(key).or_default().push((root.join(&path), size));
    }
    Ok(())
}

fn is_artifact(path: &Utf8Path) -> bool {
    path.extension().is_some_and(|extension| {
        ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| extension.eq_ignore_ascii_case(accepted))
    })
}

fn unit_key_for_file(path: &Utf8Path) -> String {
    let stem = path.file_stem().unwrap_or_default();
    match stem.rsplit_once('-') {
        Some((base, version))
            if !base.is_empty() && version.starts_with(|c: char| c.is_ascii_digit()) =>
        {
            base.to_owned()
        }
        _ => stem.to_owned(),
    }
}

fn fingerprint(key: &str, entries: &[(Utf8PathBuf, u64)]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    for (path, size) in entries {
        hasher.update(path.file_name().unwrap_or_default().as_bytes());
        hasher.update(size.to_string().as_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
