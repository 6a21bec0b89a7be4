// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{ffi::OsStr, fs, io, path::Path};

use faccess::PathExt as _;
use thiserror::Error;

pub use dirsel_core::fs::{DirEntry, DirPath, OwnedDirPath, is_plain_dir_name};

/// Properties of a path that decide how the chooser may use it.
///
/// Probing never fails. Paths that don't exist or are inaccessible
/// simply end up without any of the positive properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirPathValidity {
    is_dir: bool,
    readable: bool,
    writable: bool,
}

impl DirPathValidity {
    #[must_use]
    pub fn probe(path: &Path) -> Self {
        // Symlinks are followed, i.e. a symlink to a directory is
        // considered a directory.
        match path.metadata() {
            Ok(metadata) if metadata.is_dir() => {
                let readable = fs::read_dir(path).is_ok();
                // Effective access of the current process, not mode
                // bits. Mode bits misjudge directories owned by other
                // users and processes with elevated privileges.
                let writable = path.writable();
                Self {
                    is_dir: true,
                    readable,
                    writable,
                }
            }
            _ => Self {
                is_dir: false,
                readable: false,
                writable: false,
            },
        }
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.is_dir
    }

    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.is_dir && self.readable
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.is_dir && self.writable
    }

    /// Whether the path qualifies as a final selection.
    ///
    /// Write access is waived if `allow_read_only` is set. Read access
    /// is always required, otherwise the contents could not even be
    /// displayed.
    #[must_use]
    pub const fn is_selectable(&self, allow_read_only: bool) -> bool {
        self.is_dir && self.readable && (self.writable || allow_read_only)
    }
}

/// Failed to enumerate the contents of a directory.
#[derive(Debug, Error)]
#[error("failed to list directory {}: {source}", .dir_path.display())]
pub struct ListDirError {
    dir_path: OwnedDirPath,
    source: io::Error,
}

impl ListDirError {
    fn new(dir_path: &Path, source: io::Error) -> Self {
        Self {
            dir_path: DirPath::from_owned(dir_path.to_path_buf()),
            source,
        }
    }

    #[must_use]
    pub fn dir_path(&self) -> DirPath<'_> {
        self.dir_path.borrowed()
    }

    #[must_use]
    pub const fn source(&self) -> &io::Error {
        &self.source
    }
}

/// Lists the immediate subdirectories of a directory.
///
/// Files and other entries that do not resolve to directories are
/// excluded, including symlinks to non-directories. The returned
/// entries are sorted by their name in byte/codepoint order,
/// independent of the enumeration order of the underlying storage
/// and of any locale.
pub fn list_subdirs(dir_path: &Path) -> Result<Vec<DirEntry>, ListDirError> {
    let read_dir = fs::read_dir(dir_path).map_err(|source| ListDirError::new(dir_path, source))?;
    let mut subdirs = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry.map_err(|source| ListDirError::new(dir_path, source))?;
        match dir_entry.path().metadata() {
            Ok(metadata) => {
                if metadata.is_dir() {
                    subdirs.push(DirEntry::new(dir_path, dir_entry.file_name()));
                }
            }
            Err(err) => {
                // The entry might have vanished after enumerating it.
                log::debug!(
                    "Skipping directory entry {path}: {err}",
                    path = dir_entry.path().display()
                );
            }
        }
    }
    subdirs.sort_unstable();
    Ok(subdirs)
}

/// Outcome of creating a new subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateSubdirOutcome {
    Created,
    AlreadyExists,
    NoWriteAccess,
    Failed { error: String },
}

/// Creates a single, new subdirectory within a parent directory.
///
/// The preconditions are checked in a fixed order: a parent directory
/// that is not writable takes precedence over an already existing
/// target. The actual creation is non-recursive, missing ancestors
/// are never created implicitly.
#[must_use]
pub fn create_subdir(parent_path: &Path, name: &OsStr) -> CreateSubdirOutcome {
    if !is_plain_dir_name(name) {
        return CreateSubdirOutcome::Failed {
            error: format!(
                "not a plain directory name: \"{name}\"",
                name = name.to_string_lossy()
            ),
        };
    }
    if !DirPathValidity::probe(parent_path).is_writable() {
        return CreateSubdirOutcome::NoWriteAccess;
    }
    let new_dir_path = parent_path.join(name);
    if new_dir_path.exists() {
        return CreateSubdirOutcome::AlreadyExists;
    }
    match fs::create_dir(&new_dir_path) {
        Ok(()) => CreateSubdirOutcome::Created,
        Err(err) => {
            log::warn!(
                "Failed to create directory {path}: {err}",
                path = new_dir_path.display()
            );
            CreateSubdirOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}
