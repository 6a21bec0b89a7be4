// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    ops::Deref,
    path::{Component, Path, PathBuf},
};

/// A `Cow<'_, Path>` with more restrictive/sensitive `PartialEq`/`Eq` semantics.
///
/// Distinguishes paths with/-out trailing slashes.
#[derive(Debug, Clone, Default)]
#[repr(transparent)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct DirPath<'p>(Cow<'p, Path>);

pub type OwnedDirPath = DirPath<'static>;

impl<'p> DirPath<'p> {
    #[must_use]
    pub const fn new(inner: Cow<'p, Path>) -> Self {
        Self(inner)
    }

    #[must_use]
    pub const fn from_borrowed(path: &'p Path) -> Self {
        Self(Cow::Borrowed(path))
    }

    #[must_use]
    pub const fn from_owned(path_buf: PathBuf) -> OwnedDirPath {
        DirPath(Cow::Owned(path_buf))
    }

    #[must_use]
    pub fn borrowed(&self) -> DirPath<'_> {
        let Self(inner) = self;
        DirPath::from_borrowed(inner)
    }

    #[must_use]
    pub fn into_owned(self) -> OwnedDirPath {
        let Self(inner) = self;
        DirPath(Cow::Owned(inner.into_owned()))
    }
}

impl AsRef<Path> for DirPath<'_> {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for OwnedDirPath {
    fn from(from: PathBuf) -> Self {
        Self::from_owned(from)
    }
}

impl From<OwnedDirPath> for PathBuf {
    fn from(from: OwnedDirPath) -> Self {
        let DirPath(inner) = from;
        inner.into_owned()
    }
}

impl<'p> From<&'p Path> for DirPath<'p> {
    fn from(from: &'p Path) -> Self {
        Self::from_borrowed(from)
    }
}

impl PartialEq for DirPath<'_> {
    // Using Path::as_os_str() is required to handle trailing slashes consistently!
    // https://www.reddit.com/r/rust/comments/ooh5wn/damn_trailing_slash/
    fn eq(&self, other: &Self) -> bool {
        self.as_os_str().eq(other.as_os_str())
    }
}

impl Eq for DirPath<'_> {}

impl Deref for DirPath<'_> {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One immediate subdirectory of a listed directory.
///
/// Immutable once produced. Listings are regenerated wholesale, entries are
/// never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    // Field order matters for the derived ordering: entries are ordered by
    // their file name in byte/codepoint order, independent of any locale.
    name: OsString,
    path: PathBuf,
}

impl DirEntry {
    #[must_use]
    pub fn new(parent_path: &Path, name: OsString) -> Self {
        let path = parent_path.join(&name);
        Self { name, path }
    }

    /// File name of the subdirectory, without any parent components.
    #[must_use]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Absolute path, i.e. the listed directory joined with the name.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lossy UTF-8 rendition of the name for display purposes.
    #[must_use]
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }
}

/// Checks that a name denotes a plain, single path component.
///
/// Only such names are acceptable for creating a subdirectory. Rejects
/// empty names, `.`/`..`, and anything that spans multiple components.
#[must_use]
pub fn is_plain_dir_name(name: &OsStr) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

#[cfg(test)]
mod tests;
