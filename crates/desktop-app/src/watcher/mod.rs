// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    fmt,
    path::{Path, PathBuf},
};

use notify::{
    EventKind, RecommendedWatcher, RecursiveMode, Watcher as _,
    event::{CreateKind, ModifyKind, RemoveKind},
};
use tokio::sync::mpsc;

/// Receives a signal for each burst of changes in the watched directory.
pub type ChangedSignalReceiver = mpsc::Receiver<()>;

/// Watches a single directory for changes of its direct children.
///
/// Only events that could change the set of child entries are reported,
/// i.e. creating, removing, and renaming. Signals are coalesced into a
/// bounded channel, at most one signal is pending at any time and no
/// signal is ever lost.
pub struct DirWatcher {
    watcher: RecommendedWatcher,
    bound_dir_path: Option<PathBuf>,
}

impl DirWatcher {
    /// Creates an unbound watcher and the receiving end of its signals.
    pub fn new() -> notify::Result<(Self, ChangedSignalReceiver)> {
        let (changed_signal_tx, changed_signal_rx) = mpsc::channel(1);
        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    log::warn!("Directory watch error: {err}");
                    return;
                }
            };
            if !changes_dir_entries(&event.kind) {
                return;
            }
            match changed_signal_tx.try_send(()) {
                Ok(()) => (),
                Err(mpsc::error::TrySendError::Full(())) => {
                    // A signal is already pending and will also account
                    // for this change.
                }
                Err(mpsc::error::TrySendError::Closed(())) => {
                    log::debug!("No receiver for directory change signal");
                }
            }
        })?;
        let watcher = Self {
            watcher,
            bound_dir_path: None,
        };
        Ok((watcher, changed_signal_rx))
    }

    /// Moves the single, live binding to another directory.
    ///
    /// The previous directory is released before watching the new one,
    /// at most one binding stays alive. Passing `None` only releases
    /// the current binding. Rebinding to the already bound directory
    /// is a no-op.
    ///
    /// Failures are logged and otherwise ignored. The affected
    /// directory is then simply not watched and its display degrades
    /// to manual refreshing.
    pub fn rebind(&mut self, dir_path: Option<&Path>) {
        if self.bound_dir_path.as_deref() == dir_path {
            return;
        }
        if let Some(bound_dir_path) = self.bound_dir_path.take() {
            log::debug!(
                "Unwatching directory {dir_path}",
                dir_path = bound_dir_path.display()
            );
            if let Err(err) = self.watcher.unwatch(&bound_dir_path) {
                log::warn!(
                    "Failed to unwatch directory {dir_path}: {err}",
                    dir_path = bound_dir_path.display()
                );
            }
        }
        let Some(dir_path) = dir_path else {
            return;
        };
        match self.watcher.watch(dir_path, RecursiveMode::NonRecursive) {
            Ok(()) => {
                log::debug!(
                    "Watching directory {dir_path}",
                    dir_path = dir_path.display()
                );
                self.bound_dir_path = Some(dir_path.to_path_buf());
            }
            Err(err) => {
                log::warn!(
                    "Failed to watch directory {dir_path}: {err} - continuing without live \
                     refreshing",
                    dir_path = dir_path.display()
                );
            }
        }
    }

    #[must_use]
    pub fn bound_dir_path(&self) -> Option<&Path> {
        self.bound_dir_path.as_deref()
    }
}

impl fmt::Debug for DirWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirWatcher")
            .field("bound_dir_path", &self.bound_dir_path)
            .finish_non_exhaustive()
    }
}

/// Could an event of this kind change the set of direct child entries?
const fn changes_dir_entries(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(CreateKind::File) => {
            // Files are not displayed.
            false
        }
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_)) => true,
        EventKind::Remove(kind) => !matches!(kind, RemoveKind::File),
        EventKind::Access(_) | EventKind::Modify(_) | EventKind::Any | EventKind::Other => false,
    }
}

#[cfg(test)]
mod tests;
