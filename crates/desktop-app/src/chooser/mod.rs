// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{ffi::OsString, future::Future};

use thiserror::Error;

use crate::{
    Observable, ObservableReader, ObservableRef,
    fs::{
        CreateSubdirOutcome, DirEntry, DirPath, DirPathValidity, ListDirError, OwnedDirPath,
        create_subdir, list_subdirs,
    },
};

pub mod tasklet;

/// Immutable configuration of the chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The directory that is displayed initially if no other directory
    /// has been proposed or if the proposed directory is not
    /// selectable.
    pub fallback_dir_path: OwnedDirPath,

    /// Accept directories without write access as the final selection.
    ///
    /// Browsing into read-only directories is always possible,
    /// independent of this setting.
    pub allow_read_only_selection: bool,
}

/// Whether changes of the displayed directory are watched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Watching {
    /// Live refreshing while the chooser is visible.
    #[default]
    Active,

    /// Watching is released while the chooser is invisible.
    Suspended,
}

/// The directory that is currently displayed, together with its
/// listed contents.
#[derive(Debug, Clone)]
pub struct DisplayedDir {
    dir_path: OwnedDirPath,
    entries: Vec<DirEntry>,
    can_confirm: bool,
    nav_seq: u64,
    refresh_seq: u64,
    watching: Watching,
}

impl DisplayedDir {
    #[must_use]
    pub fn dir_path(&self) -> DirPath<'_> {
        self.dir_path.borrowed()
    }

    #[must_use]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Whether the displayed directory qualifies as the final
    /// selection.
    #[must_use]
    pub const fn can_confirm(&self) -> bool {
        self.can_confirm
    }

    fn bump_nav_seq(&mut self) {
        self.nav_seq = self.nav_seq.wrapping_add(1);
    }

    fn bump_refresh_seq(&mut self) {
        self.refresh_seq = self.refresh_seq.wrapping_add(1);
    }
}

impl PartialEq for DisplayedDir {
    fn eq(&self, other: &Self) -> bool {
        let Self {
            dir_path,
            entries,
            can_confirm,
            // Pending-operation bookkeeping, not part of the
            // observable state.
            nav_seq: _,
            refresh_seq: _,
            watching,
        } = self;
        *dir_path == other.dir_path
            && *entries == other.entries
            && *can_confirm == other.can_confirm
            && *watching == other.watching
    }
}

impl Eq for DisplayedDir {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Initial,
    Displaying(DisplayedDir),
    Closed {
        /// The confirmed selection or `None` after cancelling.
        chosen_dir_path: Option<OwnedDirPath>,
    },
}

impl State {
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        matches!(self, Self::Initial)
    }

    #[must_use]
    pub const fn is_displaying(&self) -> bool {
        matches!(self, Self::Displaying(_))
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    #[must_use]
    pub const fn displayed_dir(&self) -> Option<&DisplayedDir> {
        match self {
            Self::Displaying(displayed_dir) => Some(displayed_dir),
            Self::Initial | Self::Closed { .. } => None,
        }
    }

    /// The directory that is currently displayed.
    #[must_use]
    pub fn dir_path(&self) -> Option<DirPath<'_>> {
        self.displayed_dir().map(DisplayedDir::dir_path)
    }

    /// The confirmed selection after closing.
    #[must_use]
    pub fn chosen_dir_path(&self) -> Option<DirPath<'_>> {
        match self {
            Self::Closed { chosen_dir_path } => chosen_dir_path.as_ref().map(DirPath::borrowed),
            Self::Initial | Self::Displaying(_) => None,
        }
    }

    /// The directory that should be watched for changes.
    #[must_use]
    pub fn watch_target(&self) -> Option<DirPath<'_>> {
        match self {
            Self::Displaying(DisplayedDir {
                dir_path,
                watching: Watching::Active,
                ..
            }) => Some(dir_path.borrowed()),
            Self::Initial | Self::Displaying(_) | Self::Closed { .. } => None,
        }
    }

    fn replace_displayed_dir(&mut self, listed_dir: ListedDir) -> bool {
        let ListedDir {
            dir_path,
            entries,
            can_confirm,
        } = listed_dir;
        match self {
            Self::Initial => {
                *self = Self::Displaying(DisplayedDir {
                    dir_path,
                    entries,
                    can_confirm,
                    nav_seq: 0,
                    refresh_seq: 0,
                    watching: Watching::default(),
                });
                true
            }
            Self::Displaying(displayed_dir) => {
                let new_displayed_dir = DisplayedDir {
                    dir_path,
                    entries,
                    can_confirm,
                    nav_seq: displayed_dir.nav_seq,
                    refresh_seq: displayed_dir.refresh_seq,
                    watching: displayed_dir.watching,
                };
                if *displayed_dir == new_displayed_dir {
                    // Unchanged, e.g. refreshed without any effect.
                    return false;
                }
                // The path and the entries are replaced together.
                // Observers never see the new path with stale entries
                // or vice versa.
                *displayed_dir = new_displayed_dir;
                true
            }
            Self::Closed { .. } => {
                log::debug!("Discarding listed directory after closing: {dir_path:?}");
                false
            }
        }
    }

    fn try_confirm(&mut self) -> bool {
        let Self::Displaying(displayed_dir) = self else {
            log::warn!("Illegal state for confirming: {self:?}");
            return false;
        };
        if !displayed_dir.can_confirm {
            log::warn!(
                "Rejecting confirmation of {dir_path}: not selectable",
                dir_path = displayed_dir.dir_path.display()
            );
            return false;
        }
        let chosen_dir_path = Some(std::mem::take(&mut displayed_dir.dir_path));
        *self = Self::Closed { chosen_dir_path };
        true
    }

    fn try_cancel(&mut self) -> bool {
        if self.is_closed() {
            // Closing is terminal.
            log::debug!("Already closed");
            return false;
        }
        *self = Self::Closed {
            chosen_dir_path: None,
        };
        true
    }

    fn set_watching(&mut self, watching: Watching) -> bool {
        let Self::Displaying(displayed_dir) = self else {
            log::debug!("Not displaying any directory, ignoring watch mode {watching:?}");
            return false;
        };
        if displayed_dir.watching == watching {
            return false;
        }
        displayed_dir.watching = watching;
        true
    }
}

pub type StateSubscriber = discro::Subscriber<State>;

pub type ObservableStateRef<'a> = ObservableRef<'a, State>;

/// The contents of a directory after listing it, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedDir {
    dir_path: OwnedDirPath,
    entries: Vec<DirEntry>,
    can_confirm: bool,
}

#[derive(Debug, Error)]
pub enum NavigateError {
    /// The target does not exist or is not a directory.
    ///
    /// Expected when racing against concurrent file system changes
    /// and handled silently.
    #[error("not a directory: {}", .0.display())]
    InvalidTarget(OwnedDirPath),

    #[error(transparent)]
    ListDir(#[from] ListDirError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type NavigateResult = Result<ListedDir, NavigateError>;

/// Identifies the state in which a listing operation was initiated.
///
/// A finished operation only takes effect if the state it was
/// initiated in is still current when joining, independent of the
/// order in which the operations finish:
/// - Of overlapping navigations only the most recently initiated one
///   can take effect, earlier results are discarded.
/// - The same holds among overlapping refreshes. Initiating a
///   navigation also outpaces all pending refreshes, while a pending
///   navigation survives intermediate refreshes of the directory it
///   was initiated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateTaskContinuation {
    initiated_in: InitiatedIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InitiatedIn {
    Initial,
    Navigating {
        dir_path: OwnedDirPath,
        nav_seq: u64,
    },
    Refreshing {
        dir_path: OwnedDirPath,
        nav_seq: u64,
        refresh_seq: u64,
    },
}

impl InitiatedIn {
    fn still_gates(&self, state: &State) -> bool {
        match (self, state) {
            (Self::Initial, State::Initial) => true,
            (Self::Navigating { dir_path, nav_seq }, State::Displaying(displayed_dir)) => {
                *nav_seq == displayed_dir.nav_seq && *dir_path == displayed_dir.dir_path
            }
            (
                Self::Refreshing {
                    dir_path,
                    nav_seq,
                    refresh_seq,
                },
                State::Displaying(displayed_dir),
            ) => {
                *nav_seq == displayed_dir.nav_seq
                    && *refresh_seq == displayed_dir.refresh_seq
                    && *dir_path == displayed_dir.dir_path
            }
            _ => false,
        }
    }
}

/// Effect of a joined navigation task on the observable state.
#[derive(Debug)]
pub enum NavigateTaskOutcome {
    /// The listed directory is now displayed.
    Applied,

    /// The result arrived too late and has been discarded.
    Discarded,

    /// The target was not a directory and the request has been
    /// ignored silently.
    Rejected,

    /// Listing failed and the previously displayed directory remains
    /// on display.
    Failed(NavigateError),
}

/// Manages the mutable, observable state
#[derive(Debug)]
pub struct ObservableState {
    observable: Observable<State>,
    config: Config,
}

impl ObservableState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            observable: Observable::new(Default::default()),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn read(&self) -> ObservableStateRef<'_> {
        self.observable.read()
    }

    #[must_use]
    pub fn subscribe_changed(&self) -> StateSubscriber {
        self.observable.subscribe_changed()
    }

    /// Starts displaying the initial directory.
    ///
    /// The proposed directory is displayed if it is selectable,
    /// otherwise the configured fallback directory. Returns `None`
    /// if the chooser has already been initialized.
    #[must_use]
    pub fn try_initialize_task(
        &self,
        proposed_dir_path: Option<OwnedDirPath>,
    ) -> Option<(
        impl Future<Output = NavigateResult> + Send + 'static,
        NavigateTaskContinuation,
    )> {
        {
            let state = self.read();
            if !state.is_initial() {
                log::warn!("Illegal state for initializing: {state:?}", state = *state);
                return None;
            }
        }
        let config = self.config.clone();
        let task = async move { resolve_and_list_initial_dir(config, proposed_dir_path).await };
        let continuation = NavigateTaskContinuation {
            initiated_in: InitiatedIn::Initial,
        };
        Some((task, continuation))
    }

    /// Starts displaying another directory.
    ///
    /// Only the existence of the target is required, i.e. read-only
    /// directories could still be entered for browsing into their
    /// subdirectories.
    #[must_use]
    pub fn try_navigate_task(
        &self,
        target_dir_path: OwnedDirPath,
    ) -> Option<(
        impl Future<Output = NavigateResult> + Send + 'static,
        NavigateTaskContinuation,
    )> {
        let mut initiated_in = None;
        self.observable.modify(|state| {
            let State::Displaying(displayed_dir) = state else {
                log::warn!("Illegal state for navigating: {state:?}");
                return false;
            };
            displayed_dir.bump_nav_seq();
            initiated_in = Some(InitiatedIn::Navigating {
                dir_path: displayed_dir.dir_path.clone(),
                nav_seq: displayed_dir.nav_seq,
            });
            // Bookkeeping only, the observable state is unchanged.
            false
        });
        let Some(initiated_in) = initiated_in else {
            return None;
        };
        let allow_read_only_selection = self.config.allow_read_only_selection;
        let task = async move { navigate_to_dir(target_dir_path, allow_read_only_selection).await };
        let continuation = NavigateTaskContinuation { initiated_in };
        Some((task, continuation))
    }

    /// Relists the contents of the displayed directory.
    ///
    /// Unlike navigating the existence of the directory is not
    /// required. It might have been deleted concurrently and then
    /// listing fails while the last known contents remain on display.
    #[must_use]
    pub fn try_refresh_task(
        &self,
    ) -> Option<(
        impl Future<Output = NavigateResult> + Send + 'static,
        NavigateTaskContinuation,
    )> {
        let mut initiated = None;
        self.observable.modify(|state| {
            let State::Displaying(displayed_dir) = state else {
                log::warn!("Illegal state for refreshing: {state:?}");
                return false;
            };
            displayed_dir.bump_refresh_seq();
            initiated = Some((
                displayed_dir.dir_path.clone(),
                displayed_dir.nav_seq,
                displayed_dir.refresh_seq,
            ));
            // Bookkeeping only, the observable state is unchanged.
            false
        });
        let Some((dir_path, nav_seq, refresh_seq)) = initiated else {
            return None;
        };
        let continuation = NavigateTaskContinuation {
            initiated_in: InitiatedIn::Refreshing {
                dir_path: dir_path.clone(),
                nav_seq,
                refresh_seq,
            },
        };
        let allow_read_only_selection = self.config.allow_read_only_selection;
        let task = async move { relist_dir(dir_path, allow_read_only_selection).await };
        Some((task, continuation))
    }

    /// Starts displaying the parent of the displayed directory.
    ///
    /// Returns `None` when already displaying a root directory.
    #[must_use]
    pub fn try_go_up_task(
        &self,
    ) -> Option<(
        impl Future<Output = NavigateResult> + Send + 'static,
        NavigateTaskContinuation,
    )> {
        let parent_dir_path = {
            let state = self.read();
            let Some(dir_path) = state.dir_path() else {
                log::warn!("Illegal state for navigating up: {state:?}", state = *state);
                return None;
            };
            let Some(parent_path) = dir_path.parent() else {
                log::debug!(
                    "Already displaying a root directory: {dir_path}",
                    dir_path = dir_path.display()
                );
                return None;
            };
            DirPath::from_owned(parent_path.to_path_buf())
        };
        self.try_navigate_task(parent_dir_path)
    }

    #[allow(clippy::must_use_candidate)]
    pub fn navigate_task_joined(
        &self,
        result: NavigateResult,
        continuation: NavigateTaskContinuation,
    ) -> NavigateTaskOutcome {
        let NavigateTaskContinuation { initiated_in } = continuation;
        let mut outcome = None;
        self.observable.modify(|state| {
            if !initiated_in.still_gates(state) {
                log::debug!(
                    "State changed while listing directory: {state:?} - discarding {result:?}"
                );
                outcome = Some(NavigateTaskOutcome::Discarded);
                return false;
            }
            match result {
                Ok(listed_dir) => {
                    outcome = Some(NavigateTaskOutcome::Applied);
                    state.replace_displayed_dir(listed_dir)
                }
                Err(NavigateError::InvalidTarget(target_dir_path)) => {
                    log::debug!(
                        "Ignoring navigation to {target_dir_path}: not a directory",
                        target_dir_path = target_dir_path.display()
                    );
                    if let (InitiatedIn::Navigating { .. }, State::Displaying(displayed_dir)) =
                        (&initiated_in, &mut *state)
                    {
                        // The rejected attempt leaves no trace. Reverting
                        // the initiation keeps pending refreshes that were
                        // initiated earlier applicable.
                        displayed_dir.nav_seq = displayed_dir.nav_seq.wrapping_sub(1);
                    }
                    outcome = Some(NavigateTaskOutcome::Rejected);
                    false
                }
                Err(err) => {
                    // The last known contents remain on display.
                    log::warn!("Failed to list directory: {err}");
                    outcome = Some(NavigateTaskOutcome::Failed(err));
                    false
                }
            }
        });
        let Some(outcome) = outcome else {
            unreachable!();
        };
        outcome
    }

    /// Creates a new subdirectory within the displayed directory.
    ///
    /// The displayed contents are not affected by the outcome.
    /// Refreshing after a successful creation is up to the caller.
    #[must_use]
    pub fn try_create_subdir_task(
        &self,
        name: OsString,
    ) -> Option<impl Future<Output = CreateSubdirOutcome> + Send + 'static> {
        let parent_dir_path = {
            let state = self.read();
            let Some(dir_path) = state.dir_path() else {
                log::warn!(
                    "Illegal state for creating a subdirectory: {state:?}",
                    state = *state
                );
                return None;
            };
            dir_path.into_owned()
        };
        let task = async move { create_new_subdir(parent_dir_path, name).await };
        Some(task)
    }

    /// Closes the chooser with the displayed directory as the final
    /// selection.
    ///
    /// Rejected unless the displayed directory is selectable.
    #[allow(clippy::must_use_candidate)]
    pub fn confirm(&self) -> bool {
        self.observable.modify(State::try_confirm)
    }

    /// Closes the chooser without a selection.
    ///
    /// Permitted in any state, even before initialization.
    #[allow(clippy::must_use_candidate)]
    pub fn cancel(&self) -> bool {
        self.observable.modify(State::try_cancel)
    }

    /// Releases the directory watch while the chooser is invisible.
    #[allow(clippy::must_use_candidate)]
    pub fn suspend_watching(&self) -> bool {
        self.observable.modify(|state| state.set_watching(Watching::Suspended))
    }

    /// Re-establishes the directory watch after becoming visible
    /// again.
    ///
    /// Changes that occurred while suspended have been missed and the
    /// caller is supposed to refresh the displayed contents after
    /// resuming.
    #[allow(clippy::must_use_candidate)]
    pub fn resume_watching(&self) -> bool {
        self.observable.modify(|state| state.set_watching(Watching::Active))
    }
}

impl ObservableReader<State> for ObservableState {
    fn read_lock(&self) -> ObservableRef<'_, State> {
        self.observable.read()
    }
}

fn list_dir(dir_path: OwnedDirPath, allow_read_only_selection: bool) -> NavigateResult {
    let entries = list_subdirs(&dir_path)?;
    let can_confirm = DirPathValidity::probe(&dir_path).is_selectable(allow_read_only_selection);
    Ok(ListedDir {
        dir_path,
        entries,
        can_confirm,
    })
}

fn resolve_initial_dir(config: &Config, proposed_dir_path: Option<&OwnedDirPath>) -> OwnedDirPath {
    if let Some(proposed_dir_path) = proposed_dir_path {
        if DirPathValidity::probe(proposed_dir_path).is_selectable(config.allow_read_only_selection)
        {
            return proposed_dir_path.clone();
        }
        log::info!(
            "Discarding proposed directory {dir_path}: not selectable",
            dir_path = proposed_dir_path.display()
        );
    }
    config.fallback_dir_path.clone()
}

async fn spawn_blocking_navigate_task(
    list_dir_fn: impl FnOnce() -> NavigateResult + Send + 'static,
) -> NavigateResult {
    match tokio::runtime::Handle::current()
        .spawn_blocking(list_dir_fn)
        .await
    {
        Ok(result) => result,
        Err(err) => Err(NavigateError::Other(err.into())),
    }
}

async fn resolve_and_list_initial_dir(
    config: Config,
    proposed_dir_path: Option<OwnedDirPath>,
) -> NavigateResult {
    spawn_blocking_navigate_task(move || {
        let dir_path = resolve_initial_dir(&config, proposed_dir_path.as_ref());
        list_dir(dir_path, config.allow_read_only_selection)
    })
    .await
}

async fn navigate_to_dir(
    target_dir_path: OwnedDirPath,
    allow_read_only_selection: bool,
) -> NavigateResult {
    spawn_blocking_navigate_task(move || {
        if !target_dir_path.is_dir() {
            return Err(NavigateError::InvalidTarget(target_dir_path));
        }
        list_dir(target_dir_path, allow_read_only_selection)
    })
    .await
}

async fn relist_dir(dir_path: OwnedDirPath, allow_read_only_selection: bool) -> NavigateResult {
    spawn_blocking_navigate_task(move || list_dir(dir_path, allow_read_only_selection)).await
}

async fn create_new_subdir(parent_dir_path: OwnedDirPath, name: OsString) -> CreateSubdirOutcome {
    log::debug!(
        "Creating subdirectory {name:?} in {parent_dir_path}",
        parent_dir_path = parent_dir_path.display()
    );
    match tokio::runtime::Handle::current()
        .spawn_blocking(move || create_subdir(&parent_dir_path, &name))
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => CreateSubdirOutcome::Failed {
            error: format!("failed to join blocking task: {err}"),
        },
    }
}
