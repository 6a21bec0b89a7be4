// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{ffi::OsString, future::Future, path::PathBuf, sync::Arc};

use dirsel::desktop_app::{
    JoinedTask,
    fs::{DirPath, OwnedDirPath},
};

use crate::NoReceiverForEvent;

pub mod chooser;
pub mod settings;

#[derive(Debug)]
pub enum Event {
    Chooser(chooser::Event),
}

impl From<chooser::Event> for Event {
    fn from(event: chooser::Event) -> Self {
        Self::Chooser(event)
    }
}

/// Event emitter.
///
/// No locks must be held when calling `emit_event()`!
pub trait EventEmitter: Send + Sync + 'static {
    fn emit_event(&self, event: Event) -> Result<(), NoReceiverForEvent>;
}

/// Shared, mutable state.
#[allow(missing_debug_implementations)]
pub struct StateObservables {
    pub settings: Arc<settings::ObservableState>,
    pub chooser: Arc<chooser::ObservableState>,
}

impl StateObservables {
    #[must_use]
    fn new(initial_settings: settings::State, chooser_config: chooser::Config) -> Self {
        let settings = Arc::new(settings::ObservableState::new(initial_settings));
        let chooser = Arc::new(chooser::ObservableState::new(chooser_config));
        Self { settings, chooser }
    }
}

/// Combined snapshot of the observable state.
///
/// Holds read locks on the observed state. Must be dropped before
/// invoking any operations that modify the state.
#[allow(missing_debug_implementations)]
pub struct CurrentState<'a> {
    chooser: chooser::StateRef<'a>,
}

impl CurrentState<'_> {
    #[must_use]
    pub fn chooser(&self) -> &chooser::State {
        &self.chooser
    }

    #[must_use]
    pub fn displayed_dir_path(&self) -> Option<DirPath<'_>> {
        self.chooser.dir_path()
    }

    #[must_use]
    pub fn could_navigate_up(&self) -> bool {
        self.chooser
            .dir_path()
            .is_some_and(|dir_path| dir_path.parent().is_some())
    }

    #[must_use]
    pub fn could_create_subdir(&self) -> bool {
        self.chooser.is_displaying()
    }

    #[must_use]
    pub fn could_confirm(&self) -> bool {
        self.chooser
            .displayed_dir()
            .is_some_and(chooser::DisplayedDir::can_confirm)
    }
}

/// Library frontend.
///
/// Owns the observable state and spawns the tasks that operate on it.
#[allow(missing_debug_implementations)]
pub struct Library {
    state_observables: StateObservables,
    proposed_dir_path: Option<OwnedDirPath>,
}

impl Library {
    #[must_use]
    pub fn new(
        initial_settings: settings::State,
        chooser_config: chooser::Config,
        proposed_dir_path: Option<OwnedDirPath>,
    ) -> Self {
        let state_observables = StateObservables::new(initial_settings, chooser_config);
        Self {
            state_observables,
            proposed_dir_path,
        }
    }

    #[must_use]
    pub const fn chooser(&self) -> &Arc<chooser::ObservableState> {
        &self.state_observables.chooser
    }

    #[must_use]
    pub fn read_chooser_state(&self) -> chooser::StateRef<'_> {
        self.state_observables.chooser.read()
    }

    #[must_use]
    pub fn read_current_state(&self) -> CurrentState<'_> {
        let chooser = self.state_observables.chooser.read();
        CurrentState { chooser }
    }

    /// Spawns a task that lists the proposed directory.
    ///
    /// Falls back to the configured directory if no directory has been
    /// proposed or if listing the proposed directory fails.
    #[allow(clippy::must_use_candidate)]
    pub fn try_initialize<E>(&self, tokio_rt: &tokio::runtime::Handle, event_emitter: &E) -> bool
    where
        E: EventEmitter + Clone,
    {
        let proposed_dir_path = self.proposed_dir_path.clone();
        let Some((task, continuation)) = self
            .state_observables
            .chooser
            .try_initialize_task(proposed_dir_path)
        else {
            return false;
        };
        spawn_navigate_task(tokio_rt, event_emitter, task, continuation);
        true
    }

    /// Spawns a task that lists the given directory for display.
    #[allow(clippy::must_use_candidate)]
    pub fn try_navigate<E>(
        &self,
        tokio_rt: &tokio::runtime::Handle,
        event_emitter: &E,
        dir_path: OwnedDirPath,
    ) -> bool
    where
        E: EventEmitter + Clone,
    {
        let Some((task, continuation)) = self
            .state_observables
            .chooser
            .try_navigate_task(dir_path)
        else {
            return false;
        };
        spawn_navigate_task(tokio_rt, event_emitter, task, continuation);
        true
    }

    /// Spawns a task that lists the parent of the displayed directory.
    #[allow(clippy::must_use_candidate)]
    pub fn try_navigate_up<E>(&self, tokio_rt: &tokio::runtime::Handle, event_emitter: &E) -> bool
    where
        E: EventEmitter + Clone,
    {
        let Some((task, continuation)) = self.state_observables.chooser.try_go_up_task() else {
            return false;
        };
        spawn_navigate_task(tokio_rt, event_emitter, task, continuation);
        true
    }

    /// Spawns a task that lists the displayed directory again.
    #[allow(clippy::must_use_candidate)]
    pub fn try_refresh<E>(&self, tokio_rt: &tokio::runtime::Handle, event_emitter: &E) -> bool
    where
        E: EventEmitter + Clone,
    {
        let Some((task, continuation)) = self.state_observables.chooser.try_refresh_task() else {
            return false;
        };
        spawn_navigate_task(tokio_rt, event_emitter, task, continuation);
        true
    }

    /// Joins a finished navigation task with the observable state.
    #[allow(clippy::must_use_candidate)]
    pub fn on_navigate_task_completed(
        &self,
        result: JoinedTask<chooser::NavigateResult>,
        continuation: chooser::NavigateTaskContinuation,
    ) -> chooser::NavigateTaskOutcome {
        let result = match result {
            JoinedTask::Completed(result) => result,
            JoinedTask::Cancelled => {
                log::debug!("Navigation task has been cancelled");
                return chooser::NavigateTaskOutcome::Discarded;
            }
            JoinedTask::Panicked(err) => Err(chooser::NavigateError::Other(err)),
        };
        self.state_observables
            .chooser
            .navigate_task_joined(result, continuation)
    }

    /// Spawns a task that creates a new subdirectory of the displayed
    /// directory.
    #[allow(clippy::must_use_candidate)]
    pub fn try_create_subdir<E>(
        &self,
        tokio_rt: &tokio::runtime::Handle,
        event_emitter: &E,
        name: OsString,
    ) -> bool
    where
        E: EventEmitter + Clone,
    {
        let Some(task) = self.state_observables.chooser.try_create_subdir_task(name) else {
            return false;
        };
        let join_handle = tokio_rt.spawn(task);
        tokio_rt.spawn({
            let event_emitter = event_emitter.clone();
            async move {
                let outcome = match JoinedTask::join(join_handle).await {
                    JoinedTask::Completed(outcome) => outcome,
                    JoinedTask::Cancelled => {
                        log::debug!("Create directory task has been cancelled");
                        return;
                    }
                    JoinedTask::Panicked(err) => chooser::CreateSubdirOutcome::Failed {
                        error: err.to_string(),
                    },
                };
                let event = chooser::Event::CreateSubdirTaskCompleted { outcome };
                if let Err(NoReceiverForEvent) = event_emitter.emit_event(event.into()) {
                    log::info!(
                        "Discarding create directory outcome after event receiver has been dropped"
                    );
                }
            }
        });
        true
    }

    /// Accepts the displayed directory as the final selection.
    ///
    /// Remembers the chosen directory in the settings.
    #[allow(clippy::must_use_candidate)]
    pub fn try_confirm(&self) -> bool {
        if !self.state_observables.chooser.confirm() {
            return false;
        }
        let chosen_dir_path = {
            let state = self.state_observables.chooser.read();
            state.chosen_dir_path().map(DirPath::into_owned)
        };
        if let Some(chosen_dir_path) = chosen_dir_path {
            self.state_observables
                .settings
                .update_last_dir_path(&chosen_dir_path);
        }
        true
    }

    /// Dismisses the chooser without a selection.
    ///
    /// Permitted in any state.
    #[allow(clippy::must_use_candidate)]
    pub fn cancel(&self) -> bool {
        self.state_observables.chooser.cancel()
    }

    #[allow(clippy::must_use_candidate)]
    pub fn suspend_watching(&self) -> bool {
        self.state_observables.chooser.suspend_watching()
    }

    #[allow(clippy::must_use_candidate)]
    pub fn resume_watching(&self) -> bool {
        self.state_observables.chooser.resume_watching()
    }

    pub fn spawn_background_tasks(&self, tokio_rt: &tokio::runtime::Handle, settings_dir: PathBuf) {
        tokio_rt.spawn(settings::tasklet::on_state_changed_save_to_file(
            self.state_observables.settings.subscribe_changed(),
            settings_dir,
            |err| {
                log::error!("Failed to save settings to file: {err}");
            },
        ));
    }

    pub fn spawn_event_tasks<E>(&self, tokio_rt: &tokio::runtime::Handle, event_emitter: &E)
    where
        E: EventEmitter + Clone,
    {
        tokio_rt.spawn({
            let subscriber = self.state_observables.chooser.subscribe_changed();
            let event_emitter = event_emitter.clone();
            async move {
                chooser::watch_state(subscriber, event_emitter).await;
            }
        });
        match chooser::DirWatcher::new() {
            Ok((watcher, changed_signal_rx)) => {
                tokio_rt.spawn(chooser::tasklet::on_watch_target_changed_rebind(
                    self.state_observables.chooser.subscribe_changed(),
                    watcher,
                ));
                tokio_rt.spawn({
                    let event_emitter = event_emitter.clone();
                    async move {
                        chooser::forward_changed_signals(changed_signal_rx, event_emitter).await;
                    }
                });
            }
            Err(err) => {
                // Not fatal. Only the live refreshing of the displayed
                // directory contents is unavailable.
                log::warn!("Failed to create directory watcher: {err}");
            }
        }
    }
}

fn spawn_navigate_task<E>(
    tokio_rt: &tokio::runtime::Handle,
    event_emitter: &E,
    task: impl Future<Output = chooser::NavigateResult> + Send + 'static,
    continuation: chooser::NavigateTaskContinuation,
) where
    E: EventEmitter + Clone,
{
    let join_handle = tokio_rt.spawn(task);
    tokio_rt.spawn({
        let event_emitter = event_emitter.clone();
        async move {
            let result = JoinedTask::join(join_handle).await;
            let event = chooser::Event::NavigateTaskCompleted {
                result,
                continuation,
            };
            if let Err(NoReceiverForEvent) = event_emitter.emit_event(event.into()) {
                log::info!("Discarding navigation task result after event receiver has been dropped");
            }
        }
    });
}
