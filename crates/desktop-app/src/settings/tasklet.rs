// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{future::Future, path::PathBuf};

use discro::Subscriber;

use super::State;

/// Save the settings into a file after they changed.
///
/// The settings at the time of invocation are considered as already
/// saved. They are read and acknowledged before returning the future,
/// otherwise changes that occur while spawning the task would slip
/// through unnoticed.
pub fn on_state_changed_save_to_file(
    mut subscriber: Subscriber<State>,
    settings_dir: PathBuf,
    mut report_error: impl FnMut(anyhow::Error) + Send + 'static,
) -> impl Future<Output = ()> + Send + 'static {
    let mut last_saved_state = subscriber.read_ack().clone();
    async move {
        log::debug!("Starting on_state_changed_save_to_file");
        while subscriber.changed().await.is_ok() {
            let state = {
                let state = subscriber.read_ack();
                if last_saved_state == *state {
                    log::debug!("Settings unchanged: {state:?}", state = *state);
                    continue;
                }
                state.clone()
            };
            log::info!("Saving changed settings: {state:?}");
            match state.clone().save_spawn_blocking(settings_dir.clone()).await {
                Ok(()) => {
                    last_saved_state = state;
                }
                Err(err) => {
                    // Keep the stale state, the next change triggers
                    // another attempt.
                    report_error(err);
                }
            }
        }
        // Publisher has disappeared
        log::debug!("Stopping on_state_changed_save_to_file");
    }
}
