// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::future::Future;

use discro::Subscriber;

use super::State;
use crate::{fs::DirPath, watcher::DirWatcher};

/// Keep the watcher bound to the currently displayed directory.
///
/// Rebinds the watcher whenever the watch target changes and releases
/// the binding while watching is suspended. Terminates after the
/// chooser has been closed or the publisher has disappeared.
pub fn on_watch_target_changed_rebind(
    mut subscriber: Subscriber<State>,
    mut watcher: DirWatcher,
) -> impl Future<Output = ()> + Send + 'static {
    // Read the initial value immediately before spawning the async task
    let (mut watch_target, mut closed) = {
        let state = subscriber.read_ack();
        (
            state.watch_target().map(DirPath::into_owned),
            state.is_closed(),
        )
    };
    async move {
        log::debug!("Starting on_watch_target_changed_rebind");
        // Enforce initial update
        let mut value_changed = true;
        loop {
            if value_changed {
                watcher.rebind(watch_target.as_deref());
            }
            if closed {
                log::debug!("Aborting on_watch_target_changed_rebind: closed");
                break;
            }
            value_changed = false;
            if subscriber.changed().await.is_err() {
                // Publisher has disappeared
                log::debug!("Aborting on_watch_target_changed_rebind");
                break;
            }
            {
                let state = subscriber.read_ack();
                let new_watch_target = state.watch_target();
                if watch_target.as_deref() != new_watch_target.as_deref() {
                    watch_target = new_watch_target.map(DirPath::into_owned);
                    value_changed = true;
                }
                closed = state.is_closed();
            }
        }
        log::debug!("Stopping on_watch_target_changed_rebind");
    }
}
