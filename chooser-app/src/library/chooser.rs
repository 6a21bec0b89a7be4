// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use discro::Ref;

use crate::NoReceiverForEvent;

use super::EventEmitter;

// Re-exports
pub use dirsel::desktop_app::{
    JoinedTask,
    chooser::*,
    fs::{CreateSubdirOutcome, DirEntry, DirPath, OwnedDirPath},
    watcher::{ChangedSignalReceiver, DirWatcher},
};

pub type StateRef<'a> = Ref<'a, State>;

#[derive(Debug)]
pub enum Event {
    StateChanged,
    NavigateTaskCompleted {
        result: JoinedTask<NavigateResult>,
        continuation: NavigateTaskContinuation,
    },
    CreateSubdirTaskCompleted {
        outcome: CreateSubdirOutcome,
    },
    ContentsChanged,
}

pub(super) async fn watch_state<E>(mut subscriber: StateSubscriber, event_emitter: E)
where
    E: EventEmitter,
{
    // The first event is always emitted immediately.
    loop {
        drop(subscriber.read_ack());
        if let Err(NoReceiverForEvent) = event_emitter.emit_event(Event::StateChanged.into()) {
            log::info!("Stop watching chooser state after event receiver has been dropped");
            break;
        }
        log::debug!("Suspending watch_state");
        if subscriber.changed().await.is_err() {
            log::info!("Stop watching chooser state after publisher has been dropped");
            break;
        }
        log::debug!("Resuming watch_state");
    }
}

pub(super) async fn forward_changed_signals<E>(
    mut changed_signal_rx: ChangedSignalReceiver,
    event_emitter: E,
) where
    E: EventEmitter,
{
    while changed_signal_rx.recv().await.is_some() {
        if let Err(NoReceiverForEvent) = event_emitter.emit_event(Event::ContentsChanged.into()) {
            log::info!(
                "Stop forwarding directory change signals after event receiver has been dropped"
            );
            return;
        }
    }
    log::info!("Stop forwarding directory change signals after sender has been dropped");
}
