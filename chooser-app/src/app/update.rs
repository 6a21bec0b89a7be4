// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use egui::{Context, ViewportCommand};

use crate::library::{self, chooser};

use super::{Action, ChooserAction, Event, LibraryAction, Message, MessageSender, Model};

pub(super) struct UpdateContext<'a> {
    pub(super) rt: &'a tokio::runtime::Handle,
    pub(super) msg_tx: &'a MessageSender,
    pub(super) mdl: &'a mut Model,
}

impl UpdateContext<'_> {
    pub(super) fn on_message(&mut self, ctx: &Context, msg: Message) {
        match msg {
            Message::Action(action) => self.on_action(action),
            Message::Event(event) => self.on_event(ctx, event),
        }
    }

    pub(super) fn on_minimized_changed(&mut self, minimized: bool) {
        let Self { msg_tx, mdl, .. } = self;
        if mdl.minimized == minimized {
            return;
        }
        mdl.minimized = minimized;
        if minimized {
            mdl.library.suspend_watching();
        } else {
            mdl.library.resume_watching();
            // Changes might have been missed while watching was suspended.
            msg_tx.send_action(ChooserAction::Refresh);
        }
    }

    pub(super) fn on_close_requested(&mut self) {
        // Closing the window is equivalent to cancelling.
        self.mdl.library.cancel();
    }

    fn on_action(&mut self, action: Action) {
        let Self { rt, msg_tx, mdl } = self;
        match action {
            Action::Library(action) => match action {
                LibraryAction::Chooser(action) => match action {
                    ChooserAction::Initialize => {
                        mdl.library.try_initialize(rt, *msg_tx);
                    }
                    ChooserAction::Navigate(dir_path) => {
                        mdl.library.try_navigate(rt, *msg_tx, dir_path);
                    }
                    ChooserAction::NavigateUp => {
                        mdl.library.try_navigate_up(rt, *msg_tx);
                    }
                    ChooserAction::Refresh => {
                        mdl.library.try_refresh(rt, *msg_tx);
                    }
                    ChooserAction::CreateSubdir(name) => {
                        mdl.library.try_create_subdir(rt, *msg_tx, name);
                    }
                    ChooserAction::Confirm => {
                        mdl.library.try_confirm();
                    }
                    ChooserAction::Cancel => {
                        mdl.library.cancel();
                    }
                },
            },
        }
    }

    fn on_event(&mut self, ctx: &Context, event: Event) {
        match event {
            Event::Library(event) => {
                let Self { rt, msg_tx, mdl } = self;
                on_library_event(mdl, ctx, rt, msg_tx, event);
            }
        }
    }
}

fn on_library_event(
    mdl: &mut Model,
    ctx: &Context,
    rt: &tokio::runtime::Handle,
    msg_tx: &MessageSender,
    event: library::Event,
) {
    match event {
        library::Event::Chooser(event) => match event {
            chooser::Event::StateChanged => {
                on_library_chooser_state_changed(mdl, ctx);
            }
            chooser::Event::NavigateTaskCompleted {
                result,
                continuation,
            } => match mdl.library.on_navigate_task_completed(result, continuation) {
                chooser::NavigateTaskOutcome::Applied => {
                    mdl.last_error = None;
                }
                chooser::NavigateTaskOutcome::Discarded | chooser::NavigateTaskOutcome::Rejected => {
                }
                chooser::NavigateTaskOutcome::Failed(err) => {
                    log::warn!("Failed to list directory: {err}");
                    mdl.last_error = Some(err.to_string());
                }
            },
            chooser::Event::CreateSubdirTaskCompleted { outcome } => {
                on_library_chooser_create_subdir_outcome(mdl, rt, msg_tx, outcome);
            }
            chooser::Event::ContentsChanged => {
                mdl.library.try_refresh(rt, msg_tx);
            }
        },
    }
}

fn on_library_chooser_state_changed(mdl: &Model, ctx: &Context) {
    // The chosen directory is picked up by the caller after the UI
    // has terminated.
    let closed = mdl.library.read_chooser_state().is_closed();
    if closed {
        log::debug!("Closing window after chooser has been closed");
        ctx.send_viewport_cmd(ViewportCommand::Close);
    }
}

fn on_library_chooser_create_subdir_outcome(
    mdl: &mut Model,
    rt: &tokio::runtime::Handle,
    msg_tx: &MessageSender,
    outcome: chooser::CreateSubdirOutcome,
) {
    match outcome {
        chooser::CreateSubdirOutcome::Created => {
            mdl.last_error = None;
            // Display the new entry immediately, even if change signals
            // from the watcher are delayed or unavailable.
            mdl.library.try_refresh(rt, msg_tx);
        }
        chooser::CreateSubdirOutcome::AlreadyExists => {
            mdl.last_error = Some("A directory with this name already exists.".to_owned());
        }
        chooser::CreateSubdirOutcome::NoWriteAccess => {
            mdl.last_error = Some("Not permitted to create a directory here.".to_owned());
        }
        chooser::CreateSubdirOutcome::Failed { error } => {
            log::warn!("Failed to create directory: {error}");
            mdl.last_error = Some(error);
        }
    }
}
