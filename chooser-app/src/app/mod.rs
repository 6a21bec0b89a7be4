// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{path::PathBuf, sync::mpsc};

use eframe::{CreationContext, Frame};
use egui::Context;

mod message;
pub(crate) use self::message::{Action, ChooserAction, Event, LibraryAction, Message, MessageSender};

mod model;
pub(crate) use self::model::Model;

mod update;
use self::update::UpdateContext;

mod render;
use self::render::RenderContext;

/// UI data bindings
///
/// Stores user input and other mutable UI state that needs to be preserved
/// between frames.
#[derive(Debug, Default)]
struct UiData {
    /// Pre-filled with the proposed name, if any.
    create_subdir_name_input: String,
}

#[expect(missing_debug_implementations)]
pub struct App {
    rt: tokio::runtime::Handle,

    msg_rx: mpsc::Receiver<Message>,
    msg_tx: MessageSender,

    mdl: Model,

    ui_data: UiData,
}

impl App {
    #[must_use]
    pub(crate) fn new(
        ctx: &CreationContext<'_>,
        rt: tokio::runtime::Handle,
        mdl: Model,
        settings_dir: PathBuf,
        proposed_new_dir_name: Option<String>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let msg_tx = MessageSender::new(ctx.egui_ctx.clone(), msg_tx);
        mdl.library.spawn_background_tasks(&rt, settings_dir);
        mdl.library.spawn_event_tasks(&rt, &msg_tx);
        mdl.library.try_initialize(&rt, &msg_tx);
        let ui_data = UiData {
            create_subdir_name_input: proposed_new_dir_name.unwrap_or_default(),
        };
        Self {
            rt,
            msg_rx,
            msg_tx,
            mdl,
            ui_data,
        }
    }

    fn update(&mut self) -> (&mpsc::Receiver<Message>, UpdateContext<'_>) {
        let Self {
            rt,
            msg_rx,
            msg_tx,
            mdl,
            ..
        } = self;
        let ctx = UpdateContext { rt, msg_tx, mdl };
        (msg_rx, ctx)
    }

    fn render(&mut self) -> RenderContext<'_> {
        let Self {
            msg_tx,
            mdl,
            ui_data,
            ..
        } = self;
        RenderContext {
            msg_tx,
            mdl,
            ui_data,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, frm: &mut Frame) {
        let minimized = ctx.input(|input| input.viewport().minimized.unwrap_or(false));
        let close_requested = ctx.input(|input| input.viewport().close_requested());

        let (msg_rx, mut update_ctx) = self.update();
        update_ctx.on_minimized_changed(minimized);
        if close_requested {
            update_ctx.on_close_requested();
        }
        let msg_count = msg_rx
            .try_iter()
            .map(|msg| {
                update_ctx.on_message(ctx, msg);
            })
            .count();
        if msg_count > 0 {
            log::debug!("Processed {msg_count} message(s) before rendering frame");
        }

        let mut render_ctx = self.render();
        render_ctx.render_frame(ctx, frm);
    }
}
