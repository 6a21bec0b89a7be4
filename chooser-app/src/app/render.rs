// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use eframe::Frame;
use egui::{Button, CentralPanel, Context, Grid, ScrollArea, TextEdit, TopBottomPanel};

use crate::library::{CurrentState, chooser};

use super::{ChooserAction, MessageSender, Model, UiData};

// In contrast to `UpdateContext` the model is immutable during rendering.
// Only the `UiData` remains mutable.
pub(super) struct RenderContext<'a> {
    pub(super) msg_tx: &'a MessageSender,
    pub(super) mdl: &'a Model,
    pub(super) ui_data: &'a mut UiData,
}

impl RenderContext<'_> {
    pub(super) fn render_frame(&mut self, ctx: &Context, _frm: &mut Frame) {
        let Self {
            msg_tx,
            mdl,
            ui_data,
        } = self;

        let current_library_state = mdl.library.read_current_state();

        TopBottomPanel::top("top-panel").show(ctx, |ui| {
            render_top_panel(ui, ui_data, msg_tx, &current_library_state);
        });

        TopBottomPanel::bottom("bottom-panel").show(ctx, |ui| {
            render_bottom_panel(ui, msg_tx, mdl, &current_library_state);
        });

        // The central panel has to be added after all other panels.
        CentralPanel::default().show(ctx, |ui| {
            render_central_panel(ui, msg_tx, mdl, &current_library_state);
        });
    }
}

fn render_top_panel(
    ui: &mut egui::Ui,
    ui_data: &mut UiData,
    msg_tx: &MessageSender,
    current_library_state: &CurrentState<'_>,
) {
    Grid::new("grid")
        .num_columns(2)
        .spacing([40.0, 4.0])
        .striped(true)
        .show(ui, |ui| {
            let dir_path = current_library_state.displayed_dir_path();
            ui.label("Directory:");
            ui.label(
                dir_path
                    .map(|dir_path| dir_path.display().to_string())
                    .unwrap_or_default(),
            );
            ui.end_row();

            ui.label("");
            if ui
                .add_enabled(
                    current_library_state.could_navigate_up(),
                    Button::new("Go up"),
                )
                .on_hover_text("Display the parent directory.")
                .clicked()
            {
                msg_tx.send_action(ChooserAction::NavigateUp);
            }
            ui.end_row();

            ui.label("New directory:");
            ui.horizontal(|ui| {
                ui.add_enabled(
                    current_library_state.could_create_subdir(),
                    TextEdit::singleline(&mut ui_data.create_subdir_name_input),
                );
                if ui
                    .add_enabled(
                        current_library_state.could_create_subdir()
                            && !ui_data.create_subdir_name_input.is_empty(),
                        Button::new("Create"),
                    )
                    .on_hover_text("Create a new subdirectory with the entered name.")
                    .clicked()
                {
                    msg_tx.send_action(ChooserAction::CreateSubdir(
                        ui_data.create_subdir_name_input.clone().into(),
                    ));
                }
            });
            ui.end_row();
        });
}

fn render_central_panel(
    ui: &mut egui::Ui,
    msg_tx: &MessageSender,
    mdl: &Model,
    current_library_state: &CurrentState<'_>,
) {
    match current_library_state.chooser() {
        chooser::State::Initial => {
            if mdl.last_error.is_none() {
                ui.label("Loading...");
            }
        }
        chooser::State::Displaying(displayed_dir) => {
            ScrollArea::both().show(ui, |ui| {
                if displayed_dir.entries().is_empty() {
                    ui.label("No subdirectories");
                    return;
                }
                for dir_entry in displayed_dir.entries() {
                    if ui.button(dir_entry.display_name().as_ref()).clicked() {
                        msg_tx.send_action(ChooserAction::Navigate(
                            dir_entry.path().to_path_buf().into(),
                        ));
                    }
                }
            });
        }
        chooser::State::Closed { .. } => {}
    }
}

fn render_bottom_panel(
    ui: &mut egui::Ui,
    msg_tx: &MessageSender,
    mdl: &Model,
    current_library_state: &CurrentState<'_>,
) {
    Grid::new("grid")
        .num_columns(2)
        .spacing([40.0, 4.0])
        .striped(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(current_library_state.could_confirm(), Button::new("Select"))
                    .on_hover_text("Choose the displayed directory and close.")
                    .clicked()
                {
                    msg_tx.send_action(ChooserAction::Confirm);
                }
                if ui
                    .button("Cancel")
                    .on_hover_text("Close without choosing a directory.")
                    .clicked()
                {
                    msg_tx.send_action(ChooserAction::Cancel);
                }
                if current_library_state.chooser().is_initial()
                    && mdl.last_error.is_some()
                    && ui
                        .button("Retry")
                        .on_hover_text("Try to display the initial directory again.")
                        .clicked()
                {
                    msg_tx.send_action(ChooserAction::Initialize);
                }
            });
            ui.end_row();

            ui.label("Last error:");
            ui.label(mdl.last_error.as_deref().unwrap_or_default());
            ui.end_row();
        });
}
