// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
};

use discro::{Publisher, Ref, Subscriber};
use serde::{Deserialize, Serialize};

use crate::fs::DirPath;

pub const FILE_NAME: &str = "dirsel_settings";

pub const FILE_SUFFIX: &str = "ron";

pub mod tasklet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// The directory that was chosen when the chooser was confirmed
    /// the last time.
    ///
    /// Proposed as the initial directory of the next session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_dir_path: Option<DirPath<'static>>,
}

impl State {
    #[must_use]
    pub fn restore_from_parent_dir(parent_dir: &Path) -> Self {
        log::info!("Loading saved settings from: {}", parent_dir.display());
        Self::load(parent_dir)
            .map_err(|err| {
                log::warn!("Failed to load saved settings: {err}");
            })
            .unwrap_or_default()
    }

    pub fn load(parent_dir: &Path) -> anyhow::Result<State> {
        let file_path = new_settings_file_path(parent_dir.to_path_buf());
        log::info!("Loading settings from file: {}", file_path.display());
        match fs::read(&file_path) {
            Ok(bytes) => ron::de::from_bytes(&bytes).map_err(Into::into),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Default::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, parent_dir: &Path) -> anyhow::Result<()> {
        let file_path = new_settings_file_path(parent_dir.to_path_buf());
        log::info!("Saving current settings into file: {}", file_path.display());
        let contents = ron::ser::to_string_pretty(self, Default::default())?;
        if let Some(parent_path) = file_path.parent() {
            fs::create_dir_all(parent_path)?;
        }
        fs::write(&file_path, contents)?;
        Ok(())
    }

    pub async fn save_spawn_blocking(self, parent_dir: PathBuf) -> anyhow::Result<()> {
        match tokio::runtime::Handle::current()
            .spawn_blocking(move || self.save(&parent_dir))
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                anyhow::bail!("failed to save: {err}");
            }
            Err(err) => {
                anyhow::bail!("failed to join blocking task after saving: {err}");
            }
        }
    }

    pub fn update_last_dir_path(&mut self, new_last_dir_path: Option<&DirPath<'_>>) -> bool {
        if self.last_dir_path.as_ref() == new_last_dir_path {
            // No effect
            return false;
        }
        if let Some(new_last_dir_path) = new_last_dir_path {
            log::info!("Updating last directory: {}", new_last_dir_path.display());
        } else {
            log::info!("Resetting last directory");
        }
        self.last_dir_path = new_last_dir_path
            .map(ToOwned::to_owned)
            .map(DirPath::into_owned);
        true
    }
}

#[must_use]
fn new_settings_file_path(parent_dir: PathBuf) -> PathBuf {
    let mut path_buf = parent_dir;
    path_buf.push(FILE_NAME);
    path_buf.set_extension(FILE_SUFFIX);
    path_buf
}

/// Manages the mutable, observable state
#[derive(Debug)]
pub struct ObservableState {
    state_pub: Publisher<State>,
}

impl ObservableState {
    #[must_use]
    pub fn new(initial_state: State) -> Self {
        let state_pub = Publisher::new(initial_state);
        Self { state_pub }
    }

    #[must_use]
    pub fn read(&self) -> Ref<'_, State> {
        self.state_pub.read()
    }

    #[must_use]
    pub fn subscribe_changed(&self) -> Subscriber<State> {
        self.state_pub.subscribe_changed()
    }

    #[allow(clippy::must_use_candidate)]
    pub fn modify(&self, modify_state: impl FnOnce(&mut State) -> bool) -> bool {
        self.state_pub.modify(modify_state)
    }

    #[allow(clippy::must_use_candidate)]
    pub fn update_last_dir_path(&self, new_last_dir_path: &DirPath<'_>) -> bool {
        self.modify(|state| state.update_last_dir_path(Some(new_last_dir_path)))
    }

    #[allow(clippy::must_use_candidate)]
    pub fn reset_last_dir_path(&self) -> bool {
        self.modify(|state| state.update_last_dir_path(None))
    }
}

impl Default for ObservableState {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

#[cfg(test)]
mod tests;
