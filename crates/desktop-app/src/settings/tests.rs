// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::*;

#[test]
fn load_from_empty_dir_restores_default() {
    let temp_dir = tempfile::tempdir().unwrap();
    let state = State::load(temp_dir.path()).unwrap();
    assert_eq!(state, State::default());
}

#[test]
fn save_then_load_preserves_last_dir_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let state = State {
        last_dir_path: Some(DirPath::from_owned(temp_dir.path().join("chosen"))),
    };
    state.save(temp_dir.path()).unwrap();

    let restored = State::load(temp_dir.path()).unwrap();
    assert_eq!(state, restored);
}

#[test]
fn save_creates_missing_parent_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings_dir = temp_dir.path().join("missing").join("nested");
    let state = State::default();
    state.save(&settings_dir).unwrap();
    assert_eq!(State::load(&settings_dir).unwrap(), state);
}

#[test]
fn update_last_dir_path_without_effect() {
    let mut state = State::default();
    assert!(!state.update_last_dir_path(None));

    let dir_path = DirPath::from_borrowed(Path::new("/some/dir"));
    assert!(state.update_last_dir_path(Some(&dir_path)));
    assert!(!state.update_last_dir_path(Some(&dir_path)));

    assert!(state.update_last_dir_path(None));
    assert_eq!(state, State::default());
}

#[tokio::test]
async fn save_on_state_changed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings_dir = temp_dir.path().to_path_buf();

    let observable_state = ObservableState::default();
    let tasklet = tasklet::on_state_changed_save_to_file(
        observable_state.subscribe_changed(),
        settings_dir.clone(),
        |err| panic!("failed to save settings: {err}"),
    );
    let tasklet = tokio::spawn(tasklet);

    let dir_path = DirPath::from_owned(temp_dir.path().join("chosen"));
    assert!(observable_state.update_last_dir_path(&dir_path));

    // The tasklet saves asynchronously without completion feedback.
    // Poll the settings file instead.
    let mut restored = State::load(&settings_dir).unwrap();
    for _ in 0..100 {
        if restored.last_dir_path.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        restored = State::load(&settings_dir).unwrap();
    }
    assert_eq!(restored.last_dir_path, Some(dir_path));

    tasklet.abort();
}
