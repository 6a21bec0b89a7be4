// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fs, time::Duration};

use super::*;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// Long enough for spurious signals to arrive, short enough to not
// stall the test run.
const SILENCE_TIMEOUT: Duration = Duration::from_millis(500);

async fn recv_signal(changed_signal_rx: &mut ChangedSignalReceiver) -> Option<()> {
    tokio::time::timeout(RECV_TIMEOUT, changed_signal_rx.recv())
        .await
        .ok()
        .flatten()
}

async fn expect_silence(changed_signal_rx: &mut ChangedSignalReceiver) {
    let recv = tokio::time::timeout(SILENCE_TIMEOUT, changed_signal_rx.recv()).await;
    assert!(recv.is_err(), "expected no signal");
}

#[test]
fn rebind_keeps_a_single_binding() {
    let (mut watcher, _changed_signal_rx) = DirWatcher::new().unwrap();
    assert_eq!(watcher.bound_dir_path(), None);

    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();

    watcher.rebind(Some(first_dir.path()));
    assert_eq!(watcher.bound_dir_path(), Some(first_dir.path()));

    watcher.rebind(Some(second_dir.path()));
    assert_eq!(watcher.bound_dir_path(), Some(second_dir.path()));

    // Rebinding the current target must not release it.
    watcher.rebind(Some(second_dir.path()));
    assert_eq!(watcher.bound_dir_path(), Some(second_dir.path()));

    watcher.rebind(None);
    assert_eq!(watcher.bound_dir_path(), None);

    // Unbinding twice is permitted.
    watcher.rebind(None);
    assert_eq!(watcher.bound_dir_path(), None);
}

#[test]
fn rebind_missing_dir_degrades_to_unbound() {
    let (mut watcher, _changed_signal_rx) = DirWatcher::new().unwrap();
    let temp_dir = tempfile::tempdir().unwrap();

    watcher.rebind(Some(temp_dir.path()));
    watcher.rebind(Some(&temp_dir.path().join("missing")));
    assert_eq!(watcher.bound_dir_path(), None);
}

#[tokio::test]
async fn signals_when_subdir_created() {
    let (mut watcher, mut changed_signal_rx) = DirWatcher::new().unwrap();
    let temp_dir = tempfile::tempdir().unwrap();
    watcher.rebind(Some(temp_dir.path()));

    fs::create_dir(temp_dir.path().join("new")).unwrap();
    assert_eq!(recv_signal(&mut changed_signal_rx).await, Some(()));
}

#[tokio::test]
async fn signals_when_subdir_removed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let subdir_path = temp_dir.path().join("doomed");
    fs::create_dir(&subdir_path).unwrap();

    let (mut watcher, mut changed_signal_rx) = DirWatcher::new().unwrap();
    watcher.rebind(Some(temp_dir.path()));

    fs::remove_dir(&subdir_path).unwrap();
    assert_eq!(recv_signal(&mut changed_signal_rx).await, Some(()));
}

#[tokio::test]
async fn signals_when_subdir_renamed() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::create_dir(temp_dir.path().join("before")).unwrap();

    let (mut watcher, mut changed_signal_rx) = DirWatcher::new().unwrap();
    watcher.rebind(Some(temp_dir.path()));

    fs::rename(temp_dir.path().join("before"), temp_dir.path().join("after")).unwrap();
    assert_eq!(recv_signal(&mut changed_signal_rx).await, Some(()));
}

#[tokio::test]
async fn signal_is_never_lost_after_coalescing() {
    let (mut watcher, mut changed_signal_rx) = DirWatcher::new().unwrap();
    let temp_dir = tempfile::tempdir().unwrap();
    watcher.rebind(Some(temp_dir.path()));

    // A burst of changes is coalesced into few signals, but at least
    // one must arrive.
    for i in 0..10 {
        fs::create_dir(temp_dir.path().join(format!("subdir{i}"))).unwrap();
    }
    assert_eq!(recv_signal(&mut changed_signal_rx).await, Some(()));

    // Drain whatever the burst left behind, then the next change must
    // signal again.
    while changed_signal_rx.try_recv().is_ok() {}
    tokio::time::sleep(SILENCE_TIMEOUT).await;
    while changed_signal_rx.try_recv().is_ok() {}

    fs::create_dir(temp_dir.path().join("last")).unwrap();
    assert_eq!(recv_signal(&mut changed_signal_rx).await, Some(()));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn ignores_file_creation() {
    let (mut watcher, mut changed_signal_rx) = DirWatcher::new().unwrap();
    let temp_dir = tempfile::tempdir().unwrap();
    watcher.rebind(Some(temp_dir.path()));

    fs::write(temp_dir.path().join("file"), b"contents").unwrap();
    expect_silence(&mut changed_signal_rx).await;
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn no_signals_after_unbinding() {
    let (mut watcher, mut changed_signal_rx) = DirWatcher::new().unwrap();
    let temp_dir = tempfile::tempdir().unwrap();
    watcher.rebind(Some(temp_dir.path()));
    watcher.rebind(None);

    fs::create_dir(temp_dir.path().join("unseen")).unwrap();
    expect_silence(&mut changed_signal_rx).await;
}
