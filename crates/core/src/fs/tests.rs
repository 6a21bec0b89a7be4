// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::*;

#[test]
fn dir_path_equals_itself_borrowed_and_owned() {
    let path = Path::new("some/dir");
    let borrowed = DirPath::from_borrowed(path);
    let owned = DirPath::from_owned(path.to_path_buf());
    assert_eq!(borrowed, owned);
    assert_eq!(borrowed.borrowed(), owned.borrowed());
    assert_eq!(borrowed.into_owned(), owned);
}

#[test]
fn dir_path_distinguishes_trailing_slash() {
    let without = DirPath::from_borrowed(Path::new("some/dir"));
    let with = DirPath::from_borrowed(Path::new("some/dir/"));
    assert_ne!(without, with);
}

#[test]
fn dir_entry_path_joins_parent_and_name() {
    let entry = DirEntry::new(Path::new("/parent"), OsString::from("child"));
    assert_eq!(entry.name(), OsStr::new("child"));
    assert_eq!(entry.path(), Path::new("/parent/child"));
    assert_eq!(entry.display_name(), "child");
}

#[test]
fn dir_entries_are_ordered_by_name_bytes() {
    let parent = Path::new("/parent");
    let mut entries = vec![
        DirEntry::new(parent, OsString::from("b")),
        DirEntry::new(parent, OsString::from("2")),
        DirEntry::new(parent, OsString::from("A")),
        DirEntry::new(parent, OsString::from("10")),
        DirEntry::new(parent, OsString::from("a")),
    ];
    entries.sort_unstable();
    let names = entries
        .iter()
        .map(|entry| entry.name().to_os_string())
        .collect::<Vec<_>>();
    // Plain byte/codepoint order: digits before uppercase before lowercase.
    assert_eq!(names, ["10", "2", "A", "a", "b"]);
}

#[test]
fn plain_dir_names() {
    assert!(is_plain_dir_name(OsStr::new("New Folder")));
    assert!(is_plain_dir_name(OsStr::new(".hidden")));
    assert!(is_plain_dir_name(OsStr::new("name.with.dots")));
}

#[test]
fn not_plain_dir_names() {
    assert!(!is_plain_dir_name(OsStr::new("")));
    assert!(!is_plain_dir_name(OsStr::new(".")));
    assert!(!is_plain_dir_name(OsStr::new("..")));
    assert!(!is_plain_dir_name(OsStr::new("nested/name")));
    assert!(!is_plain_dir_name(OsStr::new("/absolute")));
    assert!(!is_plain_dir_name(OsStr::new("trailing/")));
}
