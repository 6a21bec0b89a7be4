// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::library::Library;

/// Application model
///
/// Immutable during rendering.
#[allow(missing_debug_implementations)]
pub(crate) struct Model {
    pub(crate) library: Library,

    /// Last error notification.
    ///
    /// Ephemeral, replaced or cleared by subsequent events.
    pub(crate) last_error: Option<String>,

    /// Watching is suspended while the window is minimized.
    pub(crate) minimized: bool,
}

impl Model {
    #[must_use]
    pub(crate) const fn new(library: Library) -> Self {
        Self {
            library,
            last_error: None,
            minimized: false,
        }
    }
}
