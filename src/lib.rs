// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

pub use dirsel_core as core;

#[cfg(feature = "desktop-app")]
pub use dirsel_desktop_app as desktop_app;
