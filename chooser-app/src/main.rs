// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::Parser as _;
use directories::{ProjectDirs, UserDirs};
use log::LevelFilter;

use dirsel::desktop_app::fs::{DirPath, OwnedDirPath};

pub mod app;
use self::app::App;

pub mod library;
use self::library::{Library, chooser, settings};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static MIMALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Debug)]
pub struct NoReceiverForEvent;

/// Default log level for debug builds.
#[cfg(debug_assertions)]
const DEFAULT_LOG_FILTER_LEVEL: LevelFilter = LevelFilter::Info;

/// Reduce log verbosity for release builds.
#[cfg(not(debug_assertions))]
const DEFAULT_LOG_FILTER_LEVEL: LevelFilter = LevelFilter::Warn;

/// Choose a directory in a modal dialog.
///
/// Prints the chosen directory on exit.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
struct Args {
    /// The directory that is proposed when the dialog opens.
    dir_path: Option<PathBuf>,

    /// Permit choosing directories without write access.
    #[arg(long)]
    allow_read_only: bool,

    /// Proposed name for creating a new directory.
    #[arg(long)]
    new_dir_name: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(DEFAULT_LOG_FILTER_LEVEL)
        // Parse environment variables after configuring all default option(s).
        .parse_default_env()
        .init();

    let args = Args::parse();

    let Some(config_dir) = app_config_dir() else {
        log::error!("Config directory is unavailable");
        return ExitCode::FAILURE;
    };
    debug_assert!(config_dir.exists());
    match config_dir
        .metadata()
        .map(|metadata| metadata.permissions().readonly())
    {
        Ok(readonly) => {
            if readonly {
                log::warn!(
                    "Config directory (read-only): {dir_path}",
                    dir_path = config_dir.display()
                );
            } else {
                log::info!(
                    "Config directory: {dir_path}",
                    dir_path = config_dir.display()
                );
            }
        }
        Err(err) => {
            log::error!("Failed to query permissions of config directory: {err}");
        }
    };

    let initial_settings = settings::State::restore_from_parent_dir(&config_dir);

    let proposed_dir_path = args
        .dir_path
        .map(DirPath::from_owned)
        .or_else(|| initial_settings.last_dir_path.clone());
    let chooser_config = chooser::Config {
        fallback_dir_path: fallback_dir_path(),
        allow_read_only_selection: args.allow_read_only,
    };
    let library = Library::new(initial_settings, chooser_config, proposed_dir_path);
    let chooser_state = Arc::clone(library.chooser());

    let rt = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(err) => {
            log::error!("No Tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = eframe::run_native(
        app_name(),
        eframe::NativeOptions::default(),
        Box::new(move |ctx| {
            let mdl = app::Model::new(library);
            let app = App::new(ctx, rt, mdl, config_dir, args.new_dir_name);
            Ok(Box::new(app))
        }),
    ) {
        log::error!("Failed to run the UI: {err}");
        return ExitCode::FAILURE;
    }

    // The observable state outlives the UI and yields the final choice.
    let chosen_dir_path = chooser_state
        .read()
        .chosen_dir_path()
        .map(DirPath::into_owned);
    let Some(chosen_dir_path) = chosen_dir_path else {
        log::info!("No directory has been chosen");
        return ExitCode::FAILURE;
    };
    println!("{}", chosen_dir_path.display());
    ExitCode::SUCCESS
}

/// The home directory of the current user with the temporary directory
/// as last resort.
#[must_use]
fn fallback_dir_path() -> OwnedDirPath {
    UserDirs::new().map_or_else(
        || DirPath::from_owned(std::env::temp_dir()),
        |user_dirs| DirPath::from_owned(user_dirs.home_dir().to_path_buf()),
    )
}

#[must_use]
const fn app_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

#[must_use]
fn app_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", app_name())
}

fn init_app_dir(app_dir: &Path) {
    if let Err(err) = std::fs::create_dir_all(app_dir) {
        log::error!(
            "Failed to create app directory '{dir}': {err}",
            dir = app_dir.display(),
        );
    } else {
        debug_assert!(app_dir.exists());
    }
}

#[must_use]
fn init_config_dir(app_dirs: &ProjectDirs) -> &Path {
    let app_config_dir = app_dirs.config_local_dir();
    init_app_dir(app_config_dir);
    app_config_dir
}

#[must_use]
fn app_config_dir() -> Option<PathBuf> {
    app_dirs()
        .as_ref()
        .map(init_config_dir)
        .map(Path::to_path_buf)
}
