// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware configuration file location.

use std::path::PathBuf;

/// Default location of the export configuration file.
///
/// A missing file is not an error; the export falls back to defaults.
pub fn default_config_path() -> PathBuf {
    config_base(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
    .join("examsheet")
    .join("export.json")
}

fn config_base(xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Some(xdg) = xdg.filter(|p| !p.as_os_str().is_empty()) {
        return xdg;
    }
    if let Some(home) = home {
        return home.join(".config");
    }
    // Last resort
    PathBuf::from(".")
}
