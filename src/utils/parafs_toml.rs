//! Load `.parafs.toml` from the current directory (CLI only). The library takes everything
//! through [`WalkOpts`](crate::WalkOpts) / [`CopyOpts`](crate::CopyOpts).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Settings;
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct ParafsToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    workers: Option<usize>,
    verbose: Option<bool>,
    exclude: Option<Vec<String>>,
    bins: Option<String>,
    apparent: Option<bool>,
    copy_timeout_secs: Option<u64>,
    verify: Option<bool>,
}

/// Load the settings file from `dir`. `Ok(None)` when there is none; a file that can't be
/// read or doesn't parse is an error.
pub(crate) fn load_parafs_toml(dir: &Path) -> Result<Option<ParafsToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let file = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

/// Overwrite settings field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $settings:expr, $sec_field:ident => $settings_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $settings.$settings_field = v;
        }
    };
}

/// Apply file config to settings (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_settings(file: &ParafsToml, settings: &mut Settings) {
    let sec = &file.settings;
    if sec.workers.is_some() {
        settings.workers = sec.workers;
    }
    apply_file_opt!(sec, settings, verbose => verbose);
    if let Some(ref v) = sec.exclude {
        settings.exclude.extend(v.iter().map(PathBuf::from));
    }
    apply_file_opt!(sec, settings, bins => bins);
    apply_file_opt!(sec, settings, apparent => apparent);
    if let Some(secs) = sec.copy_timeout_secs {
        settings.copy_timeout = Duration::from_secs(secs);
    }
    apply_file_opt!(sec, settings, verify => verify);
}

/// Apply settings from TOML text, as if it had been read from `.parafs.toml`.
pub fn settings_from_str(text: &str, settings: &mut Settings) -> Result<()> {
    let file: ParafsToml = toml::from_str(text)?;
    apply_file_to_settings(&file, settings);
    Ok(())
}
