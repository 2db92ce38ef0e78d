//! CLI entry: resolve settings (defaults, `.parafs.toml`, env, flags), set up logging, dispatch.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::Settings;
use crate::engine::arg_parser::{Cli, Commands};
use crate::engine::handlers::{
    handle_cp, handle_find, handle_profile, handle_scp, handle_sparse_check, handle_sparse_gen,
    handle_topn,
};
use crate::utils::config::PackagePaths;
use crate::utils::parafs_toml::{apply_file_to_settings, load_parafs_toml};
use crate::utils::setup_logging;

/// Split a colon-separated exclusion list, dropping empty parts.
pub fn split_exclude(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Exclusions from the environment, falling back to a `.env` in `dir`.
fn exclude_from_env(dir: &Path) -> Vec<PathBuf> {
    let key = PackagePaths::get().exclude_env();
    let read = || std::env::var(key).ok().filter(|s| !s.trim().is_empty());
    let mut value = read();
    if value.is_none() {
        let env_path = dir.join(".env");
        if env_path.is_file() {
            let _ = dotenvy::from_path(&env_path);
            value = read();
        }
    }
    value.map(|v| split_exclude(&v)).unwrap_or_default()
}

/// Defaults, then `.parafs.toml` and env from `dir`, then flags.
pub fn setup_settings(cli: &Cli, dir: &Path) -> Result<Settings> {
    let mut settings = Settings {
        exclude: PackagePaths::get()
            .default_exclude_paths()
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        ..Settings::default()
    };
    settings.exclude.extend(exclude_from_env(dir));
    if let Some(file) = load_parafs_toml(dir)? {
        apply_file_to_settings(&file, &mut settings);
    }

    if cli.workers.is_some() {
        settings.workers = cli.workers;
    }
    if let Some(v) = cli.verbose {
        settings.verbose = v;
    }
    settings.exclude.extend(cli.exclude.iter().cloned());
    Ok(settings)
}

/// Run the selected subcommand.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let settings = setup_settings(cli, &cwd)?;
    setup_logging(settings.verbose);
    debug!("{:#?}", settings);

    match &cli.command {
        Commands::Profile(args) => handle_profile(args, &settings),
        Commands::Topn(args) => handle_topn(args, &settings),
        Commands::Find(args) => handle_find(args, &settings),
        Commands::Cp(args) => handle_cp(args, &settings),
        Commands::Scp(args) => handle_scp(args),
        Commands::SparseCheck(args) => handle_sparse_check(args),
        Commands::SparseGen(args) => handle_sparse_gen(args),
    }
}
