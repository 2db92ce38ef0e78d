//! Unit-level tests: formatting helpers, histogram, top-N, settings.

use parafs::engine::{comma, dest_path, path_relative_to, short_bytes, short_num, split_exclude};
use parafs::stats::{CATCH_ALL, Histogram, TopItem, TopN, parse_bins};
use parafs::utils::config::{GIB, KIB, MIB, TIB};
use parafs::utils::settings_from_str;
use parafs::{Settings, WalkStat};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

// --- formatting ---

#[test]
fn test_comma() {
    assert_eq!(comma(0), "0");
    assert_eq!(comma(999), "999");
    assert_eq!(comma(1000), "1,000");
    assert_eq!(comma(1234567), "1,234,567");
    assert_eq!(comma(100_000), "100,000");
}

#[test]
fn test_short_bytes_units() {
    assert_eq!(short_bytes(0), "0.00 KiB");
    assert_eq!(short_bytes(512), "0.50 KiB");
    assert_eq!(short_bytes(MIB), "1.00 MiB");
    assert_eq!(short_bytes(3 * GIB / 2), "1.50 GiB");
    assert_eq!(short_bytes(2 * TIB), "2.00 TiB");
    assert_eq!(short_bytes(u64::MAX), "16.00 EiB");
}

#[test]
fn test_short_num() {
    assert_eq!(short_num(7), "7");
    assert_eq!(short_num(999), "999");
    assert_eq!(short_num(1500), "1.50 K");
    assert_eq!(short_num(2_000_000), "2.00 M");
    assert_eq!(short_num(3_100_000_000), "3.10 B");
}

#[test]
fn test_path_relative_to() {
    let base = Path::new("/data/src");
    assert_eq!(
        path_relative_to(Path::new("/data/src/a/b"), base),
        Some(PathBuf::from("a/b"))
    );
    assert_eq!(path_relative_to(base, base), Some(PathBuf::new()));
    assert_eq!(path_relative_to(Path::new("/other/a"), base), None);
}

#[test]
fn test_dest_path_into_existing_dir() {
    let tmp = TempDir::new().unwrap();
    let src = Path::new("/somewhere/file.img");
    assert_eq!(dest_path(src, tmp.path()), tmp.path().join("file.img"));

    let target = tmp.path().join("renamed.img");
    assert_eq!(dest_path(src, &target), target);
}

// --- histogram ---

#[test]
fn test_parse_bins_last_becomes_catch_all() {
    let bins = parse_bins("4k,1m,1g,1t").unwrap();
    assert_eq!(bins, vec![4 * KIB, MIB, GIB, CATCH_ALL]);
}

#[test]
fn test_parse_bins_sorts_after_overwrite() {
    // The listed last value (2g) is replaced before sorting.
    let bins = parse_bins("3t,4k,1m,2g").unwrap();
    assert_eq!(bins, vec![4 * KIB, MIB, 3 * TIB, CATCH_ALL]);
}

#[test]
fn test_parse_bins_case_insensitive() {
    assert_eq!(parse_bins("4K,1M").unwrap(), vec![4 * KIB, CATCH_ALL]);
}

#[test]
fn test_parse_bins_errors() {
    assert!(parse_bins("4x,1m").is_err());
    assert!(parse_bins("k,1m").is_err());
    assert!(parse_bins("4k,,1m").is_err());
    assert!(parse_bins("").is_err());
}

#[test]
fn test_histogram_boundaries_inclusive() {
    let hist = Histogram::new(vec![10, 100, CATCH_ALL]).unwrap();
    assert_eq!(hist.bucket_index(0), 0);
    assert_eq!(hist.bucket_index(10), 0);
    assert_eq!(hist.bucket_index(11), 1);
    assert_eq!(hist.bucket_index(100), 1);
    assert_eq!(hist.bucket_index(101), 2);
    assert_eq!(hist.bucket_index(u64::MAX), 2);
}

#[test]
fn test_histogram_without_catch_all_clamps_to_last() {
    let hist = Histogram::new(vec![100, 10]).unwrap();
    assert_eq!(hist.bins(), &[10, 100]);
    assert_eq!(hist.bucket_index(5000), 1);
}

#[test]
fn test_histogram_conserves_count() {
    let mut hist = Histogram::from_spec("1k,1m,1g").unwrap();
    let values = [0, 1, KIB, KIB + 1, MIB, 5 * MIB, 10 * GIB, 7];
    for v in values {
        hist.insert(v);
    }
    assert_eq!(hist.total(), values.len() as u64);
    assert_eq!(hist.counters(), &[4, 2, 2]);
}

#[test]
fn test_histogram_rejects_empty() {
    assert!(Histogram::new(Vec::new()).is_err());
}

// --- top-N ---

#[test]
fn test_topn_keeps_largest_ascending() {
    let mut top = TopN::new(3);
    for (i, v) in [5u64, 1, 9, 3, 7, 2].into_iter().enumerate() {
        top.put(TopItem::new(format!("f{i}"), v));
    }
    let vals: Vec<u64> = top.items().iter().map(|it| it.val).collect();
    assert_eq!(vals, vec![5, 7, 9]);
    assert_eq!(top.len(), 3);
}

#[test]
fn test_topn_tie_with_minimum_not_inserted() {
    let mut top = TopN::new(2);
    top.put(TopItem::new("a", 4));
    top.put(TopItem::new("b", 8));
    top.put(TopItem::new("c", 4));
    let names: Vec<&Path> = top.items().iter().map(|it| it.name.as_path()).collect();
    assert_eq!(names, vec![Path::new("a"), Path::new("b")]);
}

#[test]
fn test_topn_zero_capacity() {
    let mut top = TopN::new(0);
    top.put(TopItem::new("a", 1));
    assert!(top.is_empty());
}

// --- WalkStat ---

#[test]
fn test_walk_stat_averages() {
    let mut stat = WalkStat::new(PathBuf::from("/x"), 4);
    assert_eq!(stat.avg_file_size(), 0);
    assert_eq!(stat.avg_dir_entries(), None);

    stat.files = 10;
    stat.dirs = 3;
    stat.symlinks = 1;
    stat.total_file_size = 1000;
    assert_eq!(stat.avg_file_size(), 100);
    assert_eq!(stat.avg_dir_entries(), Some(3));
    assert_eq!(stat.scanned(), 13);
}

// --- settings ---

#[test]
fn test_split_exclude() {
    assert_eq!(
        split_exclude("/a: /b/c ::/d"),
        vec![
            PathBuf::from("/a"),
            PathBuf::from("/b/c"),
            PathBuf::from("/d")
        ]
    );
    assert!(split_exclude("").is_empty());
}

#[test]
fn test_settings_from_str_overrides() {
    let mut settings = Settings::default();
    settings.exclude.push(PathBuf::from("/keep"));
    settings_from_str(
        r#"
[settings]
workers = 3
verbose = true
exclude = ["/skip/me"]
bins = "1k,1m"
copy_timeout_secs = 30
verify = true
"#,
        &mut settings,
    )
    .unwrap();

    assert_eq!(settings.workers, Some(3));
    assert!(settings.verbose);
    assert_eq!(
        settings.exclude,
        vec![PathBuf::from("/keep"), PathBuf::from("/skip/me")]
    );
    assert_eq!(settings.bins, "1k,1m");
    assert_eq!(settings.copy_timeout, Duration::from_secs(30));
    assert!(settings.verify);
    assert!(!settings.apparent);
}

#[test]
fn test_settings_from_str_empty_keeps_defaults() {
    let mut settings = Settings::default();
    settings_from_str("", &mut settings).unwrap();
    assert_eq!(settings.workers, None);
    assert_eq!(settings.bins, Settings::default().bins);
}

#[test]
fn test_settings_from_str_malformed() {
    let mut settings = Settings::default();
    assert!(settings_from_str("[settings]\nworkers = \"many\"\n", &mut settings).is_err());
}

#[test]
fn test_setup_settings_reads_config_file() {
    use clap::Parser;
    use parafs::engine::{Cli, setup_settings};

    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".parafs.toml"),
        "[settings]\nworkers = 2\napparent = true\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from(["parafs", "--np", "6", "profile", "."]).unwrap();
    let settings = setup_settings(&cli, tmp.path()).unwrap();
    // Flags win over the file.
    assert_eq!(settings.workers, Some(6));
    assert!(settings.apparent);
}

#[test]
fn test_setup_settings_bad_config_is_fatal() {
    use clap::Parser;
    use parafs::engine::{Cli, setup_settings};

    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".parafs.toml"), "[settings\n").unwrap();
    let cli = Cli::try_parse_from(["parafs", "profile"]).unwrap();
    assert!(setup_settings(&cli, tmp.path()).is_err());
}

#[test]
fn test_setup_settings_unreadable_config_is_fatal() {
    use clap::Parser;
    use parafs::engine::{Cli, setup_settings};

    // Present but not readable as a file.
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join(".parafs.toml")).unwrap();
    let cli = Cli::try_parse_from(["parafs", "profile"]).unwrap();
    let err = setup_settings(&cli, tmp.path()).unwrap_err();
    assert!(format!("{err:#}").contains(".parafs.toml"), "{err:#}");
}

#[test]
fn test_setup_settings_without_config_file() {
    use clap::Parser;
    use parafs::engine::{Cli, setup_settings};

    let tmp = TempDir::new().unwrap();
    let cli = Cli::try_parse_from(["parafs", "profile"]).unwrap();
    let settings = setup_settings(&cli, tmp.path()).unwrap();
    assert_eq!(settings.workers, None);
}

#[test]
fn test_package_paths_names() {
    use parafs::utils::config::PackagePaths;

    let paths = PackagePaths::get();
    assert_eq!(paths.pkg_name(), "parafs");
    assert_eq!(paths.config_filename(), ".parafs.toml");
}

#[test]
fn test_default_workers_at_least_one() {
    assert!(parafs::default_workers() >= 1);
}
