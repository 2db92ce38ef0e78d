//! Parallel copy: chunk planning, chunked single-file copy, tree copy.

use anyhow::Result;
use parafs::copy::{
    CopyJob, TreePlan, copy_file_chunked, copy_range, plan_chunks, prepare_destination,
    workers_for_size,
};
use parafs::engine::{checksum_file, same_content};
use parafs::utils::config::{CopyTiers, GIB, MIB, TIB};
use parafs::{CopyOpts, copy_paths};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Deterministic, non-repeating-per-block content.
fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Relative path -> file bytes for every regular file under `root`.
fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut out: Vec<(PathBuf, Vec<u8>)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect();
    out.sort();
    out
}

// --- planning ---

#[test]
fn test_plan_chunks_even_and_remainder() {
    assert_eq!(plan_chunks(100, 4), vec![(0, 25), (25, 25), (50, 25), (75, 25)]);
    assert_eq!(
        plan_chunks(103, 4),
        vec![(0, 25), (25, 25), (50, 25), (75, 25), (100, 3)]
    );
}

#[test]
fn test_plan_chunks_small_and_empty() {
    assert!(plan_chunks(0, 8).is_empty());
    assert_eq!(plan_chunks(3, 8), vec![(0, 3)]);
    assert_eq!(plan_chunks(10, 0), vec![(0, 10)]);
}

#[test]
fn test_plan_chunks_cover_file_exactly() {
    for (size, workers) in [(1024u64, 3usize), (8192, 7), (MIB + 10, 16), (999_999, 64)] {
        let ranges = plan_chunks(size, workers);
        let mut next = 0;
        for (off, len) in &ranges {
            assert_eq!(*off, next, "size={size} workers={workers}");
            assert!(*len > 0);
            next = off + len;
        }
        assert_eq!(next, size);
    }
}

#[test]
fn test_workers_for_size_tiers() {
    assert_eq!(workers_for_size(0), CopyTiers::SMALL_WORKERS);
    assert_eq!(workers_for_size(CopyTiers::SMALL_LIMIT - 1), CopyTiers::SMALL_WORKERS);
    assert_eq!(workers_for_size(u64::MAX), CopyTiers::MAX_WORKERS);

    let mut last = 0;
    for size in [64 * MIB, 512 * MIB, 4 * GIB, 64 * GIB, TIB] {
        let n = workers_for_size(size);
        assert!(n >= last, "worker count must not shrink as size grows");
        assert!(n <= CopyTiers::MAX_WORKERS);
        last = n;
    }
}

// --- chunked single file ---

#[test]
fn test_chunked_copy_matches_source() -> Result<()> {
    let tmp = TempDir::new()?;
    for size in [1024usize, 8192, MIB as usize + 10] {
        let src = tmp.path().join(format!("src_{size}"));
        fs::write(&src, patterned(size))?;
        for workers in [1, 3, 16] {
            let dst = tmp.path().join(format!("dst_{size}_{workers}"));
            let n = copy_file_chunked(&src, &dst, workers, Duration::from_secs(60))?;
            assert_eq!(n, size as u64);
            assert_eq!(checksum_file(&src)?, checksum_file(&dst)?);
        }
    }
    Ok(())
}

#[test]
fn test_chunked_copy_empty_file() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("empty");
    fs::write(&src, b"")?;
    let dst = tmp.path().join("empty.copy");
    assert_eq!(copy_file_chunked(&src, &dst, 4, Duration::from_secs(5))?, 0);
    assert_eq!(fs::metadata(&dst)?.len(), 0);
    Ok(())
}

#[test]
fn test_chunked_copy_overwrites_longer_destination() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    fs::write(&src, patterned(5000))?;
    fs::write(&dst, vec![0xffu8; 20000])?;
    copy_file_chunked(&src, &dst, 4, Duration::from_secs(60))?;
    assert!(same_content(&src, &dst)?);
    Ok(())
}

#[test]
fn test_chunked_copy_missing_source() {
    let tmp = TempDir::new().unwrap();
    let r = copy_file_chunked(
        &tmp.path().join("nope"),
        &tmp.path().join("out"),
        2,
        Duration::from_secs(5),
    );
    assert!(r.is_err());
}

#[test]
fn test_chunked_copy_deadline_passed() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("big");
    fs::write(&src, patterned(8 * MIB as usize))?;
    let err = copy_file_chunked(&src, &tmp.path().join("big.copy"), 4, Duration::ZERO)
        .expect_err("zero deadline must fail");
    assert!(format!("{err:#}").contains("timed out"), "{err:#}");
    Ok(())
}

#[test]
fn test_copy_range_stops_when_aborted() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    fs::write(&src, patterned(4096))?;
    fs::write(&dst, vec![0u8; 4096])?;

    let err = copy_range(&src, &dst, 0, 4096, &AtomicBool::new(true)).expect_err("aborted");
    assert!(format!("{err:#}").contains("aborted"), "{err:#}");
    assert_eq!(fs::read(&dst)?, vec![0u8; 4096]);

    assert_eq!(copy_range(&src, &dst, 1024, 2048, &AtomicBool::new(false))?, 2048);
    assert_eq!(fs::read(&dst)?[1024..3072], patterned(4096)[1024..3072]);
    Ok(())
}

#[test]
fn test_chunked_copy_writes_stop_after_timeout() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("big");
    let dst = tmp.path().join("big.copy");
    fs::write(&src, patterned(32 * MIB as usize))?;
    assert!(copy_file_chunked(&src, &dst, 4, Duration::ZERO).is_err());

    // Running ranges finish at most their current buffer, then the file stays put.
    std::thread::sleep(Duration::from_millis(300));
    let settled = checksum_file(&dst)?;
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(checksum_file(&dst)?, settled);
    Ok(())
}

// --- destination ---

#[test]
fn test_prepare_destination() -> Result<()> {
    let tmp = TempDir::new()?;
    let file = tmp.path().join("file");
    fs::write(&file, b"x")?;
    assert!(prepare_destination(&file).is_err());

    let fresh = tmp.path().join("a/b/c");
    let resolved = prepare_destination(&fresh)?;
    assert!(fresh.is_dir());
    assert!(resolved.is_absolute());

    // Existing directory is reused.
    prepare_destination(&fresh)?;
    Ok(())
}

// --- tree ---

fn build_source(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("x/y/z"))?;
    fs::create_dir_all(root.join("empty"))?;
    fs::write(root.join("top.txt"), b"top")?;
    fs::write(root.join("x/one.bin"), patterned(70_000))?;
    fs::write(root.join("x/y/two.txt"), b"two")?;
    fs::write(root.join("x/y/z/three.bin"), patterned(3))?;
    Ok(())
}

#[test]
fn test_tree_plan_paths() {
    let plan = TreePlan {
        source_base: PathBuf::from("/src"),
        dest_root: PathBuf::from("/dst"),
    };
    assert_eq!(plan.dest_dir(Path::new("/src/a/b")), PathBuf::from("/dst/a/b"));
    assert_eq!(plan.dest_file(Path::new("/src/a/f.txt")), PathBuf::from("/dst/a/f.txt"));
    // Outside the base: lands in the destination root.
    assert_eq!(plan.dest_dir(Path::new("/elsewhere/q")), PathBuf::from("/dst"));
}

#[test]
fn test_tree_plan_seed() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("src");
    build_source(&src)?;
    let dst = tmp.path().join("dst");
    let plan = TreePlan::from_sources(&[src.clone()], &dst)?;
    assert_eq!(plan.source_base, src);
    assert_eq!(
        plan.seed(&src),
        Some(CopyJob::Prepare {
            src_dir: src.clone(),
            dst_dir: dst.clone()
        })
    );
    assert_eq!(
        plan.seed(&src.join("top.txt")),
        Some(CopyJob::CopyFile {
            src: src.join("top.txt"),
            dst: dst.join("top.txt")
        })
    );
    assert_eq!(plan.seed(&src.join("missing")), None);
    Ok(())
}

#[test]
fn test_copy_tree_replicates_source() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("src");
    build_source(&src)?;
    let dst = prepare_destination(&tmp.path().join("dst"))?;

    for workers in [1, 4] {
        let out = dst.join(format!("w{workers}"));
        fs::create_dir(&out)?;
        let opts = CopyOpts {
            workers: Some(workers),
            verify: true,
            ..Default::default()
        };
        let report = copy_paths(&[src.clone()], &out, &opts)?;
        assert_eq!(report.failures, 0);
        assert_eq!(report.files_copied, 4);
        assert_eq!(report.bytes_copied, 3 + 70_000 + 3 + 3);
        // x, x/y, x/y/z, empty
        assert_eq!(report.dirs_created, 4);
        assert_eq!(snapshot(&src), snapshot(&out));
        assert!(out.join("empty").is_dir());
    }
    Ok(())
}

#[test]
fn test_copy_loose_files() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("src");
    build_source(&src)?;
    let dst = tmp.path().join("dst");
    fs::create_dir(&dst)?;

    let report = copy_paths(
        &[src.join("top.txt"), src.join("x")],
        &dst,
        &CopyOpts::default(),
    )?;
    assert_eq!(report.failures, 0);
    assert_eq!(fs::read(dst.join("top.txt"))?, b"top");
    assert_eq!(fs::read(dst.join("x/y/two.txt"))?, b"two");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_copy_tree_skips_symlinks() -> Result<()> {
    let tmp = TempDir::new()?;
    let src = tmp.path().join("src");
    build_source(&src)?;
    std::os::unix::fs::symlink(src.join("top.txt"), src.join("x/link"))?;
    let dst = tmp.path().join("dst");
    fs::create_dir(&dst)?;

    let report = copy_paths(&[src.clone()], &dst, &CopyOpts::default())?;
    assert_eq!(report.symlinks_skipped, 1);
    assert!(fs::symlink_metadata(dst.join("x/link")).is_err());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_copy_tree_failed_file_spares_siblings() -> Result<()> {
    use parafs::Settings;
    use parafs::engine::arg_parser::CpArgs;
    use parafs::engine::handlers::handle_cp;
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new()?;
    let src = tmp.path().join("src");
    build_source(&src)?;
    let locked = src.join("x/y/two.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;
    if fs::File::open(&locked).is_ok() {
        // Running as root: permissions are not enforced.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644))?;
        return Ok(());
    }

    let dst = tmp.path().join("dst");
    fs::create_dir(&dst)?;
    let opts = CopyOpts {
        workers: Some(3),
        ..Default::default()
    };
    let report = copy_paths(&[src.clone()], &dst, &opts);

    let cp = CpArgs {
        paths: vec![src.clone(), tmp.path().join("dst_cli")],
        verify: None,
        timeout: None,
    };
    let cli_result = handle_cp(&cp, &Settings::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644))?;

    let report = report?;
    assert_eq!(report.failures, 1);
    assert_eq!(report.files_copied, 3);
    assert_eq!(fs::read(dst.join("top.txt"))?, b"top");
    assert_eq!(fs::read(dst.join("x/one.bin"))?, patterned(70_000));
    assert_eq!(fs::read(dst.join("x/y/z/three.bin"))?, patterned(3));
    assert!(!dst.join("x/y/two.txt").exists());

    let err = cli_result.expect_err("failed job must fail the command");
    assert!(err.to_string().contains("1 copy jobs failed"), "{err}");
    assert!(tmp.path().join("dst_cli/x/one.bin").is_file());
    Ok(())
}

#[test]
fn test_copy_missing_sources_fail() {
    let tmp = TempDir::new().unwrap();
    let r = copy_paths(
        &[tmp.path().join("nope")],
        tmp.path(),
        &CopyOpts::default(),
    );
    assert!(r.is_err());
}
