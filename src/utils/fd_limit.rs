//! Open-file limit, used to cap how many chunk workers a single copy may start.

/// Share of the soft limit chunk workers may use; the walk pool and stdio keep the rest.
const FD_BUDGET_SHARE: f64 = 0.8;

/// Soft `RLIMIT_NOFILE`, or None when unlimited or unknown.
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    let mut rlim = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `rlim` is a valid out-pointer for the duration of the call.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) } != 0 {
        return None;
    }
    let soft = rlim.rlim_cur;
    if soft == libc::RLIM_INFINITY || soft > i64::MAX as u64 {
        return None;
    }
    Some(soft)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Workers that fit in the descriptor budget when each holds `fds_per_worker` files.
/// Never below one.
pub fn max_workers_by_fd_limit(fds_per_worker: usize) -> Option<usize> {
    let budget = (max_open_fds()? as f64 * FD_BUDGET_SHARE) as usize;
    Some((budget / fds_per_worker.max(1)).max(1))
}

pub fn cap_workers_by_fd_limit(requested: usize, fds_per_worker: usize) -> usize {
    match max_workers_by_fd_limit(fds_per_worker) {
        Some(cap) if cap < requested => {
            log::debug!("chunk workers {} -> {} (open-file limit)", requested, cap);
            cap
        }
        _ => requested,
    }
}
