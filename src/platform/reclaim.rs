//! Best-effort memory reclamation hint.

/// Ask the allocator to return unused memory to the OS.
///
/// Advisory only: on glibc this trims the arenas, elsewhere it is a no-op.
/// There is no success contract and nothing to report.
pub fn reclaim_hint() {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    {
        // SAFETY: malloc_trim only releases free pages held by the allocator.
        unsafe {
            libc::malloc_trim(0);
        }
    }
}
