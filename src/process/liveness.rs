//! Process liveness probe.

/// Check whether a process with the given id currently exists.
///
/// Uses `kill` with the null signal, which performs permission and
/// existence checks without delivering anything. `ESRCH` means the process
/// is gone; a permission error means it exists but belongs to someone else,
/// which still counts as alive.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    use nix::sys::signal;
    use nix::unistd::Pid;

    match signal::kill(Pid::from_raw(pid as i32), None) {
        Ok(_) => true,
        Err(nix::errno::Errno::ESRCH) => false, // No such process
        Err(_) => true,                         // Exists, but we lack permission
    }
}

/// Check whether a process with the given id currently exists.
///
/// Non-unix fallback: look the pid up in the system process table.
#[cfg(not(unix))]
pub fn pid_exists(pid: u32) -> bool {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
    system.process(Pid::from_u32(pid)).is_some()
}
