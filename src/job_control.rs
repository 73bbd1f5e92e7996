//! Raw process-group primitives the rest of the core builds on: joining a
//! group before exec, signaling a whole group, and reaping child state
//! changes. This is the job-control layer a shell needs for Ctrl-Z/fg/bg;
//! the spooler reuses the same primitives to supervise pipeline process
//! groups instead of terminal jobs (spec §4.3, §5).

use std::io;

/// One reaped child-state change, as reported by `waitpid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEvent {
    Stopped(libc::pid_t),
    Continued(libc::pid_t),
    Exited(libc::pid_t, i32),
    /// Terminated by a signal (not exited normally).
    Signaled(libc::pid_t, i32),
}

pub fn set_process_group(pid: libc::pid_t, pgid: libc::pid_t) -> io::Result<()> {
    loop {
        let rc = unsafe { libc::setpgid(pid, pgid) };
        if rc == 0 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(code) if code == libc::EINTR => continue,
            // Already exec'd or gone; caller can proceed with best-effort behavior.
            Some(code) if code == libc::EACCES || code == libc::ESRCH => return Ok(()),
            _ => return Err(err),
        }
    }
}

/// Send `signal` to every process in group `pgid` (spec §4.3 signaling
/// contract: pause/resume/cancel all act on the supervisor's pgid).
pub fn send_signal_to_group(pgid: libc::pid_t, signal: libc::c_int) -> io::Result<()> {
    if pgid <= 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid process group id",
        ));
    }

    loop {
        let rc = unsafe { libc::kill(-pgid, signal) };
        if rc == 0 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return Err(err);
    }
}

/// Non-blocking, single reap of any child: `waitpid(-1, WNOHANG |
/// WUNTRACED | WCONTINUED)`. Returns `Ok(None)` when nothing has changed
/// state. Called only from the main thread's drain loop, never from a
/// signal handler (spec §5).
pub fn reap_any_nonblocking() -> io::Result<Option<ChildEvent>> {
    let mut raw_status: libc::c_int = 0;
    loop {
        let pid = unsafe {
            libc::waitpid(
                -1,
                &mut raw_status,
                libc::WNOHANG | libc::WUNTRACED | libc::WCONTINUED,
            )
        };

        if pid == 0 {
            return Ok(None);
        }
        if pid < 0 {
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(code) if code == libc::EINTR => continue,
                // No children left to wait for; not an error condition here.
                Some(code) if code == libc::ECHILD => return Ok(None),
                _ => return Err(err),
            }
        }

        if unsafe { libc::WIFSTOPPED(raw_status) } {
            return Ok(Some(ChildEvent::Stopped(pid)));
        }
        if unsafe { libc::WIFCONTINUED(raw_status) } {
            return Ok(Some(ChildEvent::Continued(pid)));
        }
        if unsafe { libc::WIFEXITED(raw_status) } {
            let code = unsafe { libc::WEXITSTATUS(raw_status) };
            return Ok(Some(ChildEvent::Exited(pid, code)));
        }
        if unsafe { libc::WIFSIGNALED(raw_status) } {
            let sig = unsafe { libc::WTERMSIG(raw_status) };
            return Ok(Some(ChildEvent::Signaled(pid, sig)));
        }
        // Some other wait-status change we don't model; keep draining.
    }
}

/// Blocking wait for one specific pid to exit or be signaled (used inside
/// the supervisor while it waits for its own stage children).
pub fn wait_for_exit(pid: libc::pid_t) -> io::Result<i32> {
    let mut raw_status: libc::c_int = 0;
    loop {
        let rc = unsafe { libc::waitpid(pid, &mut raw_status, 0) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return Err(err);
        }

        if unsafe { libc::WIFEXITED(raw_status) } {
            return Ok(unsafe { libc::WEXITSTATUS(raw_status) });
        }
        if unsafe { libc::WIFSIGNALED(raw_status) } {
            return Ok(128 + unsafe { libc::WTERMSIG(raw_status) });
        }
        // Stops can't happen here: the supervisor only waits with no
        // WUNTRACED flag, so a SIGSTOP delivered to the group stops the
        // supervisor itself before this loop observes its children again.
    }
}
