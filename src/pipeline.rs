//! The pipeline engine (spec §4.3): turns a job's input file plus a
//! (possibly empty) conversion path into a supervised chain of external
//! processes, one process group per job. Grounded in the teacher's
//! `executor::execute_pipeline` pipe-stitching and `pre_exec`-based
//! process-group joining, generalized from a shell pipeline (N builtins
//! and externals, interactively waited on) to a fire-and-forget
//! conversion chain supervised by its own child.

use os_pipe::pipe;
use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{IntoRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::error::{Result, SpoolerError};
use crate::job_control;
use crate::printer_conn::PrinterConnector;
use crate::registry::Conversion;

/// Program names for each stage, in order, for the `job_started` event.
/// A direct-match job (empty conversion path) runs a single passthrough
/// stage, reported as `cat`.
pub fn stage_programs(conversions: &[Conversion]) -> Vec<String> {
    if conversions.is_empty() {
        vec!["cat".to_string()]
    } else {
        conversions.iter().map(|c| c.argv[0].clone()).collect()
    }
}

/// Launch one job's pipeline. On success, returns the supervisor pid,
/// which doubles as the pipeline's pgid (the supervisor joins its own
/// group before forking any stage). On failure, nothing has been forked
/// and no printer/job state may be changed by the caller (spec §4.3
/// "failure before any stage is forked").
pub fn launch(
    input_path: &str,
    conversions: &[Conversion],
    printer_name: &str,
    printer_type: &str,
    connector: &dyn PrinterConnector,
) -> Result<libc::pid_t> {
    let input_fd = File::open(input_path)
        .map_err(|e| SpoolerError::LaunchFailed(format!("open {input_path}: {e}")))?
        .into_raw_fd();

    let printer_fd = match connector.connect(printer_name, printer_type) {
        Ok(fd) => fd,
        Err(e) => {
            unsafe { libc::close(input_fd) };
            return Err(SpoolerError::LaunchFailed(format!(
                "connect printer {printer_name}: {e}"
            )));
        }
    };

    let stages: Vec<Vec<String>> = if conversions.is_empty() {
        vec![vec!["cat".to_string()]]
    } else {
        conversions.iter().map(|c| c.argv.clone()).collect()
    };

    match unsafe { libc::fork() } {
        -1 => {
            let err = io::Error::last_os_error();
            unsafe {
                libc::close(input_fd);
                libc::close(printer_fd);
            }
            Err(SpoolerError::LaunchFailed(format!(
                "fork supervisor: {err}"
            )))
        }
        0 => run_supervisor(input_fd, printer_fd, stages),
        pid => {
            // Parent keeps no descriptors open for a pipeline it doesn't run.
            unsafe {
                libc::close(input_fd);
                libc::close(printer_fd);
            }
            Ok(pid)
        }
    }
}

/// The supervisor's body. Never returns: it always terminates the
/// process, either via `exit` (all stages launched, whether or not they
/// all succeeded) or by raising `SIGABRT` on itself if a stage failed to
/// even launch (spec §4.3's partial-launch-failure case, reconciled so
/// the spooler's reactor sees a signaled exit and records Aborted rather
/// than Finished — see DESIGN.md).
fn run_supervisor(input_fd: RawFd, printer_fd: RawFd, stages: Vec<Vec<String>>) -> ! {
    // Best-effort: if this fails the supervisor is still its own pgid
    // leader by virtue of being a freshly forked process whose pid hasn't
    // joined any other group yet only if the spooler beat it to setpgid;
    // call it ourselves to be sure (spec §4.3 step 2).
    let _ = job_control::set_process_group(0, 0);
    let supervisor_pgid = match getpgid_self() {
        Ok(pgid) => pgid,
        Err(_) => unsafe { libc::_exit(1) },
    };

    let mut children: Vec<libc::pid_t> = Vec::new();
    // Owns the read end the next stage will consume; closed once handed off.
    let mut prev_read_fd = input_fd;
    let mut launch_failed = false;

    for (i, argv) in stages.iter().enumerate() {
        let is_last = i + 1 == stages.len();

        let (next_read_fd, stage_write_fd) = if is_last {
            (None, printer_fd)
        } else {
            match pipe() {
                Ok((reader, writer)) => (Some(reader.into_raw_fd()), writer.into_raw_fd()),
                Err(_) => {
                    launch_failed = true;
                    break;
                }
            }
        };

        let spawn_result = spawn_stage(argv, prev_read_fd, stage_write_fd, supervisor_pgid);

        // The child inherited its own copies across fork and dup2'd them
        // onto 0/1; the supervisor's copies are now unneeded regardless of
        // whether the spawn succeeded.
        unsafe { libc::close(prev_read_fd) };
        if !is_last {
            unsafe { libc::close(stage_write_fd) };
        }

        match spawn_result {
            Ok(pid) => {
                // Close the exec race: the child's own pre_exec setpgid
                // may not have run yet by the time we get here, so the
                // supervisor makes the same call on the child's behalf.
                // Whichever of the two calls loses (EACCES once the child
                // has already exec'd, ESRCH if it has already exited) is
                // harmless (spec §4.3 step 3).
                let _ = job_control::set_process_group(pid, supervisor_pgid);
                children.push(pid);
            }
            Err(_) => {
                launch_failed = true;
                if let Some(r) = next_read_fd {
                    unsafe { libc::close(r) };
                }
                break;
            }
        }

        prev_read_fd = next_read_fd.unwrap_or(-1);
    }

    if launch_failed {
        // Reap whatever we did manage to start, then signal them down.
        if let Ok(pgid) = getpgid_self() {
            let _ = job_control::send_signal_to_group(pgid, libc::SIGTERM);
        }
        for pid in &children {
            let _ = job_control::wait_for_exit(*pid);
        }
        unsafe { libc::raise(libc::SIGABRT) };
        unsafe { libc::_exit(1) };
    }

    let mut all_zero = true;
    for pid in &children {
        match job_control::wait_for_exit(*pid) {
            Ok(0) => {}
            _ => all_zero = false,
        }
    }

    unsafe { libc::_exit(if all_zero { 0 } else { 1 }) };
}

fn getpgid_self() -> io::Result<libc::pid_t> {
    let pgid = unsafe { libc::getpgid(0) };
    if pgid < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(pgid)
    }
}

/// Fork+exec one pipeline stage. `stdin_fd`/`stdout_fd` are dup2'd onto
/// 0/1 from inside `pre_exec`, after `Command`'s own stdio setup, so they
/// take precedence; PATH search is permitted (spec §4.3 step 4). The
/// stage joins `supervisor_pgid` before exec so it shares the job's
/// process group rather than leading a new one of its own.
fn spawn_stage(
    argv: &[String],
    stdin_fd: RawFd,
    stdout_fd: RawFd,
    supervisor_pgid: libc::pid_t,
) -> io::Result<libc::pid_t> {
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);

    unsafe {
        cmd.pre_exec(move || {
            if libc::setpgid(0, supervisor_pgid) != 0 {
                let err = io::Error::last_os_error();
                if err.raw_os_error() != Some(libc::EACCES) {
                    return Err(err);
                }
            }
            if libc::dup2(stdin_fd, 0) < 0 {
                return Err(io::Error::last_os_error());
            }
            if libc::dup2(stdout_fd, 1) < 0 {
                return Err(io::Error::last_os_error());
            }
            if stdin_fd > 2 {
                libc::close(stdin_fd);
            }
            if stdout_fd > 2 {
                libc::close(stdout_fd);
            }
            Ok(())
        });
    }

    let child = cmd.spawn()?;
    Ok(child.id() as libc::pid_t)
}

/// Validate an argv's program name resolves under `PATH` or is an
/// absolute/relative path, surfacing a clean error before any fork
/// happens. Not required for correctness (exec would fail anyway) but
/// keeps the common "typo'd converter program" case out of the
/// supervisor's signal-based failure path.
pub fn preflight_argv(argv: &[String]) -> Result<()> {
    if argv.is_empty() || argv[0].is_empty() {
        return Err(SpoolerError::LaunchFailed("empty argv".to_string()));
    }
    if argv[0].contains('/') {
        let c_path = CString::new(argv[0].as_bytes()).map_err(|_| {
            SpoolerError::LaunchFailed(format!("invalid program path: {}", argv[0]))
        })?;
        let accessible = unsafe { libc::access(c_path.as_ptr(), libc::X_OK) } == 0;
        return if accessible {
            Ok(())
        } else {
            Err(SpoolerError::LaunchFailed(format!(
                "not executable: {}",
                argv[0]
            )))
        };
    }
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(&argv[0]);
        let bytes = candidate.as_os_str().as_bytes();
        if let Ok(c_path) = CString::new(bytes) {
            if unsafe { libc::access(c_path.as_ptr(), libc::X_OK) } == 0 {
                return Ok(());
            }
        }
    }
    Err(SpoolerError::LaunchFailed(format!(
        "program not found in PATH: {}",
        argv[0]
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;

    #[test]
    fn stage_programs_empty_path_is_cat() {
        assert_eq!(stage_programs(&[]), vec!["cat".to_string()]);
    }

    #[test]
    fn stage_programs_lists_each_conversion_program() {
        let conversions = vec![
            Conversion {
                from: FileType::new("pdf"),
                to: FileType::new("ps"),
                argv: vec!["pdf2ps".to_string()],
            },
            Conversion {
                from: FileType::new("ps"),
                to: FileType::new("txt"),
                argv: vec!["ps2txt".to_string(), "-q".to_string()],
            },
        ];
        assert_eq!(
            stage_programs(&conversions),
            vec!["pdf2ps".to_string(), "ps2txt".to_string()]
        );
    }

    #[test]
    fn preflight_rejects_empty_argv() {
        assert!(preflight_argv(&[]).is_err());
    }

    #[test]
    fn preflight_finds_cat_on_path() {
        assert!(preflight_argv(&["cat".to_string()]).is_ok());
    }

    #[test]
    fn preflight_rejects_unknown_program() {
        assert!(preflight_argv(&["definitely-not-a-real-program-xyz".to_string()]).is_err());
    }
}
