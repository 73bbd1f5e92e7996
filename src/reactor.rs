//! Lifecycle Reactor (spec §4.5): the single consumer of asynchronous
//! child-state notifications. A signal handler does nothing but flip an
//! atomic flag (spec §5, §9 "signal-to-event bridge"); all reconciliation
//! happens on the main thread, mirroring the teacher's own
//! async-signal-safe-handler-plus-main-thread-reaping split in
//! `job_control`, just generalized from "one interactive foreground job"
//! to "drain every pending child-state change, for every tracked job".

use std::io;

use crate::job::JobStatus;
use crate::job_control::{self, ChildEvent};
use crate::events::EventSink;
use crate::printer::PrinterStatus;
use crate::printer_conn::PrinterConnector;
use crate::scheduler::Scheduler;

// No-op: the handler's only job is to exist. Installing it without
// SA_RESTART is what makes a blocking read of the command prompt return
// early (EINTR) the moment a child changes state, so `drain` always runs
// before the next prompt (spec §5 "no child event is indefinitely
// deferred"). The actual reaping happens on the main thread via
// `waitpid`, never here.
extern "C" fn on_sigchld(_signum: libc::c_int) {}

pub fn install() -> io::Result<()> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigchld as usize;
        libc::sigemptyset(&mut sa.sa_mask);
        sa.sa_flags = 0;
        if libc::sigaction(libc::SIGCHLD, &sa, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Drain every pending child-state change non-blockingly, reconcile
/// job/printer state for each, then run one scheduling pass (spec §4.5
/// "after draining events, call try_schedule()"). Called immediately
/// before the prompt blocks for input and immediately after a command
/// dispatch returns (spec §9).
pub fn drain(scheduler: &mut Scheduler, connector: &dyn PrinterConnector, sink: &mut dyn EventSink) {
    loop {
        match job_control::reap_any_nonblocking() {
            Ok(Some(event)) => reconcile(scheduler, event, sink),
            Ok(None) => break,
            Err(_) => break,
        }
    }
    scheduler.try_schedule(connector, sink);
}

fn reconcile(scheduler: &mut Scheduler, event: ChildEvent, sink: &mut dyn EventSink) {
    match event {
        ChildEvent::Stopped(pid) => {
            if let Some(job) = scheduler.jobs.find_by_pgid(pid) {
                if job.status == JobStatus::Running {
                    let id = job.id;
                    job.set_status(JobStatus::Paused);
                    sink.job_status(id, JobStatus::Paused);
                }
            }
        }
        ChildEvent::Continued(pid) => {
            if let Some(job) = scheduler.jobs.find_by_pgid(pid) {
                if job.status == JobStatus::Paused {
                    let id = job.id;
                    job.set_status(JobStatus::Running);
                    sink.job_status(id, JobStatus::Running);
                }
            }
        }
        ChildEvent::Exited(pid, code) => {
            finish(scheduler, pid, sink, JobStatus::Finished, |sink, id| {
                sink.job_finished(id, code);
            });
        }
        ChildEvent::Signaled(pid, sig) => {
            finish(scheduler, pid, sink, JobStatus::Aborted, |sink, id| {
                sink.job_aborted(id, sig);
            });
        }
    }
}

/// Common tail of `exited`/`signaled` handling: move the job to a
/// terminal state and free its printer, unless the job is already
/// terminal — the idempotency rule for a Cancel that raced this same
/// exit (spec §4.5 "must be a no-op beyond reaping").
fn finish(
    scheduler: &mut Scheduler,
    pgid: libc::pid_t,
    sink: &mut dyn EventSink,
    terminal: JobStatus,
    emit: impl FnOnce(&mut dyn EventSink, u64),
) {
    let Some(job) = scheduler.jobs.find_by_pgid(pgid) else {
        return;
    };
    if job.status.is_terminal() {
        return;
    }
    let id = job.id;
    let printer = job.assigned_printer;
    job.set_status(terminal);
    sink.job_status(id, terminal);
    emit(sink, id);

    if let Some(handle) = printer {
        scheduler.printers.set_status(handle, PrinterStatus::Idle);
        let name = scheduler.printers.get(handle).name.clone();
        sink.printer_status(&name, PrinterStatus::Idle);
    }
}
