//! Job Store & Scheduler (spec §4.4): matches Created jobs to idle
//! compatible printers, drives pipeline launches, and answers the
//! pause/resume/cancel/sweep commands. Owns the two stores for the
//! spooler's lifetime, the way the teacher's `JobTable` is the single
//! owned container threaded through `main`/`executor`.

use crate::error::{Result, SpoolerError};
use crate::events::EventSink;
use crate::job::{Job, JobStatus, JobStore};
use crate::job_control;
use crate::pipeline;
use crate::printer::{PrinterHandle, PrinterRegistry, PrinterStatus};
use crate::printer_conn::PrinterConnector;
use crate::registry::TypeRegistry;
use std::time::{Duration, Instant};

pub struct Scheduler {
    pub jobs: JobStore,
    pub printers: PrinterRegistry,
    pub types: TypeRegistry,
    retention: Duration,
}

impl Scheduler {
    pub fn new(max_jobs: usize, max_printers: usize, retention: Duration) -> Self {
        Self {
            jobs: JobStore::new(max_jobs),
            printers: PrinterRegistry::new(max_printers),
            types: TypeRegistry::new(),
            retention,
        }
    }

    /// `submit(path, printer_or_none)` (spec §4.4).
    pub fn submit(
        &mut self,
        path: &str,
        explicit_printer: Option<&str>,
        connector: &dyn PrinterConnector,
        sink: &mut dyn EventSink,
    ) -> Result<u64> {
        if path.is_empty() {
            return Err(SpoolerError::EmptyPath);
        }
        if self.jobs.is_full() {
            return Err(SpoolerError::Full);
        }
        let from_type = self
            .types
            .infer_from_path(path)
            .ok_or_else(|| SpoolerError::UndeclaredFileType(path.to_string()))?
            .clone();

        let explicit_handle = match explicit_printer {
            None => None,
            Some(name) => {
                let handle = self
                    .printers
                    .lookup(name)
                    .ok_or_else(|| SpoolerError::UnknownPrinter(name.to_string()))?;
                let printer = self.printers.get(handle);
                if printer.status != PrinterStatus::Idle {
                    return Err(SpoolerError::PrinterNotIdle(name.to_string()));
                }
                let compatible = printer.file_type == from_type
                    || self
                        .types
                        .find_path(from_type.name(), printer.file_type.name())
                        .is_some();
                if !compatible {
                    return Err(SpoolerError::NoConversionPath {
                        from: from_type.name().to_string(),
                        to: printer.file_type.name().to_string(),
                    });
                }
                Some(handle)
            }
        };

        let id = self.jobs.create(path.to_string());
        sink.job_created(id, path, from_type.name());

        match explicit_handle {
            None => {
                sink.job_status(id, JobStatus::Created);
                self.try_schedule(connector, sink);
            }
            Some(handle) => {
                if let Err(e) = self.launch_job(id, handle, connector, sink) {
                    self.jobs.remove(id);
                    return Err(e);
                }
            }
        }

        Ok(id)
    }

    /// `try_schedule()` (spec §4.4): one pass over Created jobs in id
    /// order, dispatching each to the first compatible idle printer.
    pub fn try_schedule(&mut self, connector: &dyn PrinterConnector, sink: &mut dyn EventSink) {
        for id in self.jobs.created_jobs_sorted() {
            let Some(job) = self.jobs.get(id) else { continue };
            let from_type = match self.types.infer_from_path(&job.input_path) {
                Some(t) => t.clone(),
                None => continue,
            };
            let Some(handle) = self.printers.select_compatible(&from_type, &self.types) else {
                continue;
            };
            let _ = self.launch_job(id, handle, connector, sink);
        }
    }

    /// Resolve a conversion path and launch the pipeline for `id` on
    /// `handle`, updating job/printer state and emitting events on
    /// success. On failure, the job is left untouched (still Created) so
    /// the caller can decide whether to discard it (explicit-printer
    /// submission) or leave it for the next scheduling pass.
    fn launch_job(
        &mut self,
        id: u64,
        handle: PrinterHandle,
        connector: &dyn PrinterConnector,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let job = self
            .jobs
            .get(id)
            .ok_or(SpoolerError::UnknownJob(id))?;
        let from_type = self
            .types
            .infer_from_path(&job.input_path)
            .ok_or_else(|| SpoolerError::UndeclaredFileType(job.input_path.clone()))?
            .clone();
        let printer = self.printers.get(handle);
        let conversions = self
            .types
            .find_path(from_type.name(), printer.file_type.name())
            .ok_or_else(|| SpoolerError::NoConversionPath {
                from: from_type.name().to_string(),
                to: printer.file_type.name().to_string(),
            })?;
        let printer_name = printer.name.clone();
        let printer_type = printer.file_type.name().to_string();
        let input_path = job.input_path.clone();

        let pid = pipeline::launch(
            &input_path,
            &conversions,
            &printer_name,
            &printer_type,
            connector,
        )?;

        let stage_names = pipeline::stage_programs(&conversions);
        let job = self.jobs.get_mut(id).expect("job present during launch");
        job.assigned_printer = Some(handle);
        job.pgid = Some(pid);
        job.set_status(JobStatus::Running);
        self.printers.set_status(handle, PrinterStatus::Busy);

        sink.job_status(id, JobStatus::Running);
        sink.printer_status(&printer_name, PrinterStatus::Busy);
        sink.job_started(id, &printer_name, pid, &stage_names);
        Ok(())
    }

    /// `cancel(id)` (spec §4.4).
    pub fn cancel(&mut self, id: u64, sink: &mut dyn EventSink) -> Result<()> {
        let job = self.jobs.get_mut(id).ok_or(SpoolerError::UnknownJob(id))?;
        match job.status {
            JobStatus::Created => {
                job.set_status(JobStatus::Aborted);
                sink.job_status(id, JobStatus::Aborted);
                sink.job_aborted(id, 0);
                Ok(())
            }
            JobStatus::Running | JobStatus::Paused => {
                let pgid = job.pgid.expect("running/paused job has a pgid");
                let was_paused = job.status == JobStatus::Paused;
                let printer = job.assigned_printer;
                job.set_status(JobStatus::Aborted);

                if was_paused {
                    let _ = job_control::send_signal_to_group(pgid, libc::SIGCONT);
                }
                let _ = job_control::send_signal_to_group(pgid, libc::SIGTERM);

                if let Some(handle) = printer {
                    self.printers.set_status(handle, PrinterStatus::Idle);
                    let name = self.printers.get(handle).name.clone();
                    sink.printer_status(&name, PrinterStatus::Idle);
                }
                sink.job_status(id, JobStatus::Aborted);
                sink.job_aborted(id, 0);
                Ok(())
            }
            JobStatus::Finished | JobStatus::Aborted => {
                Err(SpoolerError::InvalidState("job already terminal".to_string()))
            }
        }
    }

    /// `pause(id)`: only if Running. Status change deferred to the
    /// reactor, which observes the stop (spec §4.4).
    pub fn pause(&mut self, id: u64) -> Result<()> {
        let job = self.jobs.get(id).ok_or(SpoolerError::UnknownJob(id))?;
        if job.status != JobStatus::Running {
            return Err(SpoolerError::InvalidState("job is not running".to_string()));
        }
        let pgid = job.pgid.expect("running job has a pgid");
        job_control::send_signal_to_group(pgid, libc::SIGSTOP)
            .map_err(|e| SpoolerError::LaunchFailed(e.to_string()))
    }

    /// `resume(id)`: only if Paused. Status change deferred to the
    /// reactor (spec §4.4).
    pub fn resume(&mut self, id: u64) -> Result<()> {
        let job = self.jobs.get(id).ok_or(SpoolerError::UnknownJob(id))?;
        if job.status != JobStatus::Paused {
            return Err(SpoolerError::InvalidState("job is not paused".to_string()));
        }
        let pgid = job.pgid.expect("paused job has a pgid");
        job_control::send_signal_to_group(pgid, libc::SIGCONT)
            .map_err(|e| SpoolerError::LaunchFailed(e.to_string()))
    }

    /// `sweep()` (spec §4.4): delete terminal jobs past their retention
    /// window. Invoked after every user command completes.
    pub fn sweep(&mut self, sink: &mut dyn EventSink) {
        let now = Instant::now();
        for id in self.jobs.expired(self.retention, now) {
            self.jobs.remove(id);
            sink.job_deleted(id);
        }
    }

    pub fn job(&self, id: u64) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn all_jobs(&self) -> Vec<&Job> {
        self.jobs.all_sorted()
    }
}
