use crate::job::JobStatus;
use crate::printer::PrinterStatus;

/// Test-observation event sink (spec §6). This is the externally-provided
/// collaborator the spec calls out as out of scope; a concrete default
/// (`StdoutEventSink`) and a recording stand-in for tests live here so the
/// rest of the core has something concrete to call at every transition
/// point named in spec §4.
pub trait EventSink {
    fn printer_defined(&mut self, name: &str, type_name: &str);
    fn printer_status(&mut self, name: &str, status: PrinterStatus);
    fn job_created(&mut self, id: u64, path: &str, from_type: &str);
    fn job_status(&mut self, id: u64, status: JobStatus);
    fn job_started(&mut self, id: u64, printer: &str, pgid: i32, stage_programs: &[String]);
    fn job_finished(&mut self, id: u64, code: i32);
    fn job_aborted(&mut self, id: u64, signal: i32);
    fn job_deleted(&mut self, id: u64);
    fn cmd_ok(&mut self);
    fn cmd_error(&mut self, message: &str);
}

/// Default sink: one line per event on stdout, for interactive use.
#[derive(Default)]
pub struct StdoutEventSink;

impl EventSink for StdoutEventSink {
    fn printer_defined(&mut self, name: &str, type_name: &str) {
        println!("printer_defined {name} {type_name}");
    }

    fn printer_status(&mut self, name: &str, status: PrinterStatus) {
        println!("printer_status {name} {}", status.as_str());
    }

    fn job_created(&mut self, id: u64, path: &str, from_type: &str) {
        println!("job_created {id} {path} {from_type}");
    }

    fn job_status(&mut self, id: u64, status: JobStatus) {
        println!("job_status {id} {}", status.as_str());
    }

    fn job_started(&mut self, id: u64, printer: &str, pgid: i32, stage_programs: &[String]) {
        println!(
            "job_started {id} {printer} {pgid} {}",
            stage_programs.join(",")
        );
    }

    fn job_finished(&mut self, id: u64, code: i32) {
        println!("job_finished {id} {code}");
    }

    fn job_aborted(&mut self, id: u64, signal: i32) {
        println!("job_aborted {id} {signal}");
    }

    fn job_deleted(&mut self, id: u64) {
        println!("job_deleted {id}");
    }

    fn cmd_ok(&mut self) {
        println!("cmd_ok");
    }

    fn cmd_error(&mut self, message: &str) {
        println!("cmd_error {message}");
    }
}

/// A single emitted event, recorded verbatim for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PrinterDefined { name: String, type_name: String },
    PrinterStatus { name: String, status: String },
    JobCreated { id: u64, path: String, from_type: String },
    JobStatus { id: u64, status: String },
    JobStarted { id: u64, printer: String, pgid: i32, stage_programs: Vec<String> },
    JobFinished { id: u64, code: i32 },
    JobAborted { id: u64, signal: i32 },
    JobDeleted { id: u64 },
    CmdOk,
    CmdError { message: String },
}

/// In-memory event sink used by tests to assert on the exact emission
/// sequence rather than scraping stdout text.
#[derive(Default)]
pub struct RecordingEventSink {
    pub events: Vec<Event>,
}

impl EventSink for RecordingEventSink {
    fn printer_defined(&mut self, name: &str, type_name: &str) {
        self.events.push(Event::PrinterDefined {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
    }

    fn printer_status(&mut self, name: &str, status: PrinterStatus) {
        self.events.push(Event::PrinterStatus {
            name: name.to_string(),
            status: status.as_str().to_string(),
        });
    }

    fn job_created(&mut self, id: u64, path: &str, from_type: &str) {
        self.events.push(Event::JobCreated {
            id,
            path: path.to_string(),
            from_type: from_type.to_string(),
        });
    }

    fn job_status(&mut self, id: u64, status: JobStatus) {
        self.events.push(Event::JobStatus {
            id,
            status: status.as_str().to_string(),
        });
    }

    fn job_started(&mut self, id: u64, printer: &str, pgid: i32, stage_programs: &[String]) {
        self.events.push(Event::JobStarted {
            id,
            printer: printer.to_string(),
            pgid,
            stage_programs: stage_programs.to_vec(),
        });
    }

    fn job_finished(&mut self, id: u64, code: i32) {
        self.events.push(Event::JobFinished { id, code });
    }

    fn job_aborted(&mut self, id: u64, signal: i32) {
        self.events.push(Event::JobAborted { id, signal });
    }

    fn job_deleted(&mut self, id: u64) {
        self.events.push(Event::JobDeleted { id });
    }

    fn cmd_ok(&mut self) {
        self.events.push(Event::CmdOk);
    }

    fn cmd_error(&mut self, message: &str) {
        self.events.push(Event::CmdError {
            message: message.to_string(),
        });
    }
}
