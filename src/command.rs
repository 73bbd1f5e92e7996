//! The CLI command table (spec §6). Grounded in the teacher's
//! `builtins::execute` dispatch-by-name shape, replacing the shell's
//! builtin set with the spooler's fixed command grammar. Every command
//! here calls exactly one of `sink.cmd_ok()` / `sink.cmd_error(...)`, per
//! spec §7's "every user command either fully succeeds ... or fails
//! ... leaving state unchanged" contract.

use crate::events::EventSink;
use crate::parser;
use crate::printer_conn::PrinterConnector;
use crate::scheduler::Scheduler;

pub enum DispatchOutcome {
    Continue,
    Quit,
}

/// Parse and run one input line. Blank lines are ignored (spec §6);
/// everything else produces exactly one outcome signal.
pub fn dispatch(
    line: &str,
    scheduler: &mut Scheduler,
    connector: &dyn PrinterConnector,
    sink: &mut dyn EventSink,
) -> DispatchOutcome {
    let Some(cmd) = parser::parse(line) else {
        return DispatchOutcome::Continue;
    };

    let outcome = match cmd.program.as_str() {
        "help" => run_help(&cmd.args, sink),
        "quit" => run_quit(&cmd.args, sink),
        "type" => run_type(&cmd.args, scheduler, sink),
        "conversion" => run_conversion(&cmd.args, scheduler, sink),
        "printer" => run_printer(&cmd.args, scheduler, sink),
        "enable" => run_enable(&cmd.args, scheduler, connector, sink),
        "disable" => run_disable(&cmd.args, sink),
        "printers" => run_printers(&cmd.args, scheduler, sink),
        "print" => run_print(&cmd.args, scheduler, connector, sink),
        "jobs" => run_jobs(&cmd.args, scheduler, sink),
        "cancel" => run_cancel(&cmd.args, scheduler, sink),
        "pause" => run_pause(&cmd.args, scheduler, sink),
        "resume" => run_resume(&cmd.args, scheduler, sink),
        other => {
            sink.cmd_error(&format!("unknown command: {other}"));
            DispatchOutcome::Continue
        }
    };

    scheduler.sweep(sink);
    outcome
}

const HELP_TEXT: &str = "commands: help quit type conversion printer enable disable printers print jobs cancel pause resume";

fn run_help(args: &[String], sink: &mut dyn EventSink) -> DispatchOutcome {
    if !args.is_empty() {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    }
    println!("{HELP_TEXT}");
    sink.cmd_ok();
    DispatchOutcome::Continue
}

fn run_quit(args: &[String], sink: &mut dyn EventSink) -> DispatchOutcome {
    if !args.is_empty() {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    }
    sink.cmd_ok();
    DispatchOutcome::Quit
}

fn run_type(args: &[String], scheduler: &mut Scheduler, sink: &mut dyn EventSink) -> DispatchOutcome {
    let [name] = args else {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    };
    match scheduler.types.declare_type(name) {
        Ok(_) => sink.cmd_ok(),
        Err(e) => sink.cmd_error(&e.to_string()),
    }
    DispatchOutcome::Continue
}

fn run_conversion(
    args: &[String],
    scheduler: &mut Scheduler,
    sink: &mut dyn EventSink,
) -> DispatchOutcome {
    if args.len() < 3 {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    }
    let from = &args[0];
    let to = &args[1];
    let argv = args[2..].to_vec();
    if let Err(e) = crate::pipeline::preflight_argv(&argv) {
        sink.cmd_error(&e.to_string());
        return DispatchOutcome::Continue;
    }
    match scheduler.types.declare_conversion(from, to, argv) {
        Ok(()) => sink.cmd_ok(),
        Err(e) => sink.cmd_error(&e.to_string()),
    }
    DispatchOutcome::Continue
}

fn run_printer(args: &[String], scheduler: &mut Scheduler, sink: &mut dyn EventSink) -> DispatchOutcome {
    let [name, type_name] = args else {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    };
    match scheduler.printers.add(name, type_name, &scheduler.types) {
        Ok(_) => {
            sink.printer_defined(name, type_name);
            sink.cmd_ok();
        }
        Err(e) => sink.cmd_error(&e.to_string()),
    }
    DispatchOutcome::Continue
}

fn run_enable(
    args: &[String],
    scheduler: &mut Scheduler,
    connector: &dyn PrinterConnector,
    sink: &mut dyn EventSink,
) -> DispatchOutcome {
    let [name] = args else {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    };
    match scheduler.printers.enable(name) {
        Ok(_) => {
            sink.printer_status(name, crate::printer::PrinterStatus::Idle);
            sink.cmd_ok();
            scheduler.try_schedule(connector, sink);
        }
        Err(e) => sink.cmd_error(&e.to_string()),
    }
    DispatchOutcome::Continue
}

fn run_disable(args: &[String], sink: &mut dyn EventSink) -> DispatchOutcome {
    let [_name] = args else {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    };
    // Reserved (spec §6): no Busy->Disabled transition exists (spec §3),
    // so there is nothing this command can safely do yet.
    sink.cmd_error("not implemented");
    DispatchOutcome::Continue
}

fn run_printers(args: &[String], scheduler: &mut Scheduler, sink: &mut dyn EventSink) -> DispatchOutcome {
    if !args.is_empty() {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    }
    for (handle, printer) in scheduler.printers.all() {
        println!(
            "PRINTER: id={}, name={}, type={}, status={}",
            handle.0,
            printer.name,
            printer.file_type.name(),
            printer.status.as_str()
        );
    }
    sink.cmd_ok();
    DispatchOutcome::Continue
}

fn run_print(
    args: &[String],
    scheduler: &mut Scheduler,
    connector: &dyn PrinterConnector,
    sink: &mut dyn EventSink,
) -> DispatchOutcome {
    let (path, explicit_printer) = match args {
        [path] => (path.as_str(), None),
        [path, printer] => (path.as_str(), Some(printer.as_str())),
        _ => {
            sink.cmd_error("wrong number of arguments");
            return DispatchOutcome::Continue;
        }
    };
    match scheduler.submit(path, explicit_printer, connector, sink) {
        Ok(_) => sink.cmd_ok(),
        Err(e) => sink.cmd_error(&e.to_string()),
    }
    DispatchOutcome::Continue
}

fn run_jobs(args: &[String], scheduler: &mut Scheduler, sink: &mut dyn EventSink) -> DispatchOutcome {
    if !args.is_empty() {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    }
    for job in scheduler.all_jobs() {
        println!(
            "JOB: id={}, path={}, status={}",
            job.id,
            job.input_path,
            job.status.as_str()
        );
    }
    sink.cmd_ok();
    DispatchOutcome::Continue
}

fn run_cancel(args: &[String], scheduler: &mut Scheduler, sink: &mut dyn EventSink) -> DispatchOutcome {
    let [id] = args else {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    };
    if let Some(id) = parse_job_id(id, sink) {
        match scheduler.cancel(id, sink) {
            Ok(()) => sink.cmd_ok(),
            Err(e) => sink.cmd_error(&e.to_string()),
        }
    }
    DispatchOutcome::Continue
}

fn run_pause(args: &[String], scheduler: &mut Scheduler, sink: &mut dyn EventSink) -> DispatchOutcome {
    let [id] = args else {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    };
    if let Some(id) = parse_job_id(id, sink) {
        match scheduler.pause(id) {
            Ok(()) => sink.cmd_ok(),
            Err(e) => sink.cmd_error(&e.to_string()),
        }
    }
    DispatchOutcome::Continue
}

fn run_resume(args: &[String], scheduler: &mut Scheduler, sink: &mut dyn EventSink) -> DispatchOutcome {
    let [id] = args else {
        sink.cmd_error("wrong number of arguments");
        return DispatchOutcome::Continue;
    };
    if let Some(id) = parse_job_id(id, sink) {
        match scheduler.resume(id) {
            Ok(()) => sink.cmd_ok(),
            Err(e) => sink.cmd_error(&e.to_string()),
        }
    }
    DispatchOutcome::Continue
}

fn parse_job_id(raw: &str, sink: &mut dyn EventSink) -> Option<u64> {
    match raw.parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            sink.cmd_error(&format!("invalid job id: {raw}"));
            None
        }
    }
}
