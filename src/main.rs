mod command;
mod config;
mod error;
mod events;
mod job;
mod job_control;
mod parser;
mod pipeline;
mod printer;
mod printer_conn;
mod reactor;
mod registry;
mod scheduler;
mod types;

use std::io::{self, Write};

use command::DispatchOutcome;
use config::Config;
use events::StdoutEventSink;
use printer_conn::SpoolFileConnector;
use scheduler::Scheduler;

fn main() {
    env_logger::init();

    let config = Config::from_env();
    log::info!(
        "starting printspoold: max_printers={} max_jobs={} spool_dir={:?} retention={:?}",
        config.max_printers,
        config.max_jobs,
        config.spool_dir,
        config.retention
    );

    if let Err(e) = reactor::install() {
        eprintln!("printspoold: failed to install SIGCHLD handler: {e}");
        std::process::exit(1);
    }

    let connector = match SpoolFileConnector::new(config.spool_dir.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("printspoold: failed to initialize spool directory: {e}");
            std::process::exit(1);
        }
    };

    let mut scheduler = Scheduler::new(config.max_jobs, config.max_printers, config.retention);
    let mut sink = StdoutEventSink;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        reactor::drain(&mut scheduler, &connector, &mut sink);

        print!("spool> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => {
                break;
            }
            Ok(_) => {
                let line = input.trim();
                if line.is_empty() {
                    continue;
                }
                match command::dispatch(line, &mut scheduler, &connector, &mut sink) {
                    DispatchOutcome::Continue => {}
                    DispatchOutcome::Quit => break,
                }
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {
                continue;
            }
            Err(error) => {
                eprintln!("printspoold: error reading input: {error}");
                break;
            }
        }
    }

    std::process::exit(0);
}
