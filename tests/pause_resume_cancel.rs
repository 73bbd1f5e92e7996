//! Pause / resume / cancel end-to-end (spec §8 scenario 4): a
//! long-running pipeline stage (`sleep 5`) gives the reactor room to
//! observe each process-group signal before the job finishes on its own.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

fn unique_dir(label: &str) -> std::path::PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("printspoold_{label}_{}_{n}", std::process::id()))
}

fn run_spooler(spool_dir: &std::path::Path, lines: &[(&str, u64)]) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_printspoold"))
        .env("SPOOLD_SPOOL_DIR", spool_dir)
        .env("SPOOLD_RETENTION_SECS", "60")
        .env("RUST_LOG", "error")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn printspoold");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        for (line, pause_ms) in lines {
            writeln!(stdin, "{line}").expect("write line");
            let _ = stdin.flush();
            std::thread::sleep(Duration::from_millis(*pause_ms));
        }
        writeln!(stdin, "quit").expect("write quit");
    }

    let output = child.wait_with_output().expect("wait output");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn pause_resume_then_cancel_ends_aborted() {
    let spool_dir = unique_dir("pause_resume_cancel");
    let input_dir = unique_dir("pause_resume_cancel_input");
    std::fs::create_dir_all(&input_dir).unwrap();
    let doc = input_dir.join("doc.pdf");
    std::fs::write(&doc, b"irrelevant").unwrap();

    let stdout = run_spooler(
        &spool_dir,
        &[
            ("type pdf", 50),
            ("type raw", 50),
            ("conversion pdf raw sleep 5", 50),
            ("printer p raw", 50),
            ("enable p", 50),
            (&format!("print {} p", doc.display()), 300),
            ("pause 0", 300),
            ("jobs", 50),
            ("resume 0", 300),
            ("jobs", 50),
            ("cancel 0", 50),
            ("jobs", 50),
        ],
    );

    assert!(stdout.contains("job_status 0 running"), "stdout was: {stdout}");
    assert!(stdout.contains("job_status 0 paused"), "stdout was: {stdout}");
    // A second "running" after resume, distinct from the first.
    assert_eq!(
        stdout.matches("job_status 0 running").count(),
        2,
        "expected Running after both launch and resume, stdout was: {stdout}"
    );
    assert!(stdout.contains("job_status 0 aborted"), "stdout was: {stdout}");
    assert!(stdout.contains("job_aborted 0"), "stdout was: {stdout}");
    assert!(
        stdout.contains("printer_status p idle"),
        "printer must free on cancel, stdout was: {stdout}"
    );

    let _ = std::fs::remove_dir_all(&spool_dir);
    let _ = std::fs::remove_dir_all(&input_dir);
}

#[test]
fn cancel_created_job_is_immediate_no_printer_change() {
    let spool_dir = unique_dir("cancel_created");
    let input_dir = unique_dir("cancel_created_input");
    std::fs::create_dir_all(&input_dir).unwrap();
    let doc = input_dir.join("doc.pdf");
    std::fs::write(&doc, b"irrelevant").unwrap();

    let stdout = run_spooler(
        &spool_dir,
        &[
            ("type pdf", 50),
            (&format!("print {}", doc.display()), 50),
            ("cancel 0", 50),
            ("jobs", 50),
        ],
    );

    assert!(stdout.contains("job_status 0 created"), "stdout was: {stdout}");
    assert!(stdout.contains("job_status 0 aborted"), "stdout was: {stdout}");
    assert!(stdout.contains("job_aborted 0 0"), "stdout was: {stdout}");
    assert!(
        !stdout.contains("printer_status"),
        "no printer was ever assigned, stdout was: {stdout}"
    );

    let _ = std::fs::remove_dir_all(&spool_dir);
    let _ = std::fs::remove_dir_all(&input_dir);
}
