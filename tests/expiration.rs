//! Job expiration (spec §8 scenario 6): a Finished job must still be
//! listed by `jobs` inside the retention window, and be gone
//! (`job_deleted` emitted) once a command runs after the window elapses.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

fn unique_dir(label: &str) -> std::path::PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("printspoold_{label}_{}_{n}", std::process::id()))
}

fn run_spooler(spool_dir: &std::path::Path, retention_secs: u64, lines: &[(&str, u64)]) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_printspoold"))
        .env("SPOOLD_SPOOL_DIR", spool_dir)
        .env("SPOOLD_RETENTION_SECS", retention_secs.to_string())
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
fn finished_job_survives_within_retention_then_is_deleted() {
    let spool_dir = unique_dir("expiration");
    let input_dir = unique_dir("expiration_input");
    std::fs::create_dir_all(&input_dir).unwrap();
    let doc = input_dir.join("doc.pdf");
    std::fs::write(&doc, b"irrelevant").unwrap();

    let stdout = run_spooler(
        &spool_dir,
        1,
        &[
            ("type pdf", 50),
            ("printer alice pdf", 50),
            ("enable alice", 50),
            (&format!("print {} alice", doc.display()), 300),
            ("jobs", 50),
            // Past the 1s retention window; the next command's sweep()
            // must delete it.
            ("jobs", 1200),
        ],
    );

    assert!(
        stdout.contains("job_status 0 finished"),
        "stdout was: {stdout}"
    );
    assert_eq!(
        stdout.matches("JOB: id=0,").count(),
        1,
        "job should be listed exactly once, before it expires; stdout was: {stdout}"
    );
    assert!(
        stdout.contains("job_deleted 0"),
        "job should be deleted once its retention window elapses, stdout was: {stdout}"
    );

    let _ = std::fs::remove_dir_all(&spool_dir);
    let _ = std::fs::remove_dir_all(&input_dir);
}
