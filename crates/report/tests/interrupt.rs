//! Interrupt cleanup integration test
//!
//! Spawns the real `report` binary against a runner that writes its log
//! and then stalls, interrupts it mid-run, and checks that the temporary
//! result log was scrubbed anyway.

#![cfg(unix)]

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[test]
fn interrupt_mid_run_still_scrubs_the_result_log() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("roots")).unwrap();
    // The fake runner writes the result log immediately, then hangs long
    // enough for the test to deliver the interrupt.
    fs::write(
        dir.path().join("report.toml"),
        r#"
[runner]
program = "sh"
args = ["-c", "echo '{\"tests\":[]}' > {report}; sleep 30"]
roots = ["roots"]
result_log = "result_log.json"
scrub = []

[report]
open_when_done = false
"#,
    )
    .unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_report"))
        .args(["--config", "report.toml", "--no-open"])
        .current_dir(dir.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Once the log exists the pipeline is mid-run and the handler is
    // long since installed.
    let log = dir.path().join("result_log.json");
    let deadline = Instant::now() + Duration::from_secs(10);
    while !log.exists() {
        assert!(
            Instant::now() < deadline,
            "fake runner never wrote the result log"
        );
        std::thread::sleep(Duration::from_millis(25));
    }

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();
    let status = child.wait().unwrap();

    assert!(!status.success());
    assert!(!log.exists(), "interrupt left the result log behind");
}
