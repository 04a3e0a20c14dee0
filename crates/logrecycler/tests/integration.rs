//! Integration tests for logrecycler
//!
//! These tests run the built binary end to end, through a pipe or with a
//! wrapped command.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Working directory holding `logrecycler.yaml` with `config`
    fn new(config: &str) -> Self {
        let fixture = Self::without_config();
        std::fs::write(fixture.dir.path().join("logrecycler.yaml"), config).unwrap();
        fixture
    }

    fn without_config() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_logrecycler"));
        cmd.current_dir(self.dir.path())
            .env_remove("LOGRECYCLER_CONFIG")
            .env_remove("LOGRECYCLER_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn pipe(&self, input: &str) -> Output {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        // Setup errors may close our stdin before anything is read
        let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
        child.wait_with_output().unwrap()
    }

    fn wrap(&self, argv: &[&str]) -> Output {
        self.command()
            .arg("--")
            .args(argv)
            .stdin(Stdio::null())
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

/// Running, not merely an unreaped zombie
fn is_alive(pid: i32) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| {
            let (_, rest) = stat.rsplit_once(')')?;
            rest.trim_start().chars().next()
        })
        .is_some_and(|state| state != 'Z' && state != 'X')
}

/// Live processes whose process group is `pgid`
fn group_members(pgid: i32) -> Vec<i32> {
    std::fs::read_dir("/proc")
        .unwrap()
        .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<i32>().ok())
        .filter(|&pid| {
            std::fs::read_to_string(format!("/proc/{pid}/stat"))
                .ok()
                .and_then(|stat| {
                    let (_, rest) = stat.rsplit_once(')')?;
                    // state ppid pgrp ...
                    rest.split_whitespace().nth(2)?.parse::<i32>().ok()
                })
                == Some(pgid)
        })
        .filter(|&pid| is_alive(pid))
        .collect()
}

/// Value of the `message` field of a record with no other fields
fn message(record: &str) -> &str {
    record
        .strip_prefix("{\"message\":\"")
        .and_then(|rest| rest.strip_suffix("\"}"))
        .unwrap()
}

fn wait_until_gone(pid: i32) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while is_alive(pid) {
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    true
}

#[test]
fn test_piped_lines_without_patterns() {
    let output = Fixture::new("").pipe("hi\n12\n\n");
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "{\"message\":\"hi\"}\n{\"message\":\"12\"}\n{\"message\":\"\"}\n"
    );
}

#[test]
fn test_piped_lines_escape_quotes() {
    let output = Fixture::new("").pipe("hi\"foo\n");
    assert_eq!(stdout(&output), "{\"message\":\"hi\\\"foo\"}\n");
}

#[test]
fn test_piped_lines_with_patterns() {
    let fixture = Fixture::new(
        r#"
preprocess: '(?P<level>[A-Z]+) (?P<message>.*)'
patterns:
- regex: healthcheck
  discard: true
- regex: 'user (?P<user>\S+)'
  name: login
  add:
    event: login
"#,
    );
    let output = fixture.pipe("INFO user bob\nINFO GET /healthcheck\nWARN disk full\n");

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        concat!(
            "{\"message\":\"user bob\",\"level\":\"INFO\",\"user\":\"bob\",\"event\":\"login\"}\n",
            "{\"message\":\"disk full\",\"level\":\"WARN\"}\n"
        )
    );
}

#[test]
fn test_config_path_flag() {
    let fixture = Fixture::without_config();
    let config = fixture.dir.path().join("custom.yaml");
    std::fs::write(&config, "patterns:\n- regex: hi\n  add:\n    foo: bar\n").unwrap();

    let mut child = fixture
        .command()
        .arg("--config")
        .arg(&config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"hi\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(stdout(&output), "{\"message\":\"hi\",\"foo\":\"bar\"}\n");
}

#[test]
fn test_command_exit_code_is_mirrored() {
    let output = Fixture::new("").wrap(&["sh", "-c", "exit 13"]);
    assert_eq!(output.status.code(), Some(13));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_command_output_is_transformed() {
    let fixture = Fixture::new("patterns:\n- regex: 'took (?P<ms>\\d+)ms'\n");
    let output = fixture.wrap(&["sh", "-c", "echo took 5ms; echo oops >&2"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "{\"message\":\"took 5ms\",\"ms\":\"5\"}\n");
    assert_eq!(stderr(&output), "oops\n");
}

#[test]
fn test_command_output_is_streamed() {
    let fixture = Fixture::new("");
    let started = Instant::now();
    let mut child = fixture
        .command()
        .args(["--", "sh", "-c", "echo 1; sleep 1; echo 2"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let mut arrivals = Vec::new();
    for line in BufReader::new(child.stdout.take().unwrap()).lines() {
        line.unwrap();
        arrivals.push(Instant::now());
    }
    assert!(child.wait().unwrap().success());

    assert_eq!(arrivals.len(), 2);
    assert!(arrivals[1] - arrivals[0] >= Duration::from_millis(900));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_externally_killed_command_exits_255() {
    let output = Fixture::new("").wrap(&["sh", "-c", "kill -KILL $$"]);
    assert_eq!(output.status.code(), Some(255));
}

#[test]
fn test_background_descendants_are_killed() {
    let output = Fixture::new("patterns:\n- regex: '(?P<pid>\\d+)'\n")
        .wrap(&["sh", "-c", "sleep 30 & echo $!"]);
    assert!(output.status.success());

    let out = stdout(&output);
    let pid: i32 = out
        .split("\"pid\":\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap()
        .parse()
        .unwrap();
    assert!(wait_until_gone(pid));
}

#[test]
fn test_forwarded_sigterm_exits_255() {
    let fixture = Fixture::new("");
    let mut child = fixture
        .command()
        .args(["--", "sh", "-c", "echo $$; exec sleep 30"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();
    let wrapped: i32 = message(&lines.next().unwrap().unwrap()).parse().unwrap();

    kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM).unwrap();
    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(255));
    assert!(wait_until_gone(wrapped));
}

#[test]
fn test_external_kill_of_long_running_command() {
    let fixture = Fixture::new("");
    let mut child = fixture
        .command()
        .args(["--", "sh", "-c", "sleep 30 & echo $$ $!; exec sleep 30"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();
    let first = lines.next().unwrap().unwrap();
    let pids: Vec<i32> = message(&first)
        .split_whitespace()
        .map(|pid| pid.parse().unwrap())
        .collect();
    let (wrapped, background) = (pids[0], pids[1]);
    assert!(is_alive(wrapped));
    assert!(is_alive(background));

    // The wrapped command leads its own group
    kill(Pid::from_raw(wrapped), Signal::SIGKILL).unwrap();

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(255));
    assert!(wait_until_gone(wrapped));
    assert!(wait_until_gone(background));
    assert!(group_members(wrapped).is_empty());
}

#[test]
fn test_piped_input_and_command_conflict() {
    let fixture = Fixture::new("");
    let mut child = fixture
        .command()
        .args(["--", "echo", "hi"])
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdin.take());
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output),
        "Error: logrecycler: cannot read piped logs and run a command at the same time\n"
    );
}

#[test]
fn test_missing_input() {
    let output = Fixture::new("")
        .command()
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("pipe logs"));
}

#[test]
fn test_unknown_config_field() {
    let output = Fixture::new("wut: true\n").pipe("hi\n");
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr(&output), "Error: field wut not found\n");
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_invalid_regex() {
    let output = Fixture::new("patterns:\n- regex: '((((WUT'\n").pipe("hi\n");
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("Error: regular expression from patterns[0].regex: error parsing regexp: "));
    assert!(err.trim_end().ends_with("`((((WUT`"));
}

#[test]
fn test_invalid_preprocess_regex() {
    let output = Fixture::new("preprocess: '((((WUT'\n").pipe("hi\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: regular expression from preprocess: "));
}

#[test]
fn test_missing_config_file() {
    let output = Fixture::without_config().pipe("hi\n");
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output),
        "Error: open logrecycler.yaml: no such file or directory\n"
    );
}

#[test]
fn test_missing_executable() {
    let output = Fixture::new("").wrap(&["wuuut-not-a-command"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("executable file not found"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    let output = Fixture::without_config()
        .command()
        .arg("--wut")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    // Rejected before the (missing) config file is opened
    let err = stderr(&output);
    assert!(err.contains("--wut"));
    assert!(!err.contains("no such file or directory"));
}

#[test]
fn test_version() {
    let output = Fixture::without_config()
        .command()
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        format!("logrecycler {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_help() {
    let output = Fixture::without_config()
        .command()
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("logrecycler"));
}
