use std::io;
use std::process::{Command, ExitStatus, Output};

pub fn exec(command: &str, args: &[&str]) -> Result<ExitStatus, io::Error> {
  log::debug!("Executing: {} {}", command, args.join(" "));
  Command::new(command).args(args).status()
}

pub fn exec_with_output(command: &str, args: &[&str]) -> Result<Output, io::Error> {
  log::debug!("Executing with output: {} {}", command, args.join(" "));
  Command::new(command).args(args).output()
}

/// Run a full command line through `sh -c`, for compound invocations.
pub fn shell(line: &str) -> Result<Output, io::Error> {
  log::debug!("Executing shell line: {line}");
  Command::new("sh").args(["-c", line]).output()
}

/// Run a command and hand back its stdout, turning a non-zero exit into an
/// error that carries the command name and stderr.
pub fn run_capture(command: &str, args: &[&str]) -> io::Result<String> {
  let output = exec_with_output(command, args)?;
  capture(command, output)
}

pub fn capture(command: &str, output: Output) -> io::Result<String> {
  if output.status.success() {
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  } else {
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(io::Error::other(format!(
      "{command} failed with {}: {}",
      output.status,
      stderr.trim()
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_capture_success() {
    let output = shell("echo hello").unwrap();
    assert_eq!(capture("echo", output).unwrap(), "hello\n");
  }

  #[test]
  fn test_capture_failure_carries_stderr() {
    let output = shell("echo nope >&2; exit 3").unwrap();
    let err = capture("probe", output).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("probe"));
    assert!(message.contains("nope"));
  }
}
