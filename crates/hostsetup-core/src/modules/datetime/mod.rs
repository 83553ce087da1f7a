use std::io;

use chrono::{DateTime, Local};

use crate::utils::exec;

pub const DEFAULT_FORMAT: &str = "+\"%Y-%m-%dT%H:%M:%S%z\"";
pub const DEFAULT_NTP_SERVER: &str = "ntp.ubuntu.com";

/// Query the system time through `date`, with an optional format argument.
/// Goes through the shell so quoting in the format behaves as on a prompt.
pub fn get(format: Option<&str>) -> io::Result<String> {
  let format = format.unwrap_or(DEFAULT_FORMAT);
  let output = exec::shell(&format!("date {format}"))?;
  exec::capture("date", output)
}

// System clock first, then the hardware clock, in one shell invocation.
fn set_command(time: &str) -> String {
  format!("date --set=\"{time}\"; hwclock --systohc;")
}

/// Set the system time and sync the hardware clock to it.
pub fn set(time: &str) -> io::Result<String> {
  if time.trim().is_empty() {
    return Err(io::Error::new(
      io::ErrorKind::InvalidInput,
      "time must not be empty",
    ));
  }
  let output = exec::shell(&set_command(time))?;
  exec::capture("date --set", output)
}

/// Set the clocks from a chrono value.
pub fn set_datetime(datetime: DateTime<Local>) -> io::Result<String> {
  set(&format_datetime(&datetime))
}

fn format_datetime(datetime: &DateTime<Local>) -> String {
  datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Sync date and time from an NTP server.
pub fn ntp_synchronize(server: Option<&str>) -> io::Result<String> {
  let server = server.unwrap_or(DEFAULT_NTP_SERVER);
  log::info!("Synchronizing time from {server}");
  let output = exec::exec_with_output("ntpdate", &[server])?;
  exec::capture("ntpdate", output)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_set_command_shape() {
    assert_eq!(
      set_command("2012-10-30 18:17:16"),
      "date --set=\"2012-10-30 18:17:16\"; hwclock --systohc;"
    );
  }

  #[test]
  fn test_set_rejects_empty_time() {
    assert!(set("").is_err());
    assert!(set("  ").is_err());
  }

  #[test]
  fn test_format_datetime() {
    use chrono::TimeZone;
    let datetime = Local.with_ymd_and_hms(2012, 10, 30, 18, 17, 16).unwrap();
    assert_eq!(format_datetime(&datetime), "2012-10-30 18:17:16");
  }

  #[test]
  fn test_get_uses_shell_quoting() {
    // the default format's quotes are consumed by the shell, not printed
    let stamp = get(None).unwrap();
    assert!(!stamp.contains('"'));
    assert!(stamp.contains('T'));
  }
}
