use std::io;
use std::path::Path;

use crate::utils::files;

pub const HOSTNAME_PATH: &str = "/etc/hostname";

/// Write the hostname file. An empty name is rejected before anything is
/// touched on disk.
pub fn save(name: &str, path: impl AsRef<Path>) -> io::Result<()> {
  if name.trim().is_empty() {
    return Err(io::Error::new(
      io::ErrorKind::InvalidInput,
      "hostname must not be empty",
    ));
  }
  files::write_file(path.as_ref(), name)?;
  log::info!("Set hostname to {name}");
  Ok(())
}

/// Read the stored hostname, trimmed of surrounding whitespace.
pub fn read(path: impl AsRef<Path>) -> io::Result<String> {
  let content = files::read_file(path.as_ref())?;
  Ok(String::from(content.trim()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_save_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hostname");
    save("setup.hostname", &path).unwrap();
    assert_eq!(read(&path).unwrap(), "setup.hostname");
  }

  #[test]
  fn test_read_trims_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hostname");
    std::fs::write(&path, "setup.hostname\n").unwrap();
    assert_eq!(read(&path).unwrap(), "setup.hostname");
  }

  #[test]
  fn test_save_rejects_empty_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hostname");
    assert!(save("", &path).is_err());
    assert!(save("   ", &path).is_err());
    assert!(!path.exists());
  }
}
