use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

pub fn read_file(path: &Path) -> io::Result<String> {
  log::debug!("Read {}", path.display());
  fs::read_to_string(path)
}

/// Write through a temp file in the target directory, then rename over the
/// destination, so a failed write never leaves a truncated config file.
pub fn write_file(path: &Path, content: &str) -> io::Result<()> {
  log::info!("Write {}", path.display());
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  let mut tmp = NamedTempFile::new_in(dir)?;
  tmp.write_all(content.as_bytes())?;
  tmp.persist(path).map_err(|e| e.error)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hostname");
    write_file(&path, "setup.hostname").unwrap();
    assert_eq!(read_file(&path).unwrap(), "setup.hostname");
  }

  #[test]
  fn test_write_replaces_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts");
    write_file(&path, "first").unwrap();
    write_file(&path, "second").unwrap();
    assert_eq!(read_file(&path).unwrap(), "second");
  }

  #[test]
  fn test_read_missing_file() {
    assert!(read_file(Path::new("/nonexistent/hostname")).is_err());
  }
}
