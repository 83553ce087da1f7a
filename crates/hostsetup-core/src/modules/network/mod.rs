pub mod interfaces;

use std::io;
use std::path::Path;

use crate::utils::{exec, files};
use interfaces::{InterfacesDocument, InterfacesError};

pub const INTERFACES_PATH: &str = "/etc/network/interfaces";

/// Read and decode an interfaces file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<InterfacesDocument, InterfacesError> {
  let path = path.as_ref();
  let text = files::read_file(path)?;
  let doc = interfaces::decode(&text)?;
  log::debug!(
    "Parsed {} iface stanza(s) from {}",
    doc.interfaces.len(),
    path.display()
  );
  Ok(doc)
}

/// Encode a document and write it out; the file is only touched after the
/// whole document encoded successfully. Returns the rendered text.
pub fn save_file(
  doc: &InterfacesDocument,
  path: impl AsRef<Path>,
) -> Result<String, InterfacesError> {
  let path = path.as_ref();
  let rendered = interfaces::encode(doc)?;
  files::write_file(path, &rendered)?;
  log::info!("Wrote interfaces configuration to {}", path.display());
  Ok(rendered)
}

/// Decode an interfaces file and pretty-print it as JSON.
pub fn show(path: impl AsRef<Path>) -> Result<String, InterfacesError> {
  let doc = parse_file(path)?;
  serde_json::to_string_pretty(&doc).map_err(|e| InterfacesError::Io(io::Error::other(e)))
}

/// Restart the network through the init script, returning its stdout.
pub fn restart() -> io::Result<String> {
  exec::run_capture("/etc/init.d/networking", &["restart"])
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_parse_and_save_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interfaces");
    std::fs::write(&path, "auto lo\n\niface lo inet loopback\n").unwrap();

    let doc = parse_file(&path).unwrap();
    assert_eq!(doc.auto, vec!["lo"]);

    let rendered = save_file(&doc, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), rendered);
    assert!(rendered.starts_with("# generated by hostsetup\r\n"));
  }

  #[test]
  fn test_save_file_validation_failure_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interfaces");
    let mut file = std::fs::File::create(&path).unwrap();
    file
      .write_all(b"auto lo\n\niface lo inet loopback\n")
      .unwrap();

    let empty = InterfacesDocument::default();
    assert!(save_file(&empty, &path).is_err());
    assert_eq!(
      std::fs::read_to_string(&path).unwrap(),
      "auto lo\n\niface lo inet loopback\n"
    );
  }

  #[test]
  fn test_parse_file_missing() {
    let err = parse_file("/nonexistent/interfaces").unwrap_err();
    assert!(matches!(err, InterfacesError::Io(_)));
  }
}
