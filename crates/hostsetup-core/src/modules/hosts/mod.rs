use std::io;
use std::path::Path;

use crate::modules::hostname;
use crate::utils::files;

pub const HOSTS_PATH: &str = "/etc/hosts";

const END_LINE: &str = "\r\n";

/// Builder for an `/etc/hosts` file: the loopback preamble for the given
/// hostname, the usual IPv6 block, then any custom entries in order.
///
/// The last rendered text is cached on the instance, never in module or
/// process state, so unrelated builders cannot observe each other.
#[derive(Debug, Clone, Default)]
pub struct HostsFile {
  hostname: String,
  entries: Vec<(String, String)>,
  rendered: Option<String>,
}

impl HostsFile {
  pub fn new(hostname: impl Into<String>) -> Self {
    HostsFile {
      hostname: hostname.into(),
      entries: Vec::new(),
      rendered: None,
    }
  }

  /// Seed the builder from the hostname stored on disk.
  pub fn from_hostname_file(path: impl AsRef<Path>) -> io::Result<Self> {
    Ok(HostsFile::new(hostname::read(path)?))
  }

  pub fn entry(&mut self, ip: impl Into<String>, host: impl Into<String>) -> &mut Self {
    self.entries.push((ip.into(), host.into()));
    self
  }

  /// Generate the file content and cache it for `save`.
  pub fn render(&mut self) -> &str {
    let mut lines = vec![
      String::from("127.0.0.1 localhost"),
      format!("127.0.1.1 {}", self.hostname),
      String::new(),
      String::from("# The following lines are desirable for IPv6 capable hosts"),
      String::from("::1       ip6-localhost ip6-loopback"),
      String::from("fe00::0   ip6-localnet"),
      String::from("ff00::0   ip6-mcastprefix"),
      String::from("ff02::1   ip6-allnodes"),
      String::from("ff02::2:  ip6-allrouters"),
    ];
    for (ip, host) in &self.entries {
      lines.push(format!("{ip} {host}"));
    }
    self.rendered.insert(lines.join(END_LINE)).as_str()
  }

  pub fn rendered(&self) -> Option<&str> {
    self.rendered.as_deref()
  }

  /// Write the cached render; fails if `render` has not run yet.
  pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
    let Some(content) = self.rendered.as_deref() else {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "hosts file has not been rendered",
      ));
    };
    files::write_file(path.as_ref(), content)?;
    log::info!("Wrote hosts file to {}", path.as_ref().display());
    Ok(())
  }
}
