use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf, time::Duration};

use crate::modules::network::interfaces::{self, InterfacesDocument};
use crate::modules::{datetime, hostname, hosts, hosts::HostsFile, network};

/// A host profile: everything this utility can configure, in one JSON file.
/// Absent sections are skipped.
#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
  #[serde(default)]
  hostname: Option<String>,
  #[serde(default)]
  hosts: Vec<HostEntry>,
  #[serde(default)]
  interfaces: Option<InterfacesDocument>,
  #[serde(default)]
  datetime: Option<DatetimeConfig>,
}

#[derive(Serialize, Deserialize, Debug)]
struct HostEntry {
  ip: String,
  name: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct DatetimeConfig {
  /// Literal time string handed to `date --set`.
  #[serde(default)]
  set: Option<String>,
  #[serde(default)]
  ntp: bool,
  #[serde(default)]
  ntp_server: Option<String>,
}

impl Config {
  pub fn from_file(path: &PathBuf) -> Result<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read profile: {path:?}"))?;

    let config: Config = serde_json::from_str(&content)
      .with_context(|| format!("Failed to parse profile: {path:?}"))?;

    log::debug!("Loaded host profile from {path:?}");
    Ok(config)
  }

  fn apply_hostname(&self, dry_run: bool) -> Result<()> {
    let Some(name) = &self.hostname else {
      return Ok(());
    };
    log::info!("Hostname: {name}");
    if dry_run {
      return Ok(());
    }
    hostname::save(name, hostname::HOSTNAME_PATH)?;
    Ok(())
  }

  fn apply_hosts(&self, dry_run: bool) -> Result<()> {
    if self.hostname.is_none() && self.hosts.is_empty() {
      return Ok(());
    }

    let mut file = match &self.hostname {
      Some(name) => HostsFile::new(name.as_str()),
      None => HostsFile::from_hostname_file(hostname::HOSTNAME_PATH)?,
    };
    for entry in &self.hosts {
      file.entry(entry.ip.as_str(), entry.name.as_str());
    }

    let rendered = file.render();
    log::info!("Hosts file: {} line(s)", rendered.lines().count());
    if dry_run {
      return Ok(());
    }
    file.save(hosts::HOSTS_PATH)?;
    Ok(())
  }

  fn apply_interfaces(&self, dry_run: bool) -> Result<()> {
    let Some(doc) = &self.interfaces else {
      return Ok(());
    };
    log::info!("Network interfaces: {} stanza(s)", doc.interfaces.len());

    if dry_run {
      let rendered = interfaces::encode(doc)?;
      log::info!("Would write {} byte(s) to {}", rendered.len(), network::INTERFACES_PATH);
      return Ok(());
    }

    network::save_file(doc, network::INTERFACES_PATH)?;
    run_step("Restarting networking", network::restart)?;
    Ok(())
  }

  fn apply_datetime(&self, dry_run: bool) -> Result<()> {
    let Some(config) = &self.datetime else {
      return Ok(());
    };

    if let Some(time) = &config.set {
      log::info!("System time: {time}");
      if !dry_run {
        datetime::set(time)?;
      }
    }

    if config.ntp {
      let server = config.ntp_server.as_deref();
      log::info!(
        "NTP server: {}",
        server.unwrap_or(datetime::DEFAULT_NTP_SERVER)
      );
      if !dry_run {
        run_step("Synchronizing time via NTP", || datetime::ntp_synchronize(server))?;
      }
    }

    Ok(())
  }
}

// Spinner feedback for the external commands that take a while.
fn run_step<T>(message: &str, step: impl FnOnce() -> io::Result<T>) -> io::Result<T> {
  let pb = ProgressBar::new_spinner();
  pb.set_style(
    ProgressStyle::default_spinner()
      .template("{spinner:.green} [{elapsed_precise}] {msg}")
      .unwrap(),
  );
  pb.set_message(String::from(message));
  pb.enable_steady_tick(Duration::from_millis(120));

  let result = step();
  match &result {
    Ok(_) => pb.finish_with_message(format!("{message}: done")),
    Err(_) => pb.finish_with_message(format!("{message}: failed")),
  }
  result
}

/// Load a profile and apply it section by section.
pub fn apply_config(config_path: PathBuf, dry_run: bool) -> Result<()> {
  let config = Config::from_file(&config_path)?;

  config
    .apply_hostname(dry_run)
    .context("Failed to set hostname")?;

  config
    .apply_hosts(dry_run)
    .context("Failed to write hosts file")?;

  config
    .apply_interfaces(dry_run)
    .context("Failed to configure network interfaces")?;

  config
    .apply_datetime(dry_run)
    .context("Failed to set date and time")?;

  if dry_run {
    log::info!("Dry run finished, nothing was written");
  } else {
    log::info!("Host configuration applied successfully");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_profile_parses_all_sections() {
    let json = r#"{
      "hostname": "setup.hostname",
      "hosts": [
        {"ip": "10.0.0.1", "name": "server1.example.com"}
      ],
      "interfaces": {
        "auto": "lo",
        "ifaces": [
          {"device": "lo", "mode": "loopback"},
          {"device": "eth0", "mode": "dhcp"}
        ]
      },
      "datetime": {"ntp": true, "ntp_server": "ntp.example.com"}
    }"#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    let config = Config::from_file(&file.path().to_path_buf()).unwrap();

    assert_eq!(config.hostname.as_deref(), Some("setup.hostname"));
    assert_eq!(config.hosts.len(), 1);
    let doc = config.interfaces.as_ref().unwrap();
    assert_eq!(doc.auto, vec!["lo"]);
    assert_eq!(doc.interfaces.len(), 2);
    assert!(config.datetime.as_ref().unwrap().ntp);
  }

  #[test]
  fn test_profile_sections_are_optional() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{}").unwrap();
    let config = Config::from_file(&file.path().to_path_buf()).unwrap();
    assert!(config.hostname.is_none());
    assert!(config.hosts.is_empty());
    assert!(config.interfaces.is_none());
    assert!(config.datetime.is_none());
  }

  #[test]
  fn test_profile_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{not json").unwrap();
    assert!(Config::from_file(&file.path().to_path_buf()).is_err());
  }
}
