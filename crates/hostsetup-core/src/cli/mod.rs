use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::modules::{hostname, hosts, network};

#[derive(Debug, Parser)]
#[clap(name="hostsetup-cli", version=env!("CARGO_PKG_VERSION"), about="Linux host configuration utility", author=env!("CARGO_PKG_AUTHORS"))]
pub struct Opt {
  #[clap(subcommand)]
  pub command: Command,

  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Apply a host profile
  #[clap(name = "apply")]
  Apply {
    /// The profile to apply
    config: PathBuf,

    /// Render and log everything without writing or running commands
    #[arg(long)]
    dry_run: bool,
  },

  /// Read or write the hostname file
  Hostname {
    #[clap(subcommand)]
    action: HostnameAction,
  },

  /// Regenerate the hosts file from the stored hostname
  Hosts {
    /// Hostname file to read
    #[arg(long, default_value = hostname::HOSTNAME_PATH)]
    hostname_file: PathBuf,

    /// Where to write the generated file
    #[arg(short, long, default_value = hosts::HOSTS_PATH)]
    output: PathBuf,
  },

  /// Date and time operations
  Datetime {
    #[clap(subcommand)]
    action: DatetimeAction,
  },

  /// Inspect or restart networking
  Network {
    #[clap(subcommand)]
    action: NetworkAction,
  },
}

#[derive(Debug, Subcommand)]
pub enum HostnameAction {
  /// Print the stored hostname
  Get {
    #[arg(long, default_value = hostname::HOSTNAME_PATH)]
    path: PathBuf,
  },
  /// Write a new hostname
  Set {
    name: String,

    #[arg(long, default_value = hostname::HOSTNAME_PATH)]
    path: PathBuf,
  },
}

#[derive(Debug, Subcommand)]
pub enum DatetimeAction {
  /// Print the system time via `date`
  Get {
    /// Format argument for `date`
    #[arg(long)]
    format: Option<String>,
  },
  /// Set system and hardware clock
  Set {
    /// Time string handed to `date --set`
    time: String,
  },
  /// Sync time from an NTP server
  Ntp {
    #[arg(long)]
    server: Option<String>,
  },
}

#[derive(Debug, Subcommand)]
pub enum NetworkAction {
  /// Decode an interfaces file and print it as JSON
  Show {
    #[arg(long, default_value = network::INTERFACES_PATH)]
    file: PathBuf,
  },
  /// Restart networking through the init script
  Restart,
}
