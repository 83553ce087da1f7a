//! Host configuration for Linux machines: hostname and hosts files, the
//! Debian-style network interfaces codec, date/time and network restart
//! shell-outs, and a JSON profile that applies all of it in one go.

pub mod cli;
pub mod config;
pub mod modules;
pub mod utils;
