use clap::Parser;
use hostsetup_core::{
  cli::{Command, DatetimeAction, HostnameAction, NetworkAction, Opt},
  config,
  modules::{datetime, hostname, hosts::HostsFile, network},
  utils::logging,
};

fn main() {
  human_panic::setup_panic!();
  let opt: Opt = Opt::parse();
  logging::init(opt.verbose);

  if let Err(e) = run(opt.command) {
    eprintln!("Error: {e}");
    std::process::exit(1);
  }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
  match command {
    Command::Apply { config, dry_run } => config::apply_config(config, dry_run)?,
    Command::Hostname { action } => match action {
      HostnameAction::Get { path } => println!("{}", hostname::read(path)?),
      HostnameAction::Set { name, path } => hostname::save(&name, path)?,
    },
    Command::Hosts {
      hostname_file,
      output,
    } => {
      let mut hosts = HostsFile::from_hostname_file(hostname_file)?;
      hosts.render();
      hosts.save(output)?;
    }
    Command::Datetime { action } => match action {
      DatetimeAction::Get { format } => print!("{}", datetime::get(format.as_deref())?),
      DatetimeAction::Set { time } => print!("{}", datetime::set(&time)?),
      DatetimeAction::Ntp { server } => {
        print!("{}", datetime::ntp_synchronize(server.as_deref())?)
      }
    },
    Command::Network { action } => match action {
      NetworkAction::Show { file } => println!("{}", network::show(file)?),
      NetworkAction::Restart => print!("{}", network::restart()?),
    },
  }
  Ok(())
}
