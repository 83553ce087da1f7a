use flexi_logger::{DeferredNow, LogSpecification, Logger, style};
use log::{LevelFilter, Record};
use std::io::Write;

/// Map the CLI's repeated `-v` count onto a level filter and start the
/// global logger.
pub fn init(verbose: u8) {
  let level = match verbose {
    0 => LevelFilter::Info,
    1 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  let spec = LogSpecification::builder().default(level).build();
  Logger::with(spec).format(log_format).start().unwrap();
}

fn log_format(
  w: &mut dyn Write,
  now: &mut DeferredNow,
  record: &Record,
) -> std::io::Result<()> {
  let level = record.level();
  let styled_level = style(level).paint(level.to_string());
  writeln!(
    w,
    "[ {styled_level} ] {} {}",
    now.now().format("%H:%M:%S"),
    record.args()
  )
}
