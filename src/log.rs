use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Installs a stderr logger with the given maximum level. Repeated calls are
/// no-ops, so binaries and tests may both use it.
pub fn build_logger_for_level(level: LevelFilter) {
    let mut builder = Builder::new();
    builder.filter_level(level).format(|buf, record| {
        writeln!(buf, "[{:<5}] {}", record.level(), record.args())
    });
    let _ = builder.try_init();
}

pub fn build_logger() {
    build_logger_for_level(LevelFilter::Info);
}
