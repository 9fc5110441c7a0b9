//! Console logging and panic reporting

use std::backtrace::Backtrace;
use std::io::IsTerminal;

use log::LevelFilter;

/// Crates whose info lines make up the console output
const OWN_TARGETS: [&str; 2] = ["stampede_core", "stampede"];

/// Label and ANSI color for prefixed levels; info lines carry no prefix.
fn level_label(level: log::Level) -> Option<(&'static str, &'static str)> {
    match level {
        log::Level::Info => None,
        log::Level::Error => Some(("ERROR", "\x1b[31m")),
        log::Level::Warn => Some(("WARN", "\x1b[33m")),
        log::Level::Debug | log::Level::Trace => Some(("DEBUG", "\x1b[36m")),
    }
}

/// Logger configuration with a fixed filter.
///
/// Own info lines always pass; `debug` only adds lines. The environment is
/// not consulted, so nothing can silence the per-request output.
fn builder(debug: bool) -> env_logger::Builder {
    use std::io::Write;

    let own_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let color = std::io::stdout().is_terminal();

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .target(env_logger::Target::Stdout)
        .format(move |buf, record| match level_label(record.level()) {
            None => writeln!(buf, "{}", record.args()),
            Some((label, ansi)) if color => {
                writeln!(buf, "[{ansi}{label}\x1b[0m] {}", record.args())
            }
            Some((label, _)) => writeln!(buf, "[{label}] {}", record.args()),
        });
    for target in OWN_TARGETS {
        builder.filter_module(target, own_level);
    }
    builder
}

/// Initialize line-oriented logging to stdout.
pub fn init_logging(debug: bool) -> Result<(), log::SetLoggerError> {
    builder(debug).try_init()
}

/// Log every panic with its location and a backtrace before unwinding.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        let message = crate::worker::panic_message(info.payload());
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown location".to_string());
        let backtrace = Backtrace::force_capture();
        log::error!("thread '{name}' panicked at {location}: {message}\nBacktrace:\n{backtrace}");
    }));
}
