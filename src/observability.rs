//! This module provides the logging hooks for the codec.
//!
//! Library code only talks to the `log` facade. The host application decides
//! where records go; `init_logging` is a convenience that installs `env_logger`
//! with the crate's compact `[LEVEL] message` format.
//!
//! The `log_metric!` macro emits structured key/value events. It is compiled out
//! of release builds by `#[cfg(debug_assertions)]`.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use crate::config::ConflibConfig;
use crate::error::Result;

/// Logs a structured key-value metric at `trace` level, only in debug builds.
///
/// # Example
/// ```
/// use conflib::log_metric;
/// let entries = 4;
/// log_metric!("event"="encode", "entries"=&entries);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::trace!("CONFLIB_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs a global `env_logger` at `level`, optionally appending to `log_file`.
///
/// Only the first call has any effect. If the log file cannot be opened the
/// error is returned and no logger is installed by that call.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}

/// [`init_logging`] at the level named by `config.log_level`.
pub fn init_logging_from_config(config: &ConflibConfig, log_file: Option<&Path>) -> Result<()> {
    init_logging(config.log_level_filter(), log_file)
}
