//! Logger initialization.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first; the provided `level` overrides it for this crate
/// and as the global default. HTTP stack internals (reqwest, hyper) are capped
/// at info.
///
/// # Arguments
///
/// * `level` - Minimum level for this crate and the global default
/// * `format` - `Plain` for colored terminal lines, `Json` for one object per line
///
/// # Returns
///
/// `Ok(())` once the logger is installed for the rest of the process.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=crpt_client=debug crpt_client document.json
/// crpt_client document.json --log-level trace --log-format json
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("crpt_client", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init so a second call reports an error instead of panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// One structured log line: epoch millis, level, target and message.
fn json_line(record: &log::Record<'_>) -> serde_json::Value {
    serde_json::json!({
        "ts": chrono::Utc::now().timestamp_millis(),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_fields() {
        let line = json_line(
            &log::Record::builder()
                .level(log::Level::Warn)
                .target("crpt_client::dispatch")
                .args(format_args!("Request #{} failed: \"quoted\"", 7))
                .build(),
        );

        assert_eq!(line["level"], "WARN");
        assert_eq!(line["target"], "crpt_client::dispatch");
        assert_eq!(line["msg"], "Request #7 failed: \"quoted\"");
        assert!(line["ts"].as_i64().is_some_and(|ts| ts > 0));

        // Serializes back to a single line of valid JSON
        let rendered = line.to_string();
        assert!(!rendered.contains('\n'));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&rendered).unwrap(), line);
    }

    #[test]
    fn test_second_init_is_an_error() {
        // Only one logger per process; whichever call comes second must fail cleanly
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let result = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(matches!(result, Err(InitializationError::LoggerError(_))));
    }
}
