use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Level named by `raw`, or `default` when absent or unparsable
fn parse_level(raw: Option<&str>, default: LevelFilter) -> LevelFilter {
    raw.and_then(|level| level.trim().parse().ok()).unwrap_or(default)
}

/// Sets up the application logger on stderr.
///
/// Stdout is left to command output so it can be piped as JSON.
///
/// # Arguments
/// * `default` - Level used when `RUST_LOG` does not name one
///
/// # Errors
/// * If a global logger is already installed
pub fn setup_logger(default: LevelFilter) -> Result<()> {
    Dispatch::new()
        .level(parse_level(std::env::var("RUST_LOG").ok().as_deref(), default))
        .chain(std::io::stderr())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
