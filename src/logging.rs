//! Logging setup
//!
//! Three outputs share one `tracing` registry:
//! - the console, filtered by `-v` / `-q` (or `RUST_LOG`)
//! - `info.log`, INFO and WARN events of this crate
//! - `error.log`, ERROR events of this crate
//!
//! Both files are append-only and never rotated. Lines carry a timestamp, the level,
//! the message and the event's structured fields.

use std::io;
use std::path::Path;
use tracing::{Level, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const INFO_LOG: &str = "info.log";
pub const ERROR_LOG: &str = "error.log";

const CRATE_TARGET: &str = "docs_scribe";

/// Keeps the background log writers alive; drop it only at exit
#[must_use = "log files stop receiving events once the guard is dropped"]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Installs the global subscriber
///
/// # Arguments
///
/// * `verbose` - Number of `-v` flags
/// * `quiet` - Only show errors on the console
/// * `log_dir` - Directory receiving `info.log` and `error.log` (created if missing)
pub fn init_logging(verbose: u8, quiet: bool, log_dir: &Path) -> io::Result<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (info_writer, info_guard) = non_blocking(rolling::never(log_dir, INFO_LOG));
    let (error_writer, error_guard) = non_blocking(rolling::never(log_dir, ERROR_LOG));

    build_subscriber(console_filter(verbose, quiet), info_writer, error_writer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(LogGuard {
        _guards: vec![info_guard, error_guard],
    })
}

/// Console filter: `RUST_LOG` when set, otherwise derived from the flags
pub fn console_filter(verbose: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_directive(verbose, quiet)))
}

fn console_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        // Only show errors
        return "error";
    }

    match verbose {
        0 => "docs_scribe=info,warn",
        1 => "docs_scribe=debug,info",
        2 => "docs_scribe=trace,debug",
        _ => "trace",
    }
}

fn is_info_stream(meta: &Metadata<'_>) -> bool {
    meta.target().starts_with(CRATE_TARGET) && (*meta.level() == Level::INFO || *meta.level() == Level::WARN)
}

fn is_error_stream(meta: &Metadata<'_>) -> bool {
    meta.target().starts_with(CRATE_TARGET) && *meta.level() == Level::ERROR
}

fn build_subscriber<I, E>(console: EnvFilter, info: I, error: E) -> impl Subscriber + Send + Sync
where
    I: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(console);

    let info_layer = fmt::layer()
        .with_writer(info)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter_fn(is_info_stream));

    let error_layer = fmt::layer()
        .with_writer(error)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter_fn(is_error_stream));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(info_layer)
        .with(error_layer)
}
