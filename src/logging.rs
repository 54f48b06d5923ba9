//! Tracing setup for the binary.
//!
//! - Verbosity comes from LogLevel only; RUST_LOG is not consulted.
//! - Console output goes to stderr so stdout carries only rename results.
//! - The library opens a `dir` span per processed directory; both formats show
//!   it, so events of a recursive run stay attributable to their level.
//! - `--log-file` adds a second layer with the same format behind a
//!   non-blocking writer. A log path with a symlinked ancestor is refused.

use anyhow::{anyhow, Result};
use chrono::Local;
use smart_rename::output as out;
use smart_rename::platform::open_log_file_secure_append;
use smart_rename::{default_log_path, path_has_symlink_ancestor, LogLevel};
use std::fmt as stdfmt;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self as tsfmt, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{registry, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// DD/MM/YY HH:MM:SS in local time.
struct LocalHumanTime;

impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

/// quiet: errors only; normal: phase boundaries and the summary;
/// info: every planned rename; debug: resolver iterations and per-file I/O.
fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Quiet => "error",
        LogLevel::Normal => "info",
        LogLevel::Info => "debug",
        LogLevel::Debug => "trace",
    }
}

/// One formatted, filtered layer writing to `writer`.
fn format_layer<W>(writer: W, json: bool, directive: &str) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tsfmt::layer()
        .with_writer(writer)
        .with_timer(LocalHumanTime)
        .with_target(false);
    if json {
        layer
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_filter(EnvFilter::new(directive))
            .boxed()
    } else {
        layer
            .compact()
            .with_thread_ids(true)
            .with_filter(EnvFilter::new(directive))
            .boxed()
    }
}

/// Non-blocking writer for `path`, or the reason file logging stays off.
fn open_file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), String> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => return Err("an ancestor of the log path is a symlink".into()),
        Err(e) => return Err(format!("cannot check the log path for symlinks: {e}")),
    }
    let file = open_log_file_secure_append(path).map_err(|e| format!("cannot open it: {e}"))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Install the global subscriber. The returned guard (present when file
/// logging is active) must live until shutdown so buffered lines are flushed.
pub fn init_tracing(
    lvl: &LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let directive = level_directive(*lvl);
    let mut layers: Vec<BoxedLayer> = vec![format_layer(std::io::stderr, json, directive)];
    let mut guard = None;

    if let Some(path) = log_file {
        match open_file_writer(path) {
            Ok((writer, g)) => {
                layers.push(format_layer(writer, json, directive));
                guard = Some(g);
            }
            Err(reason) => {
                out::print_warn(&format!(
                    "File logging to '{}' is disabled: {reason}. Logs continue on stderr.",
                    path.display()
                ));
                if let Ok(def) = default_log_path() {
                    out::print_info(&format!("The default log path is {}", def.display()));
                }
            }
        }
    }

    registry()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow!("install tracing subscriber: {e}"))?;
    Ok(guard)
}
