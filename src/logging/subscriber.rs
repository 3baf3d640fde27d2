//! Tracing subscriber: console rendering and the per-run log file.
//!
//! [`Logger`](super::Logger) tags events with targets under `dotpkg::`.
//! Both sinks render those tags themselves, so messages never carry
//! escape codes.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{clock, log_file_path, started_at};

pub(super) const STAGE: &str = "dotpkg::stage";
pub(super) const DRY_RUN: &str = "dotpkg::dry_run";
pub(super) const CHECK: &str = "dotpkg::check";
pub(super) const SUMMARY: &str = "dotpkg::summary";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// What the current invocation is doing; written at the top of the log file.
#[derive(Debug, Clone, Copy)]
pub struct RunInfo<'a> {
    /// `deploy` or `check`; also names the log file.
    pub command: &'a str,
    /// Top-level config passed on the command line.
    pub config: &'a Path,
    /// Whether writes are being skipped.
    pub dry_run: bool,
}

impl RunInfo<'_> {
    fn header(&self) -> String {
        let version =
            option_env!("DOTPKG_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let mode = if self.dry_run {
            format!("{} (dry run)", self.command)
        } else {
            self.command.to_string()
        };
        format!(
            "# dotpkg {version}\n\
             # started: {}\n\
             # mode:    {mode}\n\
             # config:  {}\n",
            started_at(),
            self.config.display(),
        )
    }
}

/// Fields [`Logger`](super::Logger) attaches to an event.
#[derive(Default)]
struct EventFields {
    message: String,
    ok: Option<bool>,
    status: Option<String>,
}

impl EventFields {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }
}

impl tracing::field::Visit for EventFields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "status" => self.status = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        if field.name() == "ok" {
            self.ok = Some(value);
        }
    }
}

/// Plain-text rendering of one event, shared by the log file.
fn plain_line(level: Level, target: &str, fields: &EventFields) -> String {
    let msg = &fields.message;
    match (level, target) {
        (Level::INFO, STAGE) => format!("==> {msg}"),
        (Level::INFO, DRY_RUN) => format!("    [dry run] {msg}"),
        (Level::INFO, CHECK) => {
            let verdict = if fields.ok == Some(true) { "pass" } else { "FAIL" };
            format!("    [{verdict}] {msg}")
        }
        (Level::INFO, SUMMARY) => match &fields.status {
            Some(status) => format!("    [{status}] {msg}"),
            None => format!("    {msg}"),
        },
        (Level::ERROR, _) => format!("    [error] {msg}"),
        (Level::WARN, _) => format!("    [warn] {msg}"),
        (Level::DEBUG | Level::TRACE, _) => format!("    [debug] {msg}"),
        _ => format!("    {msg}"),
    }
}

/// Appends every event to `<cache>/dotpkg/<command>.log`, one stamped line each.
///
/// Always captures `DEBUG` and above, whatever the console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for this run and write its header.
    ///
    /// Returns `None` if the cache directory or the file is unavailable.
    pub(super) fn new(info: &RunInfo<'_>) -> Option<Self> {
        let path = log_file_path(info.command)?;
        fs::write(&path, info.header()).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let line = plain_line(*metadata.level(), metadata.target(), &EventFields::of(event));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {line}", clock()).ok();
        }
    }
}

/// Color of a summary row by its status label.
fn status_color(status: &str) -> &'static str {
    match status {
        "ok" => GREEN,
        "failed" => RED,
        "dry-run" => YELLOW,
        _ => DIM,
    }
}

/// Console rendering: bold stage headers, colored check verdicts and summary
/// rows, tagged dry-run actions, dimmed debug.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let fields = EventFields::of(event);
        let msg = &fields.message;

        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => writeln!(writer, "{RED}ERROR{RESET} {msg}"),
            (Level::WARN, _) => writeln!(writer, "{YELLOW}WARN{RESET}  {msg}"),
            (Level::INFO, STAGE) => writeln!(writer, "\x1b[1;34m==>{RESET} \x1b[1m{msg}{RESET}"),
            (Level::INFO, DRY_RUN) => writeln!(writer, "  {YELLOW}[DRY RUN]{RESET} {msg}"),
            (Level::INFO, CHECK) => {
                let ok = fields.ok == Some(true);
                let color = if ok { GREEN } else { RED };
                writeln!(writer, "{color}{}{RESET} pkg {msg}", super::check_mark(ok))
            }
            (Level::INFO, SUMMARY) => match fields.status.as_deref() {
                Some(status) => writeln!(writer, "  {}{msg}{RESET}", status_color(status)),
                None => writeln!(writer, "  {msg}"),
            },
            (Level::INFO, _) => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  {DIM}{msg}{RESET}"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber for one run.
///
/// Warnings and errors go to stderr, everything else to stdout.  The file
/// layer writes all events (including `debug`) to
/// `$XDG_CACHE_HOME/dotpkg/<command>.log` under a header describing `info`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, info: &RunInfo<'_>) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(info).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
